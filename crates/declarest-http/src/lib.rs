//! # declarest-http
//!
//! HTTP execution for the declarest binding engine.
//!
//! This crate provides:
//! - A [`Transport`] trait with a reqwest-backed default implementation
//! - A [`BodyCodec`] trait with a JSON default
//! - The [`ResponseExceptionMapper`] capability and the priority-ordered
//!   mapping chain that turns error responses into typed failures
//! - The [`RestClient`] invoker and the [`RestClientBuilder`] entry point
//!
//! ## Example
//!
//! ```ignore
//! use declarest_core::{CallArg, EndpointDescriptor, MethodDescriptor};
//! use declarest_http::RestClientBuilder;
//!
//! let descriptor = Arc::new(
//!     EndpointDescriptor::new("ItemService")
//!         .path("/svc")
//!         .method(
//!             MethodDescriptor::new("fetch")
//!                 .get()
//!                 .path("/items/{id}")
//!                 .path_param("id"),
//!         ),
//! );
//!
//! let client = RestClientBuilder::new()
//!     .base_url("http://localhost:8080")
//!     .build(&descriptor)?;
//!
//! let item: Item = client.invoke("fetch", &[CallArg::new(&42)?]).await?;
//! ```

mod builder;
mod chain;
mod codec;
mod config;
mod error;
mod invoker;
mod mapper;
mod transport;

pub use builder::RestClientBuilder;
pub use chain::MapperChain;
pub use codec::{BodyCodec, CodecError, JsonCodec};
pub use config::{
    url_key, Configuration, EnvConfiguration, MapConfiguration, NoConfiguration,
    DISABLE_DEFAULT_MAPPER_KEY, URL_KEY_SUFFIX,
};
pub use error::ClientError;
pub use invoker::RestClient;
pub use mapper::{
    DefaultExceptionMapper, LocalProvider, MappedFailure, ResponseExceptionMapper,
    UnexpectedStatus, DEFAULT_MAPPER_PRIORITY, USER_PRIORITY,
};
pub use transport::{ReqwestTransport, Transport, TransportError, WireRequest, WireResponse};
