//! # declarest-core
//!
//! Descriptor model and request-planning logic for the declarest binding
//! engine. A caller describes a remote HTTP service as an
//! [`EndpointDescriptor`] — methods with an HTTP verb, a URI template and
//! per-parameter roles — and this crate turns one invocation of such a
//! method into a [`CallPlan`]: the concrete path, query, headers and body
//! of the request to make.
//!
//! This crate has no I/O. Transport, codecs and exception mapping live in
//! `declarest-http`.
//!
//! ## Example
//!
//! ```rust
//! use declarest_core::{build_plan, CallArg, EndpointDescriptor, MethodDescriptor};
//!
//! let endpoint = EndpointDescriptor::new("ItemService")
//!     .path("/svc")
//!     .method(
//!         MethodDescriptor::new("fetch")
//!             .get()
//!             .path("/items/{id}")
//!             .path_param("id")
//!             .query_param("q"),
//!     );
//!
//! declarest_core::verify(&endpoint).unwrap();
//!
//! let method = endpoint.find_method("fetch").unwrap();
//! let args = [CallArg::new(&42).unwrap(), CallArg::new(&"x y").unwrap()];
//! let plan = build_plan(&endpoint, method, &args).unwrap();
//! assert_eq!(plan.path(), "/svc/items/42");
//! assert_eq!(plan.query_string(), "q=x%20y");
//! ```

pub mod descriptor;
pub mod error;
pub mod plan;
pub mod template;
pub mod verify;

pub use descriptor::{EndpointDescriptor, ErrorKind, MethodDescriptor, ParamBinding, Verb};
pub use error::{DefinitionError, PlanError};
pub use plan::{build_plan, CallArg, CallPlan};
pub use verify::verify;
