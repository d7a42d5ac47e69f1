//! The invocation engine
//!
//! A [`RestClient`] is bound to one verified [`EndpointDescriptor`] and
//! turns method invocations into HTTP requests. All of its state is
//! read-only after construction; concurrent calls through one client, or
//! through clones of it, need no locking.

use crate::chain::MapperChain;
use crate::codec::BodyCodec;
use crate::error::ClientError;
use crate::transport::{Transport, WireRequest, WireResponse};
use declarest_core::{build_plan, CallArg, EndpointDescriptor};
use http::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A callable client bound to one interface descriptor
///
/// Built by [`RestClientBuilder`](crate::RestClientBuilder). Invocations
/// name the descriptor method and pass arguments positionally; the
/// descriptor's parameter bindings assign each argument its role.
///
/// # Example
///
/// ```ignore
/// use declarest_core::CallArg;
/// use declarest_http::RestClientBuilder;
///
/// let client = RestClientBuilder::new()
///     .base_url("http://localhost:8080")
///     .build(&descriptor)?;
///
/// let item: Item = client
///     .invoke("fetch", &[CallArg::new(&42)?])
///     .await?;
/// ```
#[derive(Clone)]
pub struct RestClient {
    descriptor: Arc<EndpointDescriptor>,
    base_url: String,
    chain: MapperChain,
    transport: Arc<dyn Transport>,
    codec: Arc<dyn BodyCodec>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    pub(crate) fn new(
        descriptor: Arc<EndpointDescriptor>,
        base_url: String,
        chain: MapperChain,
        transport: Arc<dyn Transport>,
        codec: Arc<dyn BodyCodec>,
    ) -> Self {
        RestClient {
            descriptor,
            base_url,
            chain,
            transport,
            codec,
        }
    }

    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Invoke a method and decode the response body into `R`
    ///
    /// The exception mapping chain runs against the response before any
    /// decode is attempted, so an error-status response surfaces as
    /// [`ClientError::Mapped`] rather than a decode failure — unless no
    /// mapper claimed it, in which case the body is decoded normally.
    ///
    /// # Errors
    ///
    /// See [`ClientError`] for the full taxonomy. Decode failures are
    /// [`ClientError::Decode`], distinct from mapped application errors.
    pub async fn invoke<R: DeserializeOwned>(
        &self,
        method: &str,
        args: &[CallArg],
    ) -> Result<R, ClientError> {
        let response = self.dispatch(method, args).await?;

        let value = self
            .codec
            .decode(&response.body)
            .map_err(ClientError::Decode)?;
        serde_json::from_value(value)
            .map_err(|source| ClientError::Decode(crate::codec::CodecError::Decode(source)))
    }

    /// Invoke a method whose declared return is the absence of a value
    ///
    /// No payload decode occurs at all; the response body is released
    /// unread.
    pub async fn invoke_unit(&self, method: &str, args: &[CallArg]) -> Result<(), ClientError> {
        self.dispatch(method, args).await?;
        Ok(())
    }

    /// Build, send and map one request; the returned response has already
    /// passed the exception mapping chain
    async fn dispatch(
        &self,
        method: &str,
        args: &[CallArg],
    ) -> Result<WireResponse, ClientError> {
        let interface = self.descriptor.interface();

        let descriptor =
            self.descriptor
                .find_method(method)
                .ok_or_else(|| ClientError::UnknownMethod {
                    interface: interface.to_string(),
                    method: method.to_string(),
                })?;

        let verb = descriptor
            .verbs()
            .first()
            .copied()
            .ok_or_else(|| ClientError::UnknownVerb {
                interface: interface.to_string(),
                method: method.to_string(),
            })?;

        let plan = build_plan(&self.descriptor, descriptor, args)?;

        let mut url = format!("{}{}", self.base_url, plan.path());
        let query = plan.query_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = plan.headers().clone();
        let body = match plan.body() {
            Some(value) => {
                let bytes = self.codec.encode(value).map_err(ClientError::Encode)?;
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static(self.codec.content_type()),
                );
                Some(bytes)
            }
            None => None,
        };

        tracing::debug!("dispatching {} {}", verb, url);

        let request = WireRequest {
            verb,
            url,
            headers,
            body,
        };

        // Transport failures bypass the mapping chain.
        let response = self.transport.send(request).await?;

        if let Some(failure) = self.chain.evaluate(&response, descriptor.declared_errors()) {
            return Err(ClientError::Mapped(failure));
        }

        Ok(response)
    }
}
