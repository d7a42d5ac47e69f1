//! The client builder
//!
//! Entry point of the binding engine: accumulates provider registrations and
//! transport/codec/configuration wiring, verifies each interface descriptor
//! exactly once, and hands out [`RestClient`] invokers bound to the frozen
//! provider order.

use crate::chain::MapperChain;
use crate::codec::{BodyCodec, JsonCodec};
use crate::config::{url_key, Configuration, NoConfiguration, DISABLE_DEFAULT_MAPPER_KEY};
use crate::error::ClientError;
use crate::invoker::RestClient;
use crate::mapper::{
    DefaultExceptionMapper, LocalProvider, ResponseExceptionMapper, DEFAULT_MAPPER_PRIORITY,
};
use crate::transport::{ReqwestTransport, Transport};
use declarest_core::{verify, EndpointDescriptor};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};

/// Builder for [`RestClient`] instances
///
/// One builder may serve several interfaces: verification is cached per
/// interface name, and the provider list is frozen into its priority order
/// at the first `build` and shared by every client built afterwards.
///
/// # Example
///
/// ```ignore
/// use declarest_http::RestClientBuilder;
///
/// let builder = RestClientBuilder::new()
///     .base_url("http://localhost:8080")
///     .register(Arc::new(ItemMissingMapper));
///
/// let client = builder.build(&descriptor)?;
/// ```
pub struct RestClientBuilder {
    base_url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    codec: Arc<dyn BodyCodec>,
    configuration: Arc<dyn Configuration>,
    providers: Vec<LocalProvider>,
    frozen: OnceLock<MapperChain>,
    verified: Mutex<HashSet<String>>,
}

impl RestClientBuilder {
    pub fn new() -> Self {
        RestClientBuilder {
            base_url: None,
            transport: None,
            codec: Arc::new(JsonCodec),
            configuration: Arc::new(NoConfiguration),
            providers: Vec::new(),
            frozen: OnceLock::new(),
            verified: Mutex::new(HashSet::new()),
        }
    }

    /// Set the base URL shared by every client from this builder
    ///
    /// Trailing slashes are trimmed. When no base URL is set, `build` falls
    /// back to the configuration key `<interface>/mp-rest/url`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(trim_base_url(&url.into()));
        self
    }

    /// Replace the default reqwest transport
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Replace the default JSON codec
    pub fn codec(mut self, codec: impl BodyCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Set the configuration source consulted for the base URL fallback and
    /// the default-mapper flag
    pub fn configuration(mut self, configuration: impl Configuration + 'static) -> Self {
        self.configuration = Arc::new(configuration);
        self
    }

    /// Register an exception mapper under its own priority
    pub fn register(self, mapper: Arc<dyn ResponseExceptionMapper>) -> Self {
        let priority = mapper.priority();
        self.register_with_priority(mapper, priority)
    }

    /// Register an exception mapper under an explicit priority
    ///
    /// Registering the same instance twice warns and keeps the first
    /// registration; the duplicate is ignored, not replaced.
    pub fn register_with_priority(
        mut self,
        mapper: Arc<dyn ResponseExceptionMapper>,
        priority: i32,
    ) -> Self {
        if self.providers.iter().any(|p| p.is_instance(&mapper)) {
            tracing::warn!("provider already registered, ignoring duplicate registration");
            return self;
        }
        self.providers.push(LocalProvider::new(mapper, priority));
        self
    }

    /// Build a client for the given interface descriptor
    ///
    /// Verification runs once per distinct interface name per builder; a
    /// second `build` for the same interface reuses the earlier result. The
    /// first `build` freezes the provider order for the lifetime of this
    /// builder.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Definition`] when verification fails and
    /// [`ClientError::MissingBaseUrl`] when neither the builder nor the
    /// configuration supplies a base URL.
    pub fn build(&self, descriptor: &Arc<EndpointDescriptor>) -> Result<RestClient, ClientError> {
        let interface = descriptor.interface();

        {
            let mut verified = self.verified.lock().expect("verified-interface cache poisoned");
            if !verified.contains(interface) {
                verify(descriptor)?;
                verified.insert(interface.to_string());
            }
        }

        let chain = self.frozen.get_or_init(|| self.freeze_providers()).clone();

        let base_url = match &self.base_url {
            Some(url) => url.clone(),
            None => self
                .configuration
                .get_value(&url_key(interface))
                .map(|url| trim_base_url(&url))
                .ok_or_else(|| ClientError::MissingBaseUrl {
                    interface: interface.to_string(),
                })?,
        };

        let transport = self
            .transport
            .clone()
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));

        Ok(RestClient::new(
            descriptor.clone(),
            base_url,
            chain,
            transport,
            self.codec.clone(),
        ))
    }

    /// Append the default mapper unless disabled, then sort into priority
    /// order
    fn freeze_providers(&self) -> MapperChain {
        let mut providers = self.providers.clone();
        if !self.default_mapper_disabled() {
            providers.push(LocalProvider::new(
                Arc::new(DefaultExceptionMapper),
                DEFAULT_MAPPER_PRIORITY,
            ));
        }
        MapperChain::new(providers)
    }

    fn default_mapper_disabled(&self) -> bool {
        self.configuration
            .get_bool(DISABLE_DEFAULT_MAPPER_KEY)
            .unwrap_or(false)
    }
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
