//! Configuration collaborator
//!
//! The builder consults a [`Configuration`] for two things: a base URL for
//! an interface that was built without one, and the flag disabling the
//! default exception mapper. The key forms are fixed:
//!
//! ```text
//! <interface>/mp-rest/url
//! microprofile.rest.client.disable.default.mapper
//! ```

use std::collections::HashMap;

/// Suffix of the per-interface base URL key
pub const URL_KEY_SUFFIX: &str = "/mp-rest/url";

/// Key of the boolean flag disabling the default exception mapper
pub const DISABLE_DEFAULT_MAPPER_KEY: &str = "microprofile.rest.client.disable.default.mapper";

/// The base URL key for an interface name
pub fn url_key(interface: &str) -> String {
    format!("{interface}{URL_KEY_SUFFIX}")
}

/// Trait for configuration sources
pub trait Configuration: Send + Sync {
    /// Look up a value; `None` when the key is absent
    fn get_value(&self, key: &str) -> Option<String>;

    /// Look up a boolean value; absent keys stay `None`, present keys parse
    /// case-insensitively (`"true"` is true, anything else false)
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_value(key)
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

/// A configuration with no values
pub struct NoConfiguration;

impl Configuration for NoConfiguration {
    fn get_value(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory configuration, also the test double
#[derive(Default)]
pub struct MapConfiguration {
    values: HashMap<String, String>,
}

impl MapConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl Configuration for MapConfiguration {
    fn get_value(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Environment-variable configuration
///
/// Looks up the exact key first, then the key with every character outside
/// `[a-zA-Z0-9]` replaced by `_`, then that mangled form uppercased — so
/// `com.acme.ItemService/mp-rest/url` can be supplied as
/// `COM_ACME_ITEMSERVICE_MP_REST_URL`.
pub struct EnvConfiguration;

impl Configuration for EnvConfiguration {
    fn get_value(&self, key: &str) -> Option<String> {
        if let Ok(value) = std::env::var(key) {
            return Some(value);
        }

        let mangled: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if let Ok(value) = std::env::var(&mangled) {
            return Some(value);
        }

        std::env::var(mangled.to_ascii_uppercase()).ok()
    }
}
