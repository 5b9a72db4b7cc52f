//! Environment integration for proxy discovery

use std::collections::HashMap;
use std::env;

/// Proxy variables in lookup order; the first non-empty one wins.
pub const PROXY_ENV_VARS: [&str; 4] = ["HTTPS_PROXY", "HTTP_PROXY", "https_proxy", "http_proxy"];

/// Read access to environment-style key/value settings.
///
/// The process environment is the usual source; tests and embedding
/// applications pass a map instead.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|value| (*value).to_string())
    }
}

/// First non-empty proxy variable, trimmed.
pub fn proxy_from_env(env: &dyn EnvSource) -> Option<String> {
    PROXY_ENV_VARS.iter().find_map(|key| {
        env.var(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
