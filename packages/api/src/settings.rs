//! Provider-style settings and the ordered cluster setup
//!
//! Settings arrive as JSON (or are built in code), fall back to the
//! environment for the host, and are turned into a configured [`Cluster`]
//! by [`Settings::into_cluster`].

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use cqltunnel_client::DialOptions;
use cqltunnel_client::error::{self, Result};
use cqltunnel_client::proxy::EnvSource;
use serde::Deserialize;

use crate::cluster::{Cluster, DEFAULT_SYSTEM_AUTH_KEYSPACE, install_dns, resolve_proxy};

/// Environment variable consulted when no host is configured.
pub const HOST_ENV_VAR: &str = "SCYLLADB_HOST";

#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct UserPassSettings {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for UserPassSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// PEM-encoded TLS inputs.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TlsSettings {
    pub ca_cert: String,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub skip_host_verification: bool,
}

impl fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSettings")
            .field("ca_cert", &format_args!("{} bytes", self.ca_cert.len()))
            .field("client_cert", &self.client_cert.is_some())
            .field("client_key", &self.client_key.as_ref().map(|_| "<redacted>"))
            .field("skip_host_verification", &self.skip_host_verification)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Comma-separated contact points, each `host[:port]`
    pub host: Option<String>,
    pub system_auth_keyspace: Option<String>,
    pub auth_login_userpass: Option<UserPassSettings>,
    /// Explicit proxy URL; the proxy environment variables otherwise
    pub proxy_url: Option<String>,
    /// Nameserver IP queried through the proxy
    pub dns_nameserver: Option<String>,
    pub tls: Option<TlsSettings>,
    pub connect_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| error::config(format!("invalid settings: {e}")))
    }

    /// Fill the host from [`HOST_ENV_VAR`] when it was not configured.
    #[must_use]
    pub fn with_env_defaults(mut self, env: &dyn EnvSource) -> Self {
        if self.host.is_none() {
            self.host = env.var(HOST_ENV_VAR);
        }
        self
    }

    /// Contact points in configuration order, blanks dropped.
    pub fn hosts(&self) -> Vec<String> {
        self.host
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn dial_options(&self) -> DialOptions {
        match self.connect_timeout_secs {
            Some(secs) => DialOptions::default().with_timeout(Duration::from_secs(secs)),
            None => DialOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hosts().is_empty() {
            return Err(error::config(format!(
                "missing ScyllaDB host: set `host` or the {HOST_ENV_VAR} environment variable"
            )));
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(error::config("connect_timeout_secs must be greater than zero"));
        }
        if let Some(nameserver) = self.dns_nameserver.as_deref().map(str::trim)
            && !nameserver.is_empty()
            && nameserver.parse::<IpAddr>().is_err()
        {
            return Err(error::config(format!(
                "dns_nameserver {nameserver:?} is not an IP address"
            )));
        }
        if let Some(auth) = &self.auth_login_userpass
            && auth.username.is_empty()
        {
            return Err(error::config("auth_login_userpass requires a username"));
        }
        Ok(())
    }

    /// Build the cluster handle.
    ///
    /// Order matters: the proxy is resolved first, the DNS override is
    /// installed before anything could look a name up, then the dialer is
    /// installed, then TLS is handed to the active dial path, then the
    /// authenticator is set.
    pub fn into_cluster(self, env: &dyn EnvSource) -> Result<Cluster> {
        self.validate()?;
        let hosts = self.hosts();
        log::info!("configuring cluster for {}", hosts.join(", "));

        let options = self.dial_options();
        let mut cluster = Cluster::new(hosts);
        cluster.set_dial_options(options);
        cluster.set_system_auth_keyspace(
            self.system_auth_keyspace
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_SYSTEM_AUTH_KEYSPACE),
        );

        let proxy = resolve_proxy(self.proxy_url.as_deref(), env)?;
        let nameserver = self
            .dns_nameserver
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty());

        match (&proxy, nameserver) {
            (Some((target, _)), Some(nameserver)) => {
                let resolver = install_dns(target.clone(), nameserver, options)?;
                cluster.cluster.resolver = Some(resolver);
            }
            (None, Some(nameserver)) => {
                log::warn!("dns_nameserver {nameserver} ignored: no proxy configured");
            }
            _ => {}
        }

        if let Some((target, style)) = proxy {
            cluster.install_proxy(target, style)?;
        }

        if let Some(tls) = &self.tls {
            cluster.set_tls(
                tls.ca_cert.as_bytes(),
                tls.client_cert.as_deref().map(str::as_bytes),
                tls.client_key.as_deref().map(str::as_bytes),
                tls.skip_host_verification,
            )?;
        }

        if let Some(auth) = self.auth_login_userpass {
            cluster.set_user_password_auth(auth.username, auth.password);
        }

        Ok(cluster)
    }
}
