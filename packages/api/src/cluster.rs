//! Cluster configuration handle
//!
//! Holds what a CQL driver needs before opening its first connection: the
//! contact points, credentials, and the dial extensions (address dialer,
//! host dialer, TLS, resolver). [`ClusterConfig::open_connection`] walks
//! the same path a driver would, so the installed extensions can be
//! exercised without a full session.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use cqltunnel_client::connect::{first_reachable, upgrade_dialed};
use cqltunnel_client::dns::{self, ProxyDnsResolver, Resolve};
use cqltunnel_client::error::{self, Result};
use cqltunnel_client::proxy::{
    DialerStyle, EnvSource, ProxyTarget, detect_style, proxy_from_env, resolve_address_proxy,
    resolve_host_proxy,
};
use cqltunnel_client::tls::{TlsConfig, tls_config_from_pem};
use cqltunnel_client::{
    AddressDialer, DialOptions, DialedConnection, Dialer, DirectDialer, HostCandidates,
    HostDialer, ProxyDialer, SocksHostDialer, TunnelRequest,
};

/// Keyspace holding roles and permissions unless configured otherwise.
pub const DEFAULT_SYSTEM_AUTH_KEYSPACE: &str = "system_auth";

/// Port appended to contact points given without one.
pub const DEFAULT_CQL_PORT: u16 = 9042;

/// Username/password credentials presented during the CQL handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordAuthenticator {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PasswordAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordAuthenticator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Driver-level cluster configuration.
#[derive(Debug)]
pub struct ClusterConfig {
    pub hosts: Vec<String>,
    /// Connect to the contact points only; never query peers for more.
    pub disable_initial_host_lookup: bool,
    pub authenticator: Option<PasswordAuthenticator>,
    /// TLS the cluster applies itself after an address dial.
    pub ssl: Option<TlsConfig>,
    pub dialer: Option<Arc<dyn Dialer>>,
    /// Takes over candidate iteration and TLS when set.
    pub host_dialer: Option<Box<dyn HostDialer>>,
    /// Resolver for contact points; the process-wide one when unset.
    pub resolver: Option<Arc<dyn Resolve>>,
    pub dial_options: DialOptions,
}

impl ClusterConfig {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            disable_initial_host_lookup: true,
            authenticator: None,
            ssl: None,
            dialer: None,
            host_dialer: None,
            resolver: None,
            dial_options: DialOptions::default(),
        }
    }

    /// Contact points as `host:port`, in configuration order.
    pub fn contact_points(&self) -> HostCandidates {
        self.hosts.iter().map(|host| with_default_port(host)).collect()
    }

    /// Open one connection to the first reachable contact point.
    ///
    /// A host dialer receives the whole candidate list and returns an
    /// already upgraded stream. Otherwise each contact point is dialed in
    /// turn (through the address dialer, or directly) and the cluster's own
    /// TLS is applied to the winner.
    pub fn open_connection(&self) -> Result<DialedConnection> {
        let candidates = self.contact_points();

        if let Some(host_dialer) = &self.host_dialer {
            log::debug!("dialing {} via host dialer", candidates);
            return host_dialer.dial_host(&candidates);
        }

        let direct;
        let dialer: &dyn Dialer = match &self.dialer {
            Some(dialer) => dialer.as_ref(),
            None => {
                let mut fallback = DirectDialer::new().with_options(self.dial_options);
                if let Some(resolver) = &self.resolver {
                    fallback = fallback.with_resolver(Arc::clone(resolver));
                }
                direct = fallback;
                &direct
            }
        };

        first_reachable(&candidates, |addr| {
            let conn = dialer.dial(addr)?;
            match &self.ssl {
                Some(tls) => upgrade_dialed(conn, tls, &self.dial_options),
                None => Ok(conn),
            }
        })
    }

    /// Resolve every contact point with the configured or installed
    /// resolver. Unresolvable contact points fail the whole call.
    pub fn resolve_contact_points(&self) -> Result<Vec<SocketAddr>> {
        let resolver = self.resolver.clone().unwrap_or_else(dns::current);
        let mut addrs = Vec::new();
        for candidate in self.contact_points().iter() {
            let request = TunnelRequest::parse(candidate)?;
            addrs.extend(resolver.lookup(&request.host, request.port)?);
        }
        Ok(addrs)
    }
}

fn with_default_port(host: &str) -> String {
    let host = host.trim();
    if let Ok(ip) = host.parse::<IpAddr>() {
        return TunnelRequest::new(ip.to_string(), DEFAULT_CQL_PORT).authority();
    }
    match TunnelRequest::parse(host) {
        Ok(request) => request.authority(),
        Err(_) => {
            let bare = host.trim_start_matches('[').trim_end_matches(']');
            TunnelRequest::new(bare, DEFAULT_CQL_PORT).authority()
        }
    }
}

/// A configured cluster plus its open connection, if any.
#[derive(Debug)]
pub struct Cluster {
    pub cluster: ClusterConfig,
    pub system_auth_keyspace_name: String,
    proxy: Option<ProxyTarget>,
    session: Option<DialedConnection>,
}

impl Cluster {
    /// Contact points only; initial host lookup stays disabled.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cluster: ClusterConfig::new(hosts),
            system_auth_keyspace_name: DEFAULT_SYSTEM_AUTH_KEYSPACE.to_string(),
            proxy: None,
            session: None,
        }
    }

    pub fn set_user_password_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.cluster.authenticator = Some(PasswordAuthenticator {
            username: username.into(),
            password: password.into(),
        });
    }

    pub fn set_system_auth_keyspace(&mut self, name: impl Into<String>) {
        self.system_auth_keyspace_name = name.into();
    }

    pub fn system_auth_keyspace(&self) -> &str {
        &self.system_auth_keyspace_name
    }

    pub fn set_dial_options(&mut self, options: DialOptions) {
        self.cluster.dial_options = options;
    }

    /// The proxy installed by [`Cluster::set_proxy`] or
    /// [`Cluster::install_proxy`].
    pub fn proxy(&self) -> Option<&ProxyTarget> {
        self.proxy.as_ref()
    }

    /// Pick the proxy from `explicit` or the environment and install the
    /// matching dialer. `socks5://` URLs get a host dialer, anything else an
    /// address dialer. Returns `None` when no proxy is configured.
    pub fn set_proxy(&mut self, explicit: Option<&str>, env: &dyn EnvSource) -> Result<Option<&ProxyTarget>> {
        match resolve_proxy(explicit, env)? {
            Some((target, style)) => {
                self.install_proxy(target, style)?;
                Ok(self.proxy.as_ref())
            }
            None => Ok(None),
        }
    }

    /// Install a dialer for an already resolved proxy target.
    pub fn install_proxy(&mut self, target: ProxyTarget, style: DialerStyle) -> Result<()> {
        match style {
            DialerStyle::Host => {
                let mut dialer =
                    SocksHostDialer::new(target.clone())?.with_options(self.cluster.dial_options);
                if let Some(tls) = self.cluster.ssl.take() {
                    dialer.attach_tls(tls);
                }
                log::info!("installed host dialer through {}", target);
                self.cluster.dialer = None;
                self.cluster.host_dialer = Some(Box::new(dialer));
            }
            DialerStyle::Address => {
                let dialer = AddressDialer::new(target.clone()).with_options(self.cluster.dial_options);
                log::info!("installed address dialer through {}", target);
                self.cluster.host_dialer = None;
                self.cluster.dialer = Some(Arc::new(dialer));
            }
        }
        self.proxy = Some(target);
        Ok(())
    }

    /// Send hostname lookups to `nameserver` through the installed proxy.
    ///
    /// Installs the resolver process-wide and on this cluster.
    pub fn set_dns_through_proxy(&mut self, nameserver: &str) -> Result<Arc<ProxyDnsResolver>> {
        let target = self
            .proxy
            .clone()
            .ok_or_else(|| error::config("DNS through the proxy requires a proxy"))?;
        let resolver = install_dns(target, nameserver, self.cluster.dial_options)?;
        self.cluster.resolver = Some(resolver.clone());
        Ok(resolver)
    }

    /// Build the TLS configuration and hand it to whichever dial path is
    /// active: the host dialer when one is installed, the cluster otherwise.
    pub fn set_tls(
        &mut self,
        ca_certificate: &[u8],
        client_certificate: Option<&[u8]>,
        client_key: Option<&[u8]>,
        skip_host_verification: bool,
    ) -> Result<()> {
        let tls = tls_config_from_pem(
            ca_certificate,
            client_certificate,
            client_key,
            skip_host_verification,
        )?;
        match self.cluster.host_dialer.as_mut() {
            Some(host_dialer) => {
                log::debug!("TLS attached to host dialer (mutual: {})", tls.is_mutual());
                host_dialer.attach_tls(tls);
            }
            None => {
                log::debug!("TLS stored on cluster (mutual: {})", tls.is_mutual());
                self.cluster.ssl = Some(tls);
            }
        }
        Ok(())
    }

    /// Open the session connection, replacing any previous one.
    pub fn create_session(&mut self) -> Result<&mut DialedConnection> {
        let conn = self.cluster.open_connection()?;
        log::info!("connected to {}", conn.address());
        Ok(self.session.insert(conn))
    }

    pub fn session(&self) -> Option<&DialedConnection> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut DialedConnection> {
        self.session.as_mut()
    }

    pub fn close_session(&mut self) {
        if let Some(conn) = self.session.take() {
            let _ = conn.shutdown();
        }
    }
}

/// Resolve the proxy setting together with the dialer shape it calls for.
pub fn resolve_proxy(
    explicit: Option<&str>,
    env: &dyn EnvSource,
) -> Result<Option<(ProxyTarget, DialerStyle)>> {
    let raw = explicit
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| proxy_from_env(env));
    let Some(raw) = raw else {
        return Ok(None);
    };

    let style = detect_style(&raw);
    let target = match style {
        DialerStyle::Host => resolve_host_proxy(Some(&raw), env)?,
        DialerStyle::Address => resolve_address_proxy(Some(&raw), env)?,
    };
    Ok(target.map(|target| (target, style)))
}

pub(crate) fn install_dns(
    target: ProxyTarget,
    nameserver: &str,
    options: DialOptions,
) -> Result<Arc<ProxyDnsResolver>> {
    let dialer = ProxyDialer::new(target).with_options(options);
    let resolver = dns::install_proxy_dns(dialer, nameserver)?;
    log::info!("DNS lookups routed to {} through the proxy", resolver.nameserver());
    Ok(resolver)
}
