//! Contact-point resolution. The global-override case installs the
//! process-wide resolver, so these stay in their own test binary.

mod common;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use common::init_logging;
use cqltunnel::client::dns::{self, Resolve};
use cqltunnel::client::error;
use cqltunnel::{ClusterConfig, Result};

/// Answers every name with one fixed address and remembers what it was
/// asked. `unknown` names fail the lookup.
#[derive(Debug)]
struct FixedResolver {
    ip: IpAddr,
    unknown: Option<&'static str>,
    asked: Mutex<Vec<(String, u16)>>,
}

impl FixedResolver {
    fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            unknown: None,
            asked: Mutex::new(Vec::new()),
        }
    }

    fn asked(&self) -> Vec<(String, u16)> {
        self.asked.lock().expect("lookup log").clone()
    }
}

impl Resolve for FixedResolver {
    fn lookup(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>> {
        self.asked.lock().expect("lookup log").push((host.to_string(), port));
        if self.unknown == Some(host) {
            return Err(error::resolve(format!("no such host: {host}")));
        }
        Ok(vec![SocketAddr::new(self.ip, port)])
    }
}

#[test]
fn test_explicit_resolver_gets_default_port() {
    init_logging();
    let resolver = Arc::new(FixedResolver::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5))));
    let mut config = ClusterConfig::new(["scylla.internal", "scylla-2.internal:19042"]);
    config.resolver = Some(resolver.clone());

    let addrs = config.resolve_contact_points().expect("both contact points resolve");
    assert_eq!(
        addrs,
        [
            "10.0.0.5:9042".parse::<SocketAddr>().expect("addr"),
            "10.0.0.5:19042".parse::<SocketAddr>().expect("addr"),
        ]
    );
    assert_eq!(
        resolver.asked(),
        [
            ("scylla.internal".to_string(), 9042),
            ("scylla-2.internal".to_string(), 19042),
        ]
    );
}

#[test]
fn test_unresolvable_contact_point_fails_the_call() {
    let resolver = Arc::new(FixedResolver {
        unknown: Some("gone.internal"),
        ..FixedResolver::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
    });
    let mut config = ClusterConfig::new(["scylla.internal", "gone.internal"]);
    config.resolver = Some(resolver);

    let err = config
        .resolve_contact_points()
        .expect_err("one contact point does not resolve");
    assert!(err.is_resolve(), "{err:?}");
}

#[test]
fn test_installed_override_is_used_without_explicit_resolver() {
    init_logging();
    let resolver = Arc::new(FixedResolver::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9))));
    dns::install(resolver.clone());

    let config = ClusterConfig::new(["scylla.internal"]);
    let addrs = config.resolve_contact_points();
    dns::clear();

    assert_eq!(
        addrs.expect("resolved through the override"),
        ["10.0.0.9:9042".parse::<SocketAddr>().expect("addr")]
    );
    assert_eq!(resolver.asked(), [("scylla.internal".to_string(), 9042)]);
}
