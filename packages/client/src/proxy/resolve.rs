//! Proxy address resolution for both dialer shapes

use url::Url;

use super::env::{EnvSource, proxy_from_env};
use super::types::{ProxyAuth, ProxyScheme, ProxyTarget};
use crate::error::{self, Result};

/// The client library extension point a proxy is installed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialerStyle {
    /// Generic address dialer; the client library applies TLS itself.
    Address,
    /// Per-host dialer that owns candidate iteration and TLS.
    Host,
}

impl DialerStyle {
    fn default_scheme(self) -> ProxyScheme {
        match self {
            DialerStyle::Address => ProxyScheme::Http,
            DialerStyle::Host => ProxyScheme::Socks5,
        }
    }
}

/// Pick the dialer shape for a raw proxy setting: SOCKS5 URLs go through the
/// host dialer, everything else through the address dialer.
#[must_use]
pub fn detect_style(raw: &str) -> DialerStyle {
    match raw.trim().split_once("://") {
        Some((scheme, _)) if is_socks5(scheme) => DialerStyle::Host,
        _ => DialerStyle::Address,
    }
}

/// Proxy for the address dialer. Scheme-less input means HTTP CONNECT.
///
/// Returns `Ok(None)` when neither the explicit value nor the environment
/// names a proxy.
pub fn resolve_address_proxy(
    explicit: Option<&str>,
    env: &dyn EnvSource,
) -> Result<Option<ProxyTarget>> {
    resolve(explicit, env, DialerStyle::Address)
}

/// Proxy for the host dialer. Only SOCKS5 is accepted; `http` and `https`
/// schemes are a configuration error. Scheme-less input means SOCKS5.
pub fn resolve_host_proxy(
    explicit: Option<&str>,
    env: &dyn EnvSource,
) -> Result<Option<ProxyTarget>> {
    resolve(explicit, env, DialerStyle::Host)
}

fn resolve(
    explicit: Option<&str>,
    env: &dyn EnvSource,
    style: DialerStyle,
) -> Result<Option<ProxyTarget>> {
    let raw = explicit
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| proxy_from_env(env));

    match raw {
        Some(raw) => parse_proxy(&raw, style).map(Some),
        None => Ok(None),
    }
}

fn parse_proxy(raw: &str, style: DialerStyle) -> Result<ProxyTarget> {
    let (scheme, url_text) = match raw.split_once("://") {
        Some((scheme, _)) => (scheme_for(scheme, style)?, raw.to_string()),
        None => {
            let scheme = style.default_scheme();
            (scheme, format!("{scheme}://{raw}"))
        }
    };

    let parsed = Url::parse(&url_text)
        .map_err(|e| e.to_string())
        .and_then(|url| target_from_url(&url, scheme));

    match parsed {
        Ok(target) => {
            tracing::debug!(target: "cqltunnel::proxy", proxy = %target, "resolved proxy address");
            Ok(target)
        }
        Err(reason) => {
            tracing::warn!(
                target: "cqltunnel::proxy",
                input = %raw,
                %reason,
                "proxy address is not a valid URL, using it verbatim"
            );
            Ok(verbatim(raw, scheme))
        }
    }
}

fn scheme_for(scheme: &str, style: DialerStyle) -> Result<ProxyScheme> {
    let scheme = scheme.to_ascii_lowercase();
    match scheme.as_str() {
        "http" | "https" => match style {
            DialerStyle::Address => Ok(ProxyScheme::Http),
            DialerStyle::Host => Err(error::config(format!(
                "the host dialer tunnels through socks5 only, got a {scheme} proxy"
            ))),
        },
        s if is_socks5(s) => Ok(ProxyScheme::Socks5),
        other => Err(error::config(format!("unsupported proxy scheme: {other}"))),
    }
}

fn is_socks5(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("socks5") || scheme.eq_ignore_ascii_case("socks5h")
}

fn target_from_url(url: &Url, scheme: ProxyScheme) -> std::result::Result<ProxyTarget, String> {
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| "missing host".to_string())?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port = url
        .port_or_known_default()
        .unwrap_or_else(|| scheme.default_port());

    let auth = if url.username().is_empty() {
        None
    } else {
        Some(ProxyAuth {
            username: decode_userinfo(url.username()),
            password: decode_userinfo(url.password().unwrap_or_default()),
        })
    };

    Ok(ProxyTarget {
        scheme,
        host: host.to_string(),
        port,
        auth,
    })
}

fn decode_userinfo(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Best-effort target for input the URL parser rejects: the text after any
/// scheme prefix is the host, with a trailing `:port` split off when present.
fn verbatim(raw: &str, scheme: ProxyScheme) -> ProxyTarget {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    if let Some((host, port)) = rest.rsplit_once(':')
        && !host.is_empty()
        && let Ok(port) = port.parse::<u16>()
    {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        return ProxyTarget::new(scheme, host, port);
    }
    ProxyTarget::new(scheme, rest, scheme.default_port())
}
