//! Process-wide resolver override
//!
//! The cluster client resolves node names through whatever resolver is
//! installed here. Install before the first dial; the last install wins.

use std::sync::{Arc, PoisonError, RwLock};

use super::traits::Resolve;
use crate::dns::gai::GaiResolver;
use crate::error::Result;

static OVERRIDE: RwLock<Option<Arc<dyn Resolve>>> = RwLock::new(None);

/// Route every subsequent lookup through `resolver`.
pub fn install(resolver: Arc<dyn Resolve>) {
    let mut slot = OVERRIDE.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        tracing::warn!("replacing previously installed resolver with {:?}", resolver);
    } else {
        tracing::info!("installed resolver override {:?}", resolver);
    }
    *slot = Some(resolver);
}

/// Remove the override, falling back to the system resolver.
pub fn clear() {
    let mut slot = OVERRIDE.write().unwrap_or_else(PoisonError::into_inner);
    if slot.take().is_some() {
        tracing::info!("cleared resolver override");
    }
}

/// The installed override, if any.
pub fn installed() -> Option<Arc<dyn Resolve>> {
    OVERRIDE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// The resolver lookups should use right now.
pub fn current() -> Arc<dyn Resolve> {
    installed().unwrap_or_else(|| Arc::new(GaiResolver::new()))
}

/// Resolve through [`current`].
pub fn lookup_host(host: &str, port: u16) -> Result<Vec<std::net::SocketAddr>> {
    current().lookup(host, port)
}
