//! Resolver trait and the process-wide override slot

pub mod overrides;
pub mod traits;

pub use overrides::{clear, current, install, installed, lookup_host};
pub use traits::Resolve;
