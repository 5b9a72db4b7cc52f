//! Dial configuration
//!
//! Timeouts and socket options shared by every step of the dial path.

mod dial_options;

pub use dial_options::{DEFAULT_DIAL_TIMEOUT, DialOptions};
