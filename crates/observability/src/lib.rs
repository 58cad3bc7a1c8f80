//! Process-wide tracing setup.

/// Log formatting and filtering.
pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize tracing for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
