//! Tracing/logging setup shared by scholar hosts and tests.

/// Initialize process-wide tracing, formatted per `SCHOLAR_LOG_FORMAT`
/// (JSON unless set to `pretty`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

/// Initialize process-wide tracing with the given output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}

pub use self::tracing::LogFormat;

/// Subscriber configuration (filters, formats).
pub mod tracing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_init_with_is_a_no_op() {
        init();
        init_with(LogFormat::Pretty);
    }
}
