use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Directives from `RUST_LOG` refine the given default level.
#[must_use]
pub fn filter(level: LevelFilter, directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(directives)
}

/// Also forwards records of the `log` macros used by the domain and storage crates.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init(level: LevelFilter) -> Result<(), TryInitError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(filter(level, &directives))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_default_level() {
        assert_eq!(filter(LevelFilter::WARN, "").to_string(), "warn");
    }

    #[test]
    fn test_filter_directives() {
        let filter = filter(LevelFilter::INFO, "ironplan_storage=debug").to_string();

        assert!(filter.contains("ironplan_storage=debug"));
        assert!(filter.contains("info"));
    }
}
