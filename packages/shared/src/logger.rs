//! Logging setup utilities for the SkillSync relay.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Every target in `targets` (crate names such as `skillsync_server`) is enabled at
/// `default_log_level`. The filter can be overridden with the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use skillsync_shared::logger::setup_logger;
///
/// setup_logger(&["skillsync_server", "tower_http"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build an `EnvFilter` directive such as `skillsync_server=debug,tower_http=debug`.
fn default_filter(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_joins_targets() {
        // テスト項目: 複数のターゲットが EnvFilter の書式で連結される
        // given (前提条件):
        let targets = ["skillsync-server", "tower_http"];

        // when (操作):
        let filter = default_filter(&targets, "info");

        // then (期待する結果):
        assert_eq!(filter, "skillsync_server=info,tower_http=info");
    }

    #[test]
    fn test_default_filter_with_no_targets() {
        // テスト項目: ターゲットが空の場合、空文字列になる
        // given (前提条件):
        let targets: [&str; 0] = [];

        // when (操作):
        let filter = default_filter(&targets, "debug");

        // then (期待する結果):
        assert!(filter.is_empty());
    }
}
