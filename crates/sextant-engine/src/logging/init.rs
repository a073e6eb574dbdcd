use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "sextant_engine=debug,wgpu_core=warn").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_level: log::LevelFilter,
    /// Lets `RUST_LOG` override the default level (but not an explicit `env_filter`).
    pub respect_rust_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: log::LevelFilter::Info,
            respect_rust_log: true,
        }
    }
}

/// wgpu internals are chatty at info level; keep them at warn unless asked.
const QUIET_MODULES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`, before the render context is created.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let env_filter = if config.respect_rust_log {
            std::env::var("RUST_LOG").ok()
        } else {
            None
        };

        if let Some(filter) = config.env_filter.or(env_filter) {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(config.default_level);
            for module in QUIET_MODULES {
                builder.filter_module(module, log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}
