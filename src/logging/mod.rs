use env_logger::Builder;
use log::LevelFilter;

use crate::config;

/// Initializes the process logger from the configured level.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(config: &config::Log) {
    let level = config.level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Unknown log level '{}', falling back to info", config.level);
        LevelFilter::Info
    });

    let _ = Builder::from_env(env_logger::Env::default())
        .filter(None, level)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let cfg = config::Log {
            level: "debug".to_string(),
        };
        init(&cfg);
        init(&cfg);
    }
}
