//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use rigdash_common::{Result, RigdashConfig};

/// Default configuration file name under the platform config directory.
pub const CONFIG_FILE: &str = "rigdash.json5";

/// rigdash command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(about = "Live dashboard for mining testbench telemetry")]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run with simulated devices instead of the Zenoh feed.
    #[arg(long)]
    pub demo: bool,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// The config file to load: `--config`, else the platform default if it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join("rigdash").join(CONFIG_FILE))
                .filter(|path| path.exists())
        })
    }

    /// Load the configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<RigdashConfig> {
        let mut config = match self.config_path() {
            Some(path) => RigdashConfig::load(&path)?,
            None => RigdashConfig::default(),
        };

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["rigdash", "--demo", "--log-level", "debug"]);
        assert!(args.demo);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let args = Args::parse_from(["rigdash", "--config", "/nonexistent/rigdash.json5"]);
        assert_eq!(
            args.config_path(),
            Some(PathBuf::from("/nonexistent/rigdash.json5"))
        );
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_log_level_override() {
        let path = std::env::temp_dir().join(format!("rigdash-cli-{}.json5", std::process::id()));
        std::fs::write(&path, "{ logging: { level: \"warn\" } }").unwrap();

        let args = Args {
            config: Some(path.clone()),
            demo: false,
            log_level: Some("trace".to_string()),
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.logging.level, "trace");

        std::fs::remove_file(path).unwrap();
    }
}
