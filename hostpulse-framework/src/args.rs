//! CLI argument parsing for producers.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Common CLI arguments for all producers.
#[derive(Parser, Debug, Clone)]
#[command(about = "hostpulse metrics producer")]
#[command(version)]
pub struct ProducerArgs {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ProducerArgs {
    /// Parse CLI arguments from the process command line.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Resolve which configuration file to load.
    ///
    /// An explicit `--config` is always returned, so a missing file is
    /// reported. Otherwise `default_config` is used if it exists, and
    /// `None` means built-in defaults apply.
    pub fn config_path(&self, default_config: &str) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(default_config);
                default.exists().then(|| default.to_path_buf())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = ProducerArgs::try_parse_from([
            "hostpulse-sysinfo",
            "--config",
            "test.json5",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("test.json5")));
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_explicit_config_path_kept_even_if_missing() {
        let args = ProducerArgs {
            config: Some(PathBuf::from("/nonexistent/producer.json5")),
            log_level: None,
        };
        assert_eq!(
            args.config_path("unused.json5"),
            Some(PathBuf::from("/nonexistent/producer.json5"))
        );
    }

    #[test]
    fn test_missing_default_config_means_defaults() {
        let args = ProducerArgs::try_parse_from(["hostpulse-sysinfo"]).unwrap();
        assert_eq!(args.config_path("/nonexistent/default.json5"), None);
    }
}
