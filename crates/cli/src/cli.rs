//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Level;
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// sinkmux - Compose log sinks into fanout, failover, pool and routing trees
#[derive(Parser, Debug)]
#[command(
    name = "sinkmux",
    author,
    version,
    about = "Composable structured-log sink topologies",
    long_about = "Loads a sink topology from a TOML or JSON file, validates it, prints it\n\
                  as a tree, and emits test records through it to see which sinks\n\
                  receive them."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SINKMUX_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SINKMUX_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup implied by `-v`/`-q`/`--log-format`.
    /// `--quiet` wins over `RUST_LOG`.
    pub fn observability_config(&self) -> ObservabilityConfig {
        let default_log_level = if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        ObservabilityConfig {
            log_format: self.log_format.clone().into(),
            metrics_port: None,
            default_log_level: default_log_level.to_string(),
            use_env_filter: !self.quiet,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    Validate(ValidateArgs),

    /// Display the configured topology
    Info(InfoArgs),

    /// Build the topology and send records through it
    Emit(EmitArgs),
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sinkmux.toml", env = "SINKMUX_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sinkmux.toml", env = "SINKMUX_CONFIG")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `emit` command
///
/// `--with` attributes are bound first, then `--group`s are opened in order,
/// so `--attr` values land inside the innermost group.
#[derive(Parser, Debug, Clone)]
pub struct EmitArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "sinkmux.toml", env = "SINKMUX_CONFIG")]
    pub config: PathBuf,

    /// Record level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub level: Level,

    /// Record message
    #[arg(short, long)]
    pub message: String,

    /// Record attribute as key=value (repeatable)
    #[arg(long = "attr", value_parser = parse_key_value)]
    pub attrs: Vec<(String, String)>,

    /// Group to open before emitting (repeatable, outermost first)
    #[arg(long = "group")]
    pub groups: Vec<String>,

    /// Attribute bound to the logger as key=value (repeatable)
    #[arg(long = "with", value_parser = parse_key_value)]
    pub bound: Vec<(String, String)>,

    /// Number of times to emit the record
    #[arg(long, default_value = "1")]
    pub repeat: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SINKMUX_METRICS_PORT")]
    pub metrics_port: u16,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Parse `key=value`; the value may itself contain `=`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observability_config_from_flags() {
        let quiet = Cli::parse_from(["sinkmux", "-q", "--log-format", "json", "info", "-c", "t.toml"]);
        let config = quiet.observability_config();
        assert_eq!(config.default_log_level, "warn");
        assert!(!config.use_env_filter);
        assert!(matches!(config.log_format, observability::LogFormat::Json));

        let verbose = Cli::parse_from(["sinkmux", "-vv", "info", "-c", "t.toml"]);
        let config = verbose.observability_config();
        assert_eq!(config.default_log_level, "trace");
        assert!(config.use_env_filter);
        assert!(matches!(config.log_format, observability::LogFormat::Pretty));
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("novalue").is_err());
    }

    #[test]
    fn test_emit_args_parse() {
        let cli = Cli::parse_from([
            "sinkmux", "-v", "emit", "-c", "t.toml", "--level", "warn", "-m", "hello",
            "--attr", "n=1", "--group", "req", "--with", "svc=api",
        ]);
        assert_eq!(cli.verbose, 1);
        let Commands::Emit(args) = cli.command else {
            panic!("expected emit");
        };
        assert_eq!(args.level, Level::Warn);
        assert_eq!(args.message, "hello");
        assert_eq!(args.attrs, vec![("n".to_string(), "1".to_string())]);
        assert_eq!(args.groups, vec!["req"]);
        assert_eq!(args.bound, vec![("svc".to_string(), "api".to_string())]);
        assert_eq!(args.repeat, 1);
    }
}
