use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};

use crate::display::OutputFormat;
use crate::notifications::IdStrategy;

/// Transient notification scenario runner
#[derive(Parser, Debug)]
#[command(name = "toastq")]
#[command(about = "Replays notification scenarios against an in-memory store with expiry timers")]
#[command(version)]
pub struct Args {
    /// Scenario file (TOML); the built-in example runs when omitted
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    // ============ NOTIFICATION SETTINGS ============

    /// Lifetime in milliseconds for steps that give no ttl (0 = persistent)
    #[arg(long = "default-ttl", value_name = "MS")]
    pub default_ttl: Option<u64>,

    /// Id generation strategy: sequential or uuid
    #[arg(long = "ids", value_name = "STRATEGY")]
    pub ids: Option<String>,

    // ============ OUTPUT ============

    /// Snapshot output: text or json
    #[arg(long, value_name = "FORMAT")]
    pub output: Option<String>,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long = "export-config", value_name = "FILE")]
    pub export_config: Option<PathBuf>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    debug!("Parsing command line arguments");
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if let Some(ref ids) = args.ids {
        ids.parse::<IdStrategy>()
            .map_err(|_| anyhow::anyhow!("Invalid id strategy '{}'. Valid options: sequential, uuid", ids))?;
    }

    if let Some(ref output) = args.output {
        output.parse::<OutputFormat>().map_err(|e| anyhow::anyhow!(e))?;
    }

    info!("CLI arguments validated successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create Args with default values for testing
    fn create_test_args() -> Args {
        Args {
            script: None,
            verbose: false,
            quiet: false,
            debug: false,
            log_format: "text".to_string(),
            log_file: None,
            log_file_level: None,
            config_file: None,
            config_name: None,
            default_ttl: None,
            ids: None,
            output: None,
            no_color: false,
            export_config: None,
        }
    }

    #[test]
    fn test_clap_parsing() {
        let args = Args::try_parse_from([
            "toastq", "--default-ttl", "250", "--ids", "uuid", "--output", "json", "--no-color", "demo.toml",
        ]).unwrap();

        assert_eq!(args.script, Some(PathBuf::from("demo.toml")));
        assert_eq!(args.default_ttl, Some(250));
        assert_eq!(args.ids.as_deref(), Some("uuid"));
        assert_eq!(args.output.as_deref(), Some("json"));
        assert!(args.no_color);
        assert_eq!(args.log_format, "text");
    }

    #[test]
    fn test_clap_rejects_non_numeric_ttl() {
        assert!(Args::try_parse_from(["toastq", "--default-ttl", "soon"]).is_err());
    }

    #[test]
    fn test_validate_args_success() {
        let args = Args {
            verbose: true,
            log_format: "json".to_string(),
            ids: Some("sequential".to_string()),
            output: Some("text".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_conflicting_flags() {
        let args = Args {
            verbose: true,
            quiet: true,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_invalid_format() {
        let args = Args {
            log_format: "invalid".to_string(),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_file_level_without_file() {
        let args = Args {
            log_file_level: Some("debug".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            log_file: Some(PathBuf::from("/tmp/toastq.log")),
            log_file_level: Some("debug".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_unknown_strategy_and_output() {
        let args = Args {
            ids: Some("random".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            output: Some("yaml".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }
}
