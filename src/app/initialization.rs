//! Application initialization and configuration

use anyhow::Result;
use std::path::Path;
use log::{info, debug, error};
use crate::{cli, config, display, logging};

/// Load the config file and layer the command line settings over it
pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        debug!("Selecting configuration section: {}", section_name);
        manager.select_section(section_name.clone());
    }

    apply_cli_overrides(args, &mut manager);

    Ok(manager)
}

fn apply_cli_overrides(args: &cli::Args, manager: &mut config::ConfigManager) {
    if let Some(ttl) = args.default_ttl {
        manager.set_override("notifications", "default-ttl-ms", ttl.to_string());
    }
    if let Some(ids) = &args.ids {
        manager.set_override("notifications", "id-strategy", ids.clone());
    }
    if let Some(output) = &args.output {
        manager.set_override("display", "output", output.clone());
    }
    if args.no_color {
        manager.set_override("display", "color", "false");
    }
}

/// Handle configuration export command
pub fn handle_export_config(config_manager: &config::ConfigManager, export_path: &Path) -> Result<()> {
    info!("Exporting configuration to: {}", export_path.display());

    let config_content = config_manager.export_complete_config()?;

    std::fs::write(export_path, config_content)
        .map_err(|e| anyhow::anyhow!("Failed to write configuration to {}: {}", export_path.display(), e))?;

    println!("Configuration exported to: {}", export_path.display());

    Ok(())
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    use log::LevelFilter;
    use std::str::FromStr;

    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        match config.get_log_level("base", "console-level") {
            Ok(Some(level)) => {
                debug!("Using console log level from config: {:?}", level);
                level
            }
            Ok(None) => LevelFilter::Info,
            Err(e) => {
                debug!("Invalid console-level in config, using default: {}", e);
                LevelFilter::Info
            }
        }
    };

    debug!("Console log level set to: {:?}", console_level);

    let format = if !args.log_format.is_empty() && args.log_format != "text" {
        logging::LogFormat::from_str(&args.log_format)
            .map_err(|e| anyhow::anyhow!(e))?
    } else {
        match config.get_value("base", "log-format") {
            Some(format_str) => {
                debug!("Using log format from config: {}", format_str);
                logging::LogFormat::from_str(format_str)
                    .unwrap_or(logging::LogFormat::Text)
            }
            None => logging::LogFormat::Text,
        }
    };

    debug!("Log format set to: {:?}", format);

    let log_file_path = args.log_file.clone()
        .or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => {
            match config.get_log_level("base", "file-log-level") {
                Ok(Some(level)) => {
                    debug!("Using file log level from config: {:?}", level);
                    Some(level)
                }
                Ok(None) => None,
                Err(e) => {
                    debug!("Invalid file-log-level in config, using None: {}", e);
                    None
                }
            }
        }
    };

    let (destination, file_level) = match (log_file_path.as_ref(), file_log_level) {
        (Some(file_path), Some(level)) => {
            debug!("File logging enabled: {} (level: {:?})", file_path.display(), level);
            (logging::LogDestination::Both(file_path.clone()), Some(level))
        }
        (Some(file_path), None) => {
            debug!("File logging enabled: {} (level: {:?} - same as console)", file_path.display(), console_level);
            (logging::LogDestination::Both(file_path.clone()), Some(console_level))
        }
        (None, None) => {
            debug!("Console-only logging enabled");
            (logging::LogDestination::Console, None)
        }
        (None, Some(_)) => {
            error!("Log file level specified without log file - this should have been caught during validation");
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Build the snapshot renderer from display settings
pub fn create_renderer(config: &config::ConfigManager) -> Result<display::NotificationRenderer> {
    let display_config = config.get_display_config()?;
    let colours = display::ColourManager::from_config(&display_config);
    Ok(display::NotificationRenderer::new(colours, display_config.output))
}
