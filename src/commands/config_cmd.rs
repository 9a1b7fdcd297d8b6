use clap::{Args, Subcommand};
use std::path::Path;

use super::OutputFormat;
use crate::config::Config;

const CONFIG_TEMPLATE: &str = "\
# setlog configuration
# Environment variables (SETLOG_API_URL, SETLOG_TOKEN_PATH, SETLOG_PAGE_SIZE,
# SETLOG_TIMEOUT_SECS) take precedence over values in this file.

# Base URL of the sets API
api_url: http://localhost:3000

# Number of sets per page
page_size: 10

# Seconds before a request is abandoned
request_timeout_secs: 10
";

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<&Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                config_path
                                    .map(Path::to_path_buf)
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            );
                        }
                        println!();

                        println!(
                            "api_url: {}",
                            config.api_url.value.as_deref().unwrap_or("(not set)")
                        );
                        println!("  source: {}", config.api_url.source);
                        println!();

                        println!("token_path: {}", config.token_path.value.display());
                        println!("  source: {}", config.token_path.source);
                        println!();

                        println!("page_size: {}", config.page_size.value);
                        println!("  source: {}", config.page_size.source);
                        println!();

                        println!(
                            "request_timeout_secs: {}",
                            config.request_timeout_secs.value
                        );
                        println!("  source: {}", config.request_timeout_secs.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init { force } => {
                let path = config_path
                    .map(Path::to_path_buf)
                    .unwrap_or_else(Config::default_config_path);
                write_template(&path, *force)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        }
    }
}

fn write_template(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}
