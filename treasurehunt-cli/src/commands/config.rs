//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! for viewing and modifying `config.ini` from the command line.

use std::path::Path;

use clap::Subcommand;
use treasurehunt::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., hunt.duration_secs)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., hunt.duration_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the user configuration file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => println!("{}", get(&path, &key)?),
        ConfigCommands::Set { key, value } => {
            let name = set(&path, &key, &value)?;
            println!("Set {} = {}", name, value);
        }
        ConfigCommands::List => print!("{}", list(&path)?),
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'treasurehunt config list' to see available keys.",
            key
        ))
    })
}

/// Value of `key`, or `(not set)`.
fn get(path: &Path, key: &str) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load_from(path)?;
    let value = config_key.get(&config);

    Ok(if value.is_empty() {
        "(not set)".to_string()
    } else {
        value
    })
}

/// Store `value` under `key`; returns the canonical key name.
fn set(path: &Path, key: &str, value: &str) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    let mut config = ConfigFile::load_from(path)?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;
    Ok(config_key.name())
}

/// Every setting, grouped by section.
fn list(path: &Path) -> Result<String, CliError> {
    let config = ConfigFile::load_from(path)?;

    let mut out = String::from("Configuration Settings\n======================\n");
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            out.push('\n');
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            out.push_str(&format!("  {} = (not set)\n", key.key_name()));
        } else {
            out.push_str(&format!("  {} = {}\n", key.key_name(), value));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        assert_eq!(get(&path, "hunt.duration_secs").unwrap(), "3600");
        assert_eq!(
            set(&path, "hunt.duration_secs", "900").unwrap(),
            "hunt.duration_secs"
        );
        assert_eq!(get(&path, "hunt.duration_secs").unwrap(), "900");
        assert_eq!(get(&path, "logging.directory").unwrap(), "(not set)");
    }

    #[test]
    fn test_unknown_key_mentions_list() {
        let dir = TempDir::new().unwrap();
        let err = get(&dir.path().join("config.ini"), "hunt.colour").unwrap_err();
        assert!(err.to_string().contains("config list"));
    }

    #[test]
    fn test_invalid_value_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        assert!(set(&path, "hunt.tick_ms", "0").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_list_groups_sections() {
        let dir = TempDir::new().unwrap();
        let listing = list(&dir.path().join("config.ini")).unwrap();

        assert!(listing.contains("[hunt]\n  duration_secs = 3600\n"));
        assert!(listing.contains("[logging]\n  directory = (not set)\n"));
        let hunt = listing.find("[hunt]").unwrap();
        let heading = listing.find("[heading]").unwrap();
        assert!(hunt < heading);
    }
}
