use clap::Subcommand;
use potatoclock_core::Config;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.work_min", "client.base_url")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values, noting the ones changed from their defaults
    List,
    /// Write the defaults back to config.toml
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key} (see `potatoclock config list`)"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            let before = config.get(&key);
            config.set(&key, &value)?;
            config.save()?;
            let after = config.get(&key).unwrap_or(value);
            match before {
                Some(before) if before != after => println!("{key} = {after} (was {before})"),
                _ => println!("{key} = {after}"),
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let defaults = Config::default();
            println!("# {}", Config::path()?.display());
            for (key, value) in config.entries() {
                match defaults.get(&key) {
                    Some(default) if default != value => {
                        println!("{key} = {value}  (default {default})")
                    }
                    _ => println!("{key} = {value}"),
                }
            }
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.validate()?;
            let path = Config::path()?;
            config.save_to(&path)?;
            println!("config reset to defaults: {}", path.display());
        }
    }
    Ok(())
}
