//! # Config Subcommand
//!
//! Prints the effective workflow policy after the config file and
//! environment overrides have been applied.

use anyhow::{Context, Result};
use clap::Args;

use market_orders::LifecycleConfig;

/// Arguments for `market config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print JSON instead of YAML.
    #[arg(long)]
    pub json: bool,
}

/// Render `config` in the requested format.
pub fn render_config(args: &ConfigArgs, config: &LifecycleConfig) -> Result<String> {
    if args.json {
        serde_json::to_string_pretty(config).context("serializing config as JSON")
    } else {
        serde_yaml::to_string(config).context("serializing config as YAML")
    }
}

/// Execute `market config`.
pub fn run_config(args: &ConfigArgs, config: &LifecycleConfig) -> Result<u8> {
    let out = render_config(args, config)?;
    println!("{}", out.trim_end());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_output_round_trips_through_loader() {
        let cfg = LifecycleConfig {
            auto_complete_days: 12,
        };
        let out = render_config(&ConfigArgs { json: false }, &cfg).unwrap();
        assert_eq!(LifecycleConfig::from_yaml(&out).unwrap(), cfg);
    }

    #[test]
    fn json_output() {
        let out = render_config(&ConfigArgs { json: true }, &LifecycleConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["auto_complete_days"], 7);
    }

    #[test]
    fn loaded_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.yaml");
        std::fs::write(&path, "auto_complete_days: 5\n").unwrap();
        let cfg = LifecycleConfig::from_file(&path).unwrap();
        let out = render_config(&ConfigArgs { json: false }, &cfg).unwrap();
        assert!(out.contains("auto_complete_days: 5"));
    }
}
