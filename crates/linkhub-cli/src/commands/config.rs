//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use linkhub_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend.to_string(),
                    "rest_url": config.rest_url,
                    "api_key_set": config.api_key.is_some(),
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir: {}", config.data_dir.display());
            println!("  backend:  {}", config.backend);
            println!(
                "  rest_url: {}",
                config.rest_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  api_key:  {}",
                if config.api_key.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!(
                "  log_file: {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(stderr)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    config.set(&key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "api_key" && !value.is_empty() {
        "(hidden)"
    } else {
        value.as_str()
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkhub_core::BackendKind;
    use tempfile::TempDir;

    #[test]
    fn test_set_writes_to_cli_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set("backend".into(), "rest".into(), Some(&path), &output).unwrap();
        set(
            "rest_url".into(),
            "https://project.example.com".into(),
            Some(&path),
            &output,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.backend, BackendKind::Rest);
        assert_eq!(
            config.rest_url.as_deref(),
            Some("https://project.example.com")
        );
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        assert!(set("sync_url".into(), "x".into(), Some(&path), &output).is_err());
        assert!(!path.exists());
    }
}
