//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    ctx.output.kv("timeout_ms", &ctx.config.api.timeout_ms.to_string());
    ctx.output.kv("max_retries", &ctx.config.api.max_retries.to_string());

    ctx.output.info("");
    ctx.output.info("[search]");
    ctx.output.kv("page_size", &ctx.config.search.page_size.to_string());
    ctx.output.kv("debounce_ms", &ctx.config.search.debounce_ms.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("path", &ctx.store_path().display().to_string());

    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let Some(config_path) = &ctx.config_path else {
        bail!("No config file found. Run `beefline config init` to create one.");
    };
    let path = config_path.to_string_lossy();

    let mut config = CliConfig::load(&path)?;
    set_config_value(&mut config, key, value)?;
    config.save(&path)?;

    ctx.output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("beefline.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));
    Ok(())
}

fn set_config_value(config: &mut CliConfig, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["api", "base_url"] => config.api.base_url = value.to_string(),
        ["api", "timeout_ms"] => config.api.timeout_ms = value.parse()?,
        ["api", "max_retries"] => config.api.max_retries = value.parse()?,
        ["search", "page_size"] => {
            let size: u32 = value.parse()?;
            if size == 0 {
                bail!("search.page_size must be at least 1");
            }
            config.search.page_size = size;
        }
        ["search", "debounce_ms"] => config.search.debounce_ms = value.parse()?,
        ["storage", "path"] => config.storage.path = Some(value.to_string()),
        _ => bail!("Unknown config key: {}", key),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_config_value() {
        let mut config = CliConfig::default();
        set_config_value(&mut config, "api.base_url", "https://api.beefline.test").unwrap();
        set_config_value(&mut config, "search.page_size", "24").unwrap();
        set_config_value(&mut config, "storage.path", "store.json").unwrap();

        assert_eq!(config.api.base_url, "https://api.beefline.test");
        assert_eq!(config.search.page_size, 24);
        assert_eq!(config.storage.path.as_deref(), Some("store.json"));
    }

    #[test]
    fn test_set_config_value_rejects_bad_input() {
        let mut config = CliConfig::default();
        assert!(set_config_value(&mut config, "search.page_size", "0").is_err());
        assert!(set_config_value(&mut config, "api.timeout_ms", "soon").is_err());
        assert!(set_config_value(&mut config, "deploy.canary", "true").is_err());
    }
}
