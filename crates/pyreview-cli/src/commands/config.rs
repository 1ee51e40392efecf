//! Configuration commands.

use anyhow::{Context, Result};
use pyreview::{ConfigStore, StateDir};

fn store(state: &StateDir) -> Result<ConfigStore> {
    state
        .ensure()
        .with_context(|| format!("Failed to create {}", state.root().display()))?;
    Ok(ConfigStore::new(state))
}

/// Runs the config show command.
pub fn show(state: &StateDir) -> Result<()> {
    let config = store(state)?.load();
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Runs the config get command.
pub fn get(state: &StateDir, key: &str) -> Result<()> {
    let config = store(state)?.load();
    let value = config.get(key)?;
    println!("{value}");
    Ok(())
}

/// Runs the config set command.
pub fn set(state: &StateDir, key: &str, value: &str) -> Result<()> {
    let store = store(state)?;
    let mut config = store.load();
    config
        .set(key, value)
        .with_context(|| format!("Cannot set {key}"))?;
    store.save(&config).context("Failed to save configuration")?;
    println!("{key} = {}", config.get(key)?);
    Ok(())
}

/// Runs the config reset command.
pub fn reset(state: &StateDir) -> Result<()> {
    let store = store(state)?;
    store.reset().context("Failed to reset configuration")?;
    println!("Configuration reset to defaults at {}", store.path().display());
    Ok(())
}

/// Runs the config path command.
pub fn path(state: &StateDir) {
    println!("{}", state.config_path().display());
}
