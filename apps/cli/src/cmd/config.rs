//! Config management commands: show, set.

use crate::cmd::ConfigCommand;
use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Dispatch config management subcommands.
pub fn run(action: &ConfigCommand, path: &Path) -> Result<()> {
    match action {
        ConfigCommand::Show => show(path),
        ConfigCommand::Set { key, value } => set(path, key, value),
    }
}

fn show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let contents = if path.exists() {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        String::new()
    };
    let updated = set_key(&contents, key, value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, updated).with_context(|| format!("writing {}", path.display()))?;
    println!("Set {key} = {value}");
    Ok(())
}

/// Set a dotted `section.field` key in a reefwatch.toml document.
///
/// The value is stored as a string, or as an integer where the field needs
/// one. The result must still load as a [`Config`].
pub fn set_key(contents: &str, key: &str, value: &str) -> Result<String> {
    let doc: toml::Table = contents.parse().context("parsing config")?;
    let Some((section, field)) = key.split_once('.').filter(|(_, f)| !f.contains('.')) else {
        anyhow::bail!("invalid key format: '{key}' (use 'section.field')");
    };

    let mut candidates = vec![toml::Value::String(value.to_owned())];
    if let Ok(n) = value.parse::<i64>() {
        candidates.push(toml::Value::Integer(n));
    }

    let mut last_err = None;
    for candidate in candidates {
        let mut doc = doc.clone();
        let table = doc
            .entry(section)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("'{section}' is not a table"))?;
        table.insert(field.to_owned(), candidate);

        let updated = doc.to_string();
        match Config::from_toml(&updated) {
            Ok(_) => return Ok(updated),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err
        .unwrap_or_else(|| anyhow::anyhow!("no value"))
        .context(format!("invalid value for {key}")))
}
