use anyhow::{bail, Context, Result};

use flashcards_lib::flashcards::{normalize_collection_name, CardStore, RegistryError};

use crate::app::App;
use crate::render::{paint, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let registry = app.registry()?;

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = registry
                .names()
                .iter()
                .map(|name| {
                    serde_json::json!({
                        "name": name,
                        "default": registry.active() == Some(name.as_str()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for name in registry.names() {
                if registry.active() == Some(name.as_str()) {
                    println!("* {}", paint(name, Color::BOLD, use_color));
                } else {
                    println!("  {}", name);
                }
            }
        }
    }

    Ok(())
}

pub fn run_add(app: &App, name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut registry = app.registry()?;

    let added = app
        .block_on(registry.add_collection(app.store.as_ref(), name))
        .context("Failed to add collection")?;

    let Some(added) = added else {
        let normalized = normalize_collection_name(name);
        if normalized.is_empty() {
            bail!("Collection name must not be blank");
        }
        if registry.contains(&normalized) {
            bail!("Collection '{}' already exists", normalized);
        }
        bail!("'{}' is reserved and cannot be used as a collection name", normalized);
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name": added,
                "collections": registry.names(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Added collection \"{}\"", paint(&added, Color::GREEN, use_color));
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut registry = app.registry()?;
    let name = app.resolve_collection(&registry, Some(name))?;

    match app.block_on(registry.remove_collection(app.store.as_ref(), &name)) {
        Ok(_) => {}
        Err(RegistryError::LastCollection) => {
            bail!("Cannot remove '{}', it is the last collection", name);
        }
        Err(e) => return Err(e).context("Failed to remove collection"),
    }

    let purged = app
        .block_on(CardStore::purge(app.store.as_ref(), &name))
        .context("Collection removed but its cards could not be deleted")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "name": name,
                "deletedCards": purged,
                "collections": registry.names(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Removed collection \"{}\" ({} cards deleted)",
                paint(&name, Color::YELLOW, use_color),
                purged
            );
        }
    }

    Ok(())
}
