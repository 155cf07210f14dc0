use anyhow::{bail, Context, Result};

use flashcards_lib::flashcards::{Card, CardStore};

use crate::app::App;
use crate::render::{paint, Color};
use crate::OutputFormat;

fn card_json(card: &Card, collection: &str) -> serde_json::Value {
    serde_json::json!({
        "id": card.id,
        "collection": collection,
        "term": card.term,
        "definition": card.definition,
    })
}

/// Registry lookup plus the cards of the resolved collection
fn open(app: &App, collection: Option<&str>) -> Result<(String, CardStore)> {
    let registry = app.registry()?;
    let collection = app.resolve_collection(&registry, collection)?;
    let cards = app.load_cards(&collection)?;
    Ok((collection, cards))
}

pub fn run_list(
    app: &App,
    collection: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let (collection, cards) = open(app, collection)?;

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = cards
                .cards()
                .iter()
                .map(|card| card_json(card, &collection))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards in \"{}\"", collection);
                return Ok(());
            }
            for card in cards.cards() {
                println!(
                    "{}  {}  {}",
                    paint(&card.id, Color::DIM, use_color),
                    paint(&card.term, Color::BOLD, use_color),
                    card.definition
                );
            }
        }
    }

    Ok(())
}

pub fn run_add(
    app: &App,
    collection: Option<&str>,
    term: &str,
    definition: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let (collection, mut cards) = open(app, collection)?;

    let card = app
        .block_on(cards.add_card(app.store.as_ref(), term, definition))
        .context("Failed to add card")?;
    let Some(card) = card else {
        bail!("Term and definition must not be blank");
    };

    print_saved(&card, &collection, "Added", format, use_color)
}

pub fn run_edit(
    app: &App,
    collection: Option<&str>,
    id: &str,
    term: &str,
    definition: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let (collection, mut cards) = open(app, collection)?;
    if cards.get(id).is_none() {
        bail!("No card '{}' in \"{}\"", id, collection);
    }

    let card = app
        .block_on(cards.update_card(app.store.as_ref(), id, term, definition))
        .context("Failed to update card")?;
    let Some(card) = card else {
        bail!("Term and definition must not be blank");
    };

    print_saved(&card, &collection, "Updated", format, use_color)
}

pub fn run_delete(
    app: &App,
    collection: Option<&str>,
    id: &str,
    format: &OutputFormat,
    _use_color: bool,
) -> Result<()> {
    let (collection, mut cards) = open(app, collection)?;

    let removed = app
        .block_on(cards.delete_card(app.store.as_ref(), id))
        .context("Failed to delete card")?;
    if !removed {
        bail!("No card '{}' in \"{}\"", id, collection);
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": id, "collection": collection, "deleted": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Deleted card {} from \"{}\"", id, collection);
        }
    }

    Ok(())
}

fn print_saved(
    card: &Card,
    collection: &str,
    verb: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card_json(card, collection))?);
        }
        OutputFormat::Plain => {
            println!(
                "{} card \"{}\" in \"{}\"",
                verb,
                paint(&card.term, Color::GREEN, use_color),
                collection
            );
            println!("  ID: {}", card.id);
        }
    }
    Ok(())
}
