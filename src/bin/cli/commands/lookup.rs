use anyhow::{Context, Result};

use flashcards_lib::translate::{language_code, Suggestion};

use crate::app::App;
use crate::render::{paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    term: &str,
    collection: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let registry = app.registry()?;
    let collection = app.resolve_collection(&registry, collection)?;
    let client = app
        .translator()
        .context("Translation proxy URL is not usable, check proxy_url")?;

    let suggestion = app.block_on(client.suggest(term.trim(), &collection));

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "term": term.trim(),
                "collection": collection,
                "sourceLang": language_code(&collection),
                "translation": suggestion.translation(),
                "message": suggestion.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match &suggestion {
            Suggestion::Found(text) => {
                println!("{} → {}", term.trim(), paint(text, Color::CYAN, use_color));
            }
            other => println!("{}", paint(&other.to_string(), Color::YELLOW, use_color)),
        },
    }

    Ok(())
}
