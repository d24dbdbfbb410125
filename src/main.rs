use std::path::PathBuf;

use anyhow::Context;

use cardpress::deckfile::Deckfile;
use cardpress::{DeckSession, MediaSource, NoteTypeOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: cardpress <deck.toml> [-o output.apkg]");
        std::process::exit(2);
    }

    let deck_path = PathBuf::from(&args[1]);
    let output_path = match args.iter().position(|a| a == "-o") {
        Some(pos) => match args.get(pos + 1) {
            Some(path) => PathBuf::from(path),
            None => {
                eprintln!("Usage: cardpress <deck.toml> [-o output.apkg]");
                std::process::exit(2);
            }
        },
        None => deck_path.with_extension("apkg"),
    };

    let deckfile = Deckfile::load(&deck_path)
        .with_context(|| format!("could not load deck file {}", deck_path.display()))?;

    let mut options = NoteTypeOptions::default();
    if let Some(qfmt) = &deckfile.question_format {
        options.question_format = qfmt.clone();
    }
    if let Some(afmt) = &deckfile.answer_format {
        options.answer_format = afmt.clone();
    }
    if let Some(css) = &deckfile.css {
        options.css = css.clone();
    }

    let mut session = DeckSession::new(&deckfile.name, options).await?;

    for card in &deckfile.cards {
        session
            .add_card_tagged(&card.front, &card.back, card.tags.clone())
            .await?;
    }

    // Media files are read lazily, as part of saving the package.
    let base_dir = deck_path.parent().unwrap_or(std::path::Path::new("."));
    for entry in &deckfile.media {
        let full_path = base_dir.join(&entry.path);
        session.add_media(
            entry.package_name(),
            MediaSource::deferred(async move { tokio::fs::read(full_path).await }),
        );
    }

    let archive = session.save().await?;
    std::fs::write(&output_path, &archive)
        .with_context(|| format!("could not write {}", output_path.display()))?;

    println!(
        "Wrote {} ({} cards, {} media files)",
        output_path.display(),
        deckfile.cards.len(),
        deckfile.media.len()
    );

    Ok(())
}
