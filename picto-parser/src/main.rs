use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use picto_parser_lib::output::sequence_to_bracketed;
use picto_parser_lib::{
    choices_or_canned, ArasaacCatalog, Catalog, DisplaySettings, ExtractionContext, Extractor,
    ExtractorConfig, Lexicon, NoCatalog, PersonalStore, Pictogram,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picto-parser", about = "Italian sentence to pictogram extractor")]
struct Cli {
    /// Sentence to extract pictograms from. If omitted, reads from stdin.
    input: Option<String>,

    /// Also list the options a question offers.
    #[arg(long)]
    choices: bool,

    /// Output in bracketed {word:source} format.
    #[arg(long)]
    bracketed: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Never query the online catalog.
    #[arg(long)]
    offline: bool,

    /// Also drop near-duplicate words.
    #[arg(long)]
    approx: bool,

    /// Extractor configuration (JSON).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Display settings: skin and hair tones (JSON).
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Personal pictogram store (JSON).
    #[arg(long, value_name = "FILE")]
    personal: Option<PathBuf>,

    /// Catalog language.
    #[arg(long, default_value = "it")]
    locale: String,
}

#[derive(Serialize)]
struct LineOutput<'a> {
    sentence: &'a str,
    pictograms: Vec<Pictogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config: ExtractorConfig = match &cli.config {
        Some(path) => read_json(path)?,
        None => ExtractorConfig::default(),
    };
    if cli.approx {
        config.approx_dedup = true;
    }
    let settings: DisplaySettings = match &cli.settings {
        Some(path) => read_json(path)?,
        None => DisplaySettings::default(),
    };
    let personal = match &cli.personal {
        Some(path) => PersonalStore::open(path)
            .with_context(|| format!("failed to open personal store {}", path.display()))?
            .list(),
        None => vec![],
    };
    debug!(?config, personal = personal.len(), "configuration loaded");

    let catalog: Arc<dyn Catalog> = if cli.offline {
        Arc::new(NoCatalog)
    } else {
        Arc::new(ArasaacCatalog::new(&cli.locale).context("failed to set up the catalog client")?)
    };
    let extractor = Extractor::new(Arc::new(Lexicon::new()), catalog, config);
    let ctx = ExtractionContext::new(settings, personal);

    match cli.input {
        Some(ref text) => process_line(text, &extractor, &ctx, &cli).await?,
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line.context("failed to read stdin")?;
                if !line.trim().is_empty() {
                    process_line(&line, &extractor, &ctx, &cli).await?;
                }
            }
        }
    }
    Ok(())
}

async fn process_line(
    line: &str,
    extractor: &Extractor,
    ctx: &ExtractionContext,
    cli: &Cli,
) -> Result<()> {
    let pictograms = extractor.extract(line, ctx).await;
    info!(sentence = line, found = pictograms.len(), "extracted");
    let choices = cli
        .choices
        .then(|| choices_or_canned(line, extractor.lexicon()));

    if cli.bracketed {
        println!("{}", sequence_to_bracketed(&pictograms));
        if let Some(choices) = choices {
            println!("[{}]", choices.join(", "));
        }
        return Ok(());
    }

    let output = LineOutput {
        sentence: line,
        pictograms,
        choices,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    println!("{}", json.context("JSON serialization failed")?);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}
