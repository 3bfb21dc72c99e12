use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::info;

use ndowe_dict::{
    Dictionary, EngineConfig, FileStore, JsonFileLoader, KvStore, Language, MemoryStore, SearchMode, SearchQuery,
};

#[derive(Parser)]
#[command(name = "ndowe-search", version, about = "Search a Spanish-Ndowe dictionary offline")]
struct Cli {
    /// Path to the dictionary JSON file
    dict_file: PathBuf,
    /// Word or phrase to look up
    query: String,
    /// Search mode: exact, fuzzy, partial or hybrid
    #[arg(short, long, default_value = "hybrid")]
    mode: String,
    /// Query language: es (Spanish) or ndowe
    #[arg(short, long, default_value = "es")]
    lang: String,
    /// Maximum number of results
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Keep entries that have no translation
    #[arg(long)]
    include_empty: bool,
    /// Print autocomplete suggestions instead of results
    #[arg(long)]
    autocomplete: bool,
    /// Directory for the offline cache (memory-only when omitted)
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Path to an engine configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn run<S: KvStore>(cli: &Cli, store: S, config: &EngineConfig) -> ndowe_dict::Result<()> {
    let language: Language = cli.lang.parse()?;
    let mode: SearchMode = cli.mode.parse()?;

    let mut dictionary = Dictionary::new(JsonFileLoader::new(&cli.dict_file), store, config)?;
    let outcome = dictionary.open()?;
    info!(
        "Dictionary version {} with {} entries ({:?})",
        outcome.version, outcome.entry_count, outcome.origin
    );
    let engine = dictionary.engine();

    if cli.autocomplete {
        let suggestions = engine.autocomplete(&cli.query, language)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
        } else {
            for suggestion in &suggestions {
                let marker = if suggestion.is_exact_match { "*" } else { " " };
                println!("{} {} ({})", marker, suggestion.text, suggestion.count);
            }
        }
        return Ok(());
    }

    let mut query = SearchQuery::new(cli.query.as_str())
        .language(language)
        .mode(mode)
        .include_empty(cli.include_empty);
    if let Some(limit) = cli.limit {
        query = query.limit(limit);
    }
    let results = engine.search(&query)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No results for \"{}\"", cli.query);
        return Ok(());
    }
    for result in &results {
        println!(
            "{:.3}  [{:?}]  {}  ->  {}",
            result.score, result.match_type, result.entry.source_word, result.entry.target_words_joined
        );
        for example in &result.entry.examples {
            println!("         e.g. {}", example);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .unwrap_or_else(|e| fail(format!("Failed to read config {}: {}", path.display(), e))),
        None => EngineConfig::default(),
    };

    let outcome = match &cli.cache_dir {
        Some(dir) => {
            let store = FileStore::open(dir)
                .unwrap_or_else(|e| fail(format!("Failed to open cache directory {}: {}", dir.display(), e)));
            run(&cli, store, &config)
        }
        None => run(&cli, MemoryStore::new(), &config),
    };
    if let Err(e) = outcome {
        fail(format!("Error: {}", e));
    }
}
