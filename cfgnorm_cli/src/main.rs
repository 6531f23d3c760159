//! Grammar normalizer.
//!
//! Reads a grammar file, prints it, cleans it, converts it to Chomsky Normal Form and then
//! searches leftmost derivations of the given words (or of words read from stdin).

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cfgnorm::{CfgError, CleaningOptions, SearchOptions, SearchOutcome, CFG};
use clap::Parser;
use tracing::{debug, info};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "cfgnorm")]
#[command(about = "Clean a context-free grammar, convert it to Chomsky Normal Form and test words")]
#[command(version)]
struct Args {
    /// Grammar file: variables, terminals, start symbol, then one `head body` rule per line
    grammar: PathBuf,

    /// Words to test; reads words from stdin when omitted
    words: Vec<String>,

    /// Maximum number of sentential forms expanded per word
    #[arg(long, value_name = "N", default_value_t = SearchOptions::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Maximum nullable positions in one body during epsilon elimination
    #[arg(long, value_name = "N", default_value_t = CleaningOptions::DEFAULT_MAX_NULLABLE_POSITIONS)]
    max_nullable_positions: usize,

    /// Write the normal form grammar to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

const QUIT_WORDS: [&str; 3] = ["sair", "quit", "exit"];

fn main() -> Result<()> {
    let args = Args::parse();

    setup_tracing(args.verbose);

    let cleaning = CleaningOptions::default().with_max_nullable_positions(args.max_nullable_positions);
    let search = SearchOptions::default().with_max_iterations(args.max_iterations);

    let cfg = CFG::from_file(&args.grammar)
        .with_context(|| format!("failed to load grammar from {}", args.grammar.display()))?;
    info!(
        variables = cfg.variables().len(),
        terminals = cfg.terminals().len(),
        productions = cfg.production_count(),
        "grammar loaded"
    );
    print_section("Original grammar", &cfg);

    let cleaned = cfg.cleaned(&cleaning).context("failed to clean grammar")?;
    print_section("Cleaned grammar", &cleaned);

    let normal = cleaned
        .to_normal_form()
        .context("failed to convert grammar to normal form")?;
    print_section("Chomsky Normal Form", &normal);

    if let Some(path) = &args.output {
        std::fs::write(path, normal.to_text() + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "normal form written");
    }

    if !args.words.is_empty() {
        for word in &args.words {
            test_word(&normal, word, &search);
        }
        return Ok(());
    }

    println!();
    println!("Enter a word to test ({} to stop):", QUIT_WORDS.join(", "));
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        let word = line.trim();
        if QUIT_WORDS.contains(&word.to_lowercase().as_str()) {
            break;
        }
        test_word(&normal, word, &search);
    }

    Ok(())
}

fn print_section(title: &str, cfg: &CFG) {
    println!("--- {title} ---");
    println!("{cfg}");
    println!("{}", "-".repeat(30));
}

fn test_word(cfg: &CFG, word: &str, options: &SearchOptions) {
    println!();
    println!("--- Testing: '{word}' ---");
    match cfg.search_str(word, options) {
        Ok(SearchOutcome::Found(derivation)) => {
            println!("Word found! Steps:");
            println!("{derivation}");
        }
        Ok(SearchOutcome::NotFound) => println!("Word '{word}' is not generated by the grammar."),
        Ok(SearchOutcome::BudgetExhausted { iterations }) => {
            println!("Gave up on '{word}' after {iterations} iterations; membership is undecided.")
        }
        Err(error @ CfgError::UnknownTerminal(_)) => println!("{error}"),
        Err(error) => {
            debug!(%error, "search failed");
            println!("Search failed: {error}");
        }
    }
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("cfgnorm=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
