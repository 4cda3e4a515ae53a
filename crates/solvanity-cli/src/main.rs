//! SolVanity CLI
//!
//! Solana vanity address generator.

mod config;
mod wallet;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use solvanity_core::{
    estimate, estimate_time_50pct, expected_attempts, format_difficulty, format_duration, CancellationToken, GeneratedKeypair,
    LogProgress, PrefixError, SearchHandle, SearchOutcome, SolanaKeypairGenerator, VanitySearch,
};

use crate::config::Settings;
use crate::wallet::{write_wallet_files, WalletInfo};

#[derive(Parser)]
#[command(name = "solvanity")]
#[command(author = "SolVanity Team")]
#[command(version = "0.1.0")]
#[command(about = "Solana vanity address generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a keypair whose address starts with PREFIX
    Generate {
        /// Base58 prefix to search for (case-sensitive)
        prefix: String,

        /// Uppercase the prefix before validating and searching
        #[arg(short = 'u', long)]
        uppercase: bool,

        /// Stop after this many seconds (0 = no deadline)
        #[arg(long, default_value = "0")]
        max_time: u64,

        /// Directory to write the keypair and wallet files into
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: Settings,
    },

    /// Validate a prefix and show how long a search would take
    Estimate {
        prefix: String,

        #[command(flatten)]
        settings: Settings,
    },

    /// Measure keypair generation speed
    Benchmark {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,

        #[command(flatten)]
        settings: Settings,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prefix,
            uppercase,
            max_time,
            out,
            json,
            settings,
        } => cmd_generate(&prefix, uppercase, max_time, out.as_deref(), json, &settings),
        Commands::Estimate { prefix, settings } => cmd_estimate(&prefix, &settings),
        Commands::Benchmark { duration, settings } => cmd_benchmark(duration, &settings),
    }
}

/// Apply the optional uppercase normalisation and validate the result
fn prepare_prefix(raw: &str, uppercase: bool, settings: &Settings) -> Result<String> {
    let prefix = if uppercase { raw.to_uppercase() } else { raw.to_string() };

    if let Err(e) = settings.validator().validate(&prefix) {
        match e {
            PrefixError::InvalidCharacters(_) => bail!(
                "{}\nUse only base58 characters (1-9, A-Z, a-z) and avoid 0, O, I, l",
                e
            ),
            _ => bail!("{}", e),
        }
    }

    Ok(prefix)
}

/// Cancel `token` once `seconds` have passed. Zero means no deadline.
fn spawn_deadline(token: &CancellationToken, seconds: u64) {
    if seconds == 0 {
        return;
    }
    let token = token.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(seconds));
        token.cancel();
    });
}

fn cmd_generate(
    raw_prefix: &str,
    uppercase: bool,
    max_time: u64,
    out: Option<&Path>,
    json_output: bool,
    settings: &Settings,
) -> Result<()> {
    let prefix = prepare_prefix(raw_prefix, uppercase, settings)?;
    let difficulty = expected_attempts(prefix.chars().count());

    if !json_output {
        eprintln!("SolVanity v0.1.0");
        eprintln!("Network:        {}", settings.network);
        eprintln!("Prefix:         {}", prefix);
        eprintln!("Estimated time: {}", estimate(&prefix));
        eprintln!("Difficulty:     {}", format_difficulty(difficulty));
        eprintln!("Max attempts:   {}", settings.max_attempts);
        eprintln!("Threads:        {}", settings.thread_count());
        eprintln!();
    }

    let token = CancellationToken::new();
    spawn_deadline(&token, max_time);

    let handle = SearchHandle::new(prefix.clone(), token);
    let mut search = VanitySearch::new(SolanaKeypairGenerator).with_config(settings.search_config());

    // Live stats line for terminals, log lines otherwise
    let printer = if json_output {
        search = search.with_progress(LogProgress::new(prefix.clone()));
        None
    } else {
        let stats = handle.clone();
        Some(thread::spawn(move || {
            while stats.is_running() {
                eprint!("\r{}", stats.format(difficulty));
                thread::sleep(Duration::from_millis(250));
            }
            eprintln!();
        }))
    };

    let result = search.run(&handle, settings.max_attempts);
    if let Some(printer) = printer {
        let _ = printer.join();
    }
    let outcome = result?;

    let summary = outcome.summary(&prefix);
    let written = match (outcome.keypair(), out) {
        (Some(keypair), Some(dir)) => {
            let wallet = WalletInfo::new(keypair, &summary, &settings.network);
            Some(write_wallet_files(dir, &wallet, keypair)?)
        }
        _ => None,
    };

    if json_output {
        let wallet = outcome
            .keypair()
            .map(|keypair| WalletInfo::new(keypair, &summary, &settings.network));
        let files = written
            .as_ref()
            .map(|(keypair_path, wallet_path)| vec![keypair_path.display().to_string(), wallet_path.display().to_string()]);
        let doc = json!({
            "result": summary,
            "message": outcome.kind().user_message(),
            "wallet": wallet,
            "files": files,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    match &outcome {
        SearchOutcome::Found { keypair, .. } => {
            print_found(keypair, &outcome, &settings.network);
            if let Some((keypair_path, wallet_path)) = &written {
                println!("Keypair file: {}", keypair_path.display());
                println!("Wallet file:  {}", wallet_path.display());
            }
        }
        SearchOutcome::Exhausted { attempts, elapsed } | SearchOutcome::Cancelled { attempts, elapsed } => {
            eprintln!(
                "{} ({} attempts in {:.2}s).",
                outcome.kind().user_message(),
                attempts,
                elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}

fn cmd_estimate(raw_prefix: &str, settings: &Settings) -> Result<()> {
    let prefix = prepare_prefix(raw_prefix, false, settings)?;
    let difficulty = expected_attempts(prefix.chars().count());

    println!("Prefix:            {}", prefix);
    println!("Estimated time:    {}", estimate(&prefix));
    println!("Expected attempts: {} (58^{})", format_difficulty(difficulty), prefix.chars().count());
    if difficulty > settings.max_attempts as f64 {
        println!(
            "Warning: the attempt limit ({}) is below the expected number of attempts",
            settings.max_attempts
        );
    }

    Ok(())
}

fn cmd_benchmark(duration_secs: u64, settings: &Settings) -> Result<()> {
    eprintln!("Benchmarking Solana keypair generation for {} seconds...", duration_secs);
    eprintln!("Threads: {}", settings.thread_count());
    eprintln!();

    let token = CancellationToken::new();
    spawn_deadline(&token, duration_secs.max(1));

    // '0' is outside the base58 alphabet, so no address can match
    let search = VanitySearch::new(SolanaKeypairGenerator).with_config(settings.search_config());
    let outcome = search.search("0", u64::MAX, &token)?;

    let rate = outcome.keys_per_second();
    println!("Keys Tested: {}", outcome.attempts());
    println!("Time:        {:.2}s", outcome.elapsed().as_secs_f64());
    println!("Speed:       {:.0} keys/s", rate);
    for len in 3..=6 {
        let expected = expected_attempts(len);
        println!(
            "  {}-char prefix: 50% chance in {}",
            len,
            format_duration(estimate_time_50pct(expected, rate))
        );
    }

    Ok(())
}

fn print_found(keypair: &GeneratedKeypair, outcome: &SearchOutcome, network: &str) {
    println!();
    println!("MATCH FOUND!");
    println!("{:-<60}", "");
    println!("Address:     {}", keypair.address());
    println!("Private Key: {}", keypair.secret_base58());
    println!("Public Hex:  {}", keypair.public_key_hex());
    println!("Network:     {}", network);
    println!("{:-<60}", "");
    println!("Attempts:    {}", outcome.attempts());
    println!("Time:        {:.2}s", outcome.elapsed().as_secs_f64());
    println!("Rate:        {:.0} attempts/s", outcome.keys_per_second());
    println!("{:-<60}", "");
    println!("Keep the private key offline and never share it.");
}
