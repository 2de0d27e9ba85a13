//! Site-Audit main entry point
//!
//! This is the command-line interface for the Site-Audit page auditor.

use clap::{Parser, Subcommand};
use site_audit::config::{load_config_with_hash, Config};
use site_audit::output::{format_audit_report, format_history, load_statistics, print_statistics, write_report};
use site_audit::service::AuditService;
use site_audit::storage::{AuditRecord, SqliteStorage};
use site_audit::suggest::{LegacySuggestions, SuggestionSet};
use site_audit::AuditStatus;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Site-Audit: single-page SEO, performance and security auditor
///
/// Site-Audit fetches one page, checks a sample of its links, scores it
/// out of 100 in three categories, stores the result, and produces
/// remediation suggestions.
#[derive(Parser, Debug)]
#[command(name = "site-audit")]
#[command(version = "1.0.0")]
#[command(about = "Single-page SEO, performance and security auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit a URL and wait for the result
    Audit {
        /// Page to audit; `https://` is assumed when no scheme is given
        url: String,
    },

    /// Show the status of an audit
    Status { id: i64 },

    /// Print the markdown report of an audit
    Show { id: i64 },

    /// Show remediation suggestions for a completed audit
    Suggest {
        id: i64,

        /// Discard any attached suggestions and generate a new set
        #[arg(long, conflicts_with = "simple")]
        regenerate: bool,

        /// Print the five flat suggestion lists instead of categories
        #[arg(long)]
        simple: bool,
    },

    /// Write the markdown report of an audit to the report directory
    Report { id: i64 },

    /// List recent audits
    History {
        /// Maximum number of audits to list
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show statistics from the database
    Stats,

    /// Validate the configuration and print the effective settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;

    if let Command::CheckConfig = cli.command {
        handle_check_config(&config);
        return Ok(());
    }

    let service = AuditService::from_config(&config)?;

    match cli.command {
        Command::Audit { url } => handle_audit(&service, &url).await?,
        Command::Status { id } => handle_status(&service, id)?,
        Command::Show { id } => print!("{}", format_audit_report(&service.get(id)?)?),
        Command::Suggest {
            id,
            regenerate,
            simple,
        } => handle_suggest(&service, id, regenerate, simple).await?,
        Command::Report { id } => {
            let path = write_report(Path::new(&config.output.report_dir), &service.get(id)?)?;
            println!("Report written to {}", path.display());
        }
        Command::History { limit } => print!("{}", format_history(&service.history(limit)?)),
        Command::Stats => {
            println!("Database: {}\n", config.output.database_path);
            let stats = service.with_store(|store| load_statistics(store))?;
            print_statistics(&stats);
        }
        Command::CheckConfig => {}
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_audit=info,warn"),
            1 => EnvFilter::new("site_audit=debug,info"),
            2 => EnvFilter::new("site_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Validates config and prints the effective settings
fn handle_check_config(config: &Config) {
    println!("=== Site-Audit Configuration ===\n");

    println!("Fetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Page timeout: {}s", config.fetcher.page_timeout_secs);
    println!("  Probe timeout: {}s", config.fetcher.probe_timeout_secs);
    println!("  Max redirects: {}", config.fetcher.max_redirects);

    println!("\nLinks:");
    println!("  Sample size: {}", config.links.sample_size);
    println!("  Max concurrent checks: {}", config.links.max_concurrent_checks);

    println!("\nSuggestions:");
    println!("  Endpoint: {}", config.suggestions.endpoint);
    println!("  Model: {}", config.suggestions.model);
    println!(
        "  API key ({}): {}",
        config.suggestions.api_key_env,
        if config.suggestions.api_key().is_some() {
            "set"
        } else {
            "not set, built-in rules will be used"
        }
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report directory: {}", config.output.report_dir);

    println!("\n✓ Configuration is valid");
}

async fn handle_audit(service: &AuditService<SqliteStorage>, url: &str) -> CliResult {
    let dispatched = service.submit(url).await?;
    println!("Audit {} started for {}", dispatched.audit_id, url);

    if let Err(e) = dispatched.task.await {
        tracing::error!("Audit task for {} did not finish: {}", url, e);
    }

    let record = service.get(dispatched.audit_id)?;
    print_summary(&record);
    Ok(())
}

fn print_summary(record: &AuditRecord) {
    println!();
    match record.status {
        AuditStatus::Completed => {
            println!("=== Audit {} completed ===\n", record.id);
            println!("URL: {}", record.url);
            if let Some(title) = &record.title {
                println!("Title: {}", title);
            }
            println!("SEO: {}/100", record.score_seo);
            println!("Performance: {}/100", record.score_performance);
            println!("Security: {}/100", record.score_security);
            println!("Broken links (sampled): {}", record.broken_links);
            println!(
                "\nRun `site-audit show {}` for the full report or `site-audit suggest {}` for suggestions.",
                record.id, record.id
            );
        }
        AuditStatus::Failed => {
            println!("=== Audit {} failed ===\n", record.id);
            println!("URL: {}", record.url);
            println!("Error: {}", record.error_message().unwrap_or("Unknown error"));
        }
        status => println!("Audit {} is {}", record.id, status),
    }
}

fn handle_status(service: &AuditService<SqliteStorage>, id: i64) -> CliResult {
    let view = service.status(id)?;
    println!("Audit {}: {}", view.id, view.status);
    if view.status == AuditStatus::Failed {
        if let Some(message) = service.get(id)?.error_message() {
            println!("Error: {}", message);
        }
    }
    Ok(())
}

async fn handle_suggest(
    service: &AuditService<SqliteStorage>,
    id: i64,
    regenerate: bool,
    simple: bool,
) -> CliResult {
    if simple {
        print_legacy(&service.simple_suggestions(id).await?);
        return Ok(());
    }

    let set = if regenerate {
        service.regenerate_suggestions(id).await?
    } else {
        service.suggestions(id).await?
    };
    print_suggestions(&set);
    Ok(())
}

fn print_suggestions(set: &SuggestionSet) {
    for (category, entries) in set.iter() {
        println!("{}:", category.title());
        for entry in entries {
            println!("  - {}", entry.issue);
            println!("    {}", entry.suggestion);
        }
        println!();
    }
}

fn print_legacy(legacy: &LegacySuggestions) {
    let lists = [
        ("SEO fixes", &legacy.seo_fixes),
        ("Performance fixes", &legacy.performance_fixes),
        ("Security fixes", &legacy.security_fixes),
        ("Metadata fixes", &legacy.metadata_fixes),
        ("General recommendations", &legacy.general_recommendations),
    ];
    for (heading, items) in lists {
        println!("{}:", heading);
        for item in items {
            println!("  - {}", item);
        }
        println!();
    }
}
