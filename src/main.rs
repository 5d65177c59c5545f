//! firmograph CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use firmograph::{
    commands::{
        cmd_discover, cmd_enrich, cmd_import, cmd_init, cmd_list_companies, cmd_locate,
        cmd_resolve, cmd_status, print_companies, print_discover_report, print_enrich_stats,
        print_status, EnrichOptions, Toolkit,
    },
    config::Config,
    discovery::{DuckDuckGoSearch, HomepageCrawler, SearchLinkCollector},
    error::{Error, Result},
    ledger::LedgerDb,
    oracle::GeminiOracle,
    progress::LogWriterFactory,
    session::Session,
};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "firmograph")]
#[command(version, about = "Enrich a company list with firmographic data from its websites", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize firmograph configuration and ledger
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Add companies from a text file (`name` or `name,website` per line)
    Import {
        /// Path to the company list
        file: PathBuf,
    },

    /// Find websites for companies that have none
    Resolve {
        /// Search again for every company
        #[arg(long)]
        force: bool,
    },

    /// Probe and cache company sitemaps
    Locate {
        /// Probe companies whose sitemap state is already known
        #[arg(long)]
        force: bool,
    },

    /// Discover pages, scrape them and fill the profile columns
    Enrich {
        /// Only enrich these company IDs (repeatable)
        #[arg(long = "id")]
        ids: Vec<i64>,

        /// Maximum number of companies to enrich
        #[arg(short, long)]
        limit: Option<usize>,

        /// Ignore cached sitemap state and probe again
        #[arg(long)]
        relocate: bool,
    },

    /// Run page discovery for a single website and show the selection
    Discover {
        /// Company website or domain
        website: String,

        /// Company name used in search queries (defaults to the domain)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List companies in the ledger
    Companies,

    /// Show ledger status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    // Handle init command specially (doesn't need existing config)
    if matches!(cli.command, Commands::Init { .. }) {
        return handle_init(cli).await;
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "firmograph", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    // Discover works without a ledger
    if let Commands::Discover { website, name } = &cli.command {
        let session = Session::open(&config.http)?;
        let oracle = GeminiOracle::new(&config.oracle, config.oracle_api_key()?)?;
        let crawler = HomepageCrawler::new(&session, config.http.page_timeout());
        let search = DuckDuckGoSearch::new(&session, &config.search);
        let toolkit = toolkit(&config, &session, &oracle, &crawler, &search);

        let report = cmd_discover(&config, toolkit, website, name.as_deref()).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_discover_report(&report);
        }
        return Ok(());
    }

    if !config.is_initialized() {
        return Err(Error::NotInitialized);
    }
    let db = LedgerDb::connect(&config).await?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } | Commands::Discover { .. } => {
            unreachable!()
        }

        Commands::Import { file } => {
            let stats = cmd_import(&db, &file).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("✓ Imported {} companies", stats.imported);
                if stats.skipped > 0 {
                    println!("  Skipped {} lines without a name", stats.skipped);
                }
            }
        }

        Commands::Resolve { force } => {
            let session = Session::open(&config.http)?;
            let search = DuckDuckGoSearch::new(&session, &config.search);
            let stats = cmd_resolve(&db, &search, force).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("\n✓ Website resolution complete");
                println!("  Resolved: {}", stats.resolved);
                println!("  Unresolved: {}", stats.unresolved);
            }
        }

        Commands::Locate { force } => {
            let session = Session::open(&config.http)?;
            let stats = cmd_locate(&config, &db, &session, force).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("\n✓ Sitemap probing complete");
                println!("  Found: {}", stats.found);
                println!("  Absent: {}", stats.absent);
                println!("  Skipped: {}", stats.skipped);
            }
        }

        Commands::Enrich {
            ids,
            limit,
            relocate,
        } => {
            let session = Session::open(&config.http)?;
            let oracle = GeminiOracle::new(&config.oracle, config.oracle_api_key()?)?;
            let crawler = HomepageCrawler::new(&session, config.http.page_timeout());
            let search = DuckDuckGoSearch::new(&session, &config.search);
            let toolkit = toolkit(&config, &session, &oracle, &crawler, &search);

            let options = EnrichOptions {
                ids,
                limit,
                relocate,
            };
            let stats = cmd_enrich(&config, &db, toolkit, options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_enrich_stats(&stats);
            }
        }

        Commands::Companies => {
            let companies = cmd_list_companies(&db).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&companies)?);
            } else {
                print_companies(&companies);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &db).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

fn toolkit<'a>(
    config: &Config,
    session: &'a Session,
    oracle: &'a GeminiOracle,
    crawler: &'a HomepageCrawler<'a>,
    search: &'a DuckDuckGoSearch<'a>,
) -> Toolkit<'a> {
    let search: Option<&'a dyn SearchLinkCollector> = if config.search.enabled {
        Some(search)
    } else {
        None
    };
    Toolkit {
        fetcher: session,
        oracle,
        crawler,
        search,
    }
}

async fn handle_init(cli: Cli) -> Result<()> {
    let Commands::Init { force } = cli.command else {
        unreachable!()
    };

    // A .toml path names the config file; anything else names its directory
    let base_dir = match cli.config {
        Some(path) if path.extension().is_some_and(|e| e == "toml") => path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir),
        Some(path) => path,
        None => Config::default_base_dir(),
    };

    let report = match cmd_init(Some(base_dir), force).await {
        Ok(report) => report,
        Err(Error::AlreadyInitialized(path)) => {
            eprintln!(
                "Config file already exists at: {}\nUse --force to overwrite.",
                path
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ firmograph initialized successfully");
    println!("  Config: {}", report.config_path.display());
    println!("  Ledger: {}", report.db_path.display());
    println!("\nNext steps:");
    println!("  1. Export your Gemini API key (see oracle.api_key_env in the config)");
    println!("  2. Import companies: firmograph import companies.txt");
    println!("  3. Enrich them: firmograph enrich");

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    if !config_path.exists() {
        eprintln!(
            "Config file not found: {}\nRun 'firmograph init' first.",
            config_path.display()
        );
        std::process::exit(1);
    }

    Config::load(&config_path)
}
