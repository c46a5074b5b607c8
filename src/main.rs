use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, BufRead};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use vkdata::auth::Session;
use vkdata::config::Config;
use vkdata::host::{ConsoleHost, FileSettings, Host, SupplyRequest};
use vkdata::images::ImageStore;
use vkdata::plugin::Plugin;
use vkdata::suppliers;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), env!("VKDATA_VERSION_SUFFIX"));

#[derive(Parser)]
#[command(name = "vkdata")]
#[command(
    author,
    version = VERSION,
    about = "Feed VK avatars, names and video covers into design layers",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to VK (opens the authorize URL, paste the redirect back)
    Auth,

    /// Forget the stored session
    Logout,

    /// Show session, config and image folder state
    Status,

    /// List every data supplier
    Suppliers,

    /// Run one supplier and print what it would feed the host
    Supply {
        /// Supplier action id (see `vkdata suppliers`)
        action: String,

        /// How many layer positions to fill
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Answer for the supplier's id prompt, skipping stdin
        #[arg(long)]
        ids: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "vkdata=debug"
    } else {
        "vkdata=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Auth => run_auth(config).await,
        Commands::Logout => run_logout(),
        Commands::Status => run_status(config),
        Commands::Suppliers => run_suppliers(),
        Commands::Supply { action, count, ids } => run_supply(config, &action, count, ids).await,
    }
}

/// Wire a plugin up to the terminal stand-in host
fn console_plugin(config: Config, ids: Option<String>) -> Result<Plugin> {
    let console = Arc::new(ConsoleHost::new().with_canned_input(ids));
    let host = Host {
        settings: Arc::new(FileSettings::open()?),
        sink: console.clone(),
        shell: console,
    };
    Ok(Plugin::new(config, host))
}

async fn run_auth(config: Config) -> Result<()> {
    let plugin = console_plugin(config, None)?;
    plugin.begin_auth()?;

    println!("After granting access, paste the blank-page URL here:");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let url = Url::parse(trimmed).context("that does not look like a URL")?;
        if plugin.on_auth_navigation(&url)? {
            return Ok(());
        }
        println!(
            "{}",
            "No credentials in that URL, paste the address of the blank page".yellow()
        );
    }
    anyhow::bail!("sign-in aborted")
}

fn run_logout() -> Result<()> {
    let settings = FileSettings::open()?;
    Session::clear(&settings)?;
    println!("{}", "Signed out.".green());
    Ok(())
}

fn run_status(config: Config) -> Result<()> {
    let settings = FileSettings::open()?;

    println!("{}", "vkdata status".bold());
    println!(
        "  build:    {} ({})",
        VERSION,
        env!("VKDATA_GIT_HASH")
    );
    println!("  config:   {}", Config::config_path()?.display());
    println!("  settings: {}", settings.path().display());

    match Session::load(&settings, &config.app) {
        Some(session) => {
            println!(
                "  session:  {} (user id {})",
                "signed in".green(),
                session.user_id
            );
            println!("  scope:    {}", config.app.scope);
        }
        None => println!("  session:  {}", "signed out".red()),
    }

    let images = ImageStore::new(&config.images);
    println!("  images:   {}", images.dir().display());
    Ok(())
}

fn run_suppliers() -> Result<()> {
    for supplier in suppliers::CATALOG {
        println!(
            "{:<22} {:<13} {}",
            supplier.action.cyan(),
            supplier.kind.as_str().dimmed(),
            supplier.title
        );
    }
    Ok(())
}

async fn run_supply(config: Config, action: &str, count: usize, ids: Option<String>) -> Result<()> {
    if suppliers::find(action).is_none() {
        anyhow::bail!("unknown supplier '{action}'; run `vkdata suppliers` for the list");
    }

    let plugin = console_plugin(config, ids)?;
    if plugin.session().is_none() {
        anyhow::bail!("not signed in; run `vkdata auth` first");
    }

    let request = SupplyRequest::layers("cli", count);
    plugin.supply(action, &request).await;
    Ok(())
}
