use std::path::PathBuf;

use clap::{Parser, Subcommand};

use domain_router::config::load_config;
use domain_router::lifecycle::build_handlers;
use domain_router::routing::config::build_registry;
use domain_router::routing::inspect::{describe, list_routes};
use domain_router::routing::Dispatcher;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect the route table of a domain-router config", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List effective routes and defaults in match order
    Routes,
    /// Show what a request would resolve to, without invoking anything
    Match {
        #[arg(short, long, default_value = "GET")]
        method: String,

        #[arg(long)]
        host: String,

        #[arg(short, long)]
        path: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let table = build_registry(&config)?.freeze();
    let dispatcher = Dispatcher::new(table, build_handlers(&config));

    let output = match cli.command {
        Commands::Routes => list_routes(&dispatcher),
        Commands::Match { method, host, path } => {
            describe(&dispatcher, dispatcher.resolve(&method, &path, &host))
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
