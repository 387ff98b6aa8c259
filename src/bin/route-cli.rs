use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use script_router::config::load_config;
use script_router::WebApp;

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Inspect the routes and filters a config file declares", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config file
    Check,
    /// List registered routes in resolution order
    Routes,
    /// Show which route a request would reach
    Resolve {
        /// Request method, e.g. GET
        method: String,
        /// Request path, e.g. /users/42
        path: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let app = WebApp::from_config(&config)?;

    let output = match cli.command {
        Commands::Check => json!({
            "valid": true,
            "routes": app.routes().len(),
            "filters": app.filters().len(),
        }),
        Commands::Routes => Value::Array(
            app.routes()
                .snapshot()
                .iter()
                .map(|route| {
                    json!({
                        "label": route.label(),
                        "pattern": route.template().pattern(),
                        "methods": route.methods().iter().collect::<Vec<_>>(),
                        "variables": route.template().variables().collect::<Vec<_>>(),
                    })
                })
                .collect(),
        ),
        Commands::Resolve { method, path } => resolve(&app, &method, &path),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolve(app: &WebApp, method: &str, path: &str) -> Value {
    let route = app.resolve(method, path);
    let outcome = app.dispatch(method, path);

    json!({
        "method": method.to_uppercase(),
        "path": path,
        "route": route.as_ref().map(|r| r.label().to_string()),
        "params": route.as_ref().map(|r| r.path_params(path)).unwrap_or_default(),
        "outcome": outcome.state().as_str(),
        "status": outcome.status().map(|s| s.code()),
    })
}
