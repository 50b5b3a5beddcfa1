//! CLI entry point for `sqlsift`.

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sqlsift::analyzer::{Analyzer, CallRegistry};
use sqlsift::ast::discover::discover;
use sqlsift::ast::go_loader::parse_source;
use sqlsift::report::Finding;

#[derive(Parser)]
#[command(
    name = "sqlsift",
    about = "Scan Go sources for SQL-injection-prone query construction and SELECT * usage"
)]
struct Cli {
    /// Root directory to scan; append `...` to recurse into subdirectories
    #[arg(long)]
    dir: String,

    /// Emit findings as a JSON array instead of one line per finding
    #[arg(long)]
    json: bool,

    /// Print verbose diagnostics to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "sqlsift=debug"
    } else {
        "sqlsift=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = CallRegistry::default();
    let files = discover(&cli.dir)?;
    info!("scanning {} Go files under {}", files.len(), cli.dir);

    let mut findings: Vec<Finding> = Vec::new();
    for path in &files {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                continue;
            }
        };
        let root = match parse_source(&source, path) {
            Ok(root) => root,
            Err(err) => {
                warn!("skipping {err}");
                continue;
            }
        };
        findings.extend(Analyzer::new(&registry).analyze(&root));
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        for finding in &findings {
            println!("{finding}");
        }
    }

    // Findings are diagnostics, not failures.
    Ok(())
}
