use clap::Parser;
use courier_manager::application::engine::DispatchEngine;
use courier_manager::infrastructure::in_memory::{InMemoryCourierStore, InMemoryOrderStore};
use courier_manager::interfaces::json::script::{self, ScriptReader};
use courier_manager::logging;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::fs::File;
use std::path::PathBuf;
use tracing::warn;

/// Runs a JSON-lines command script against an in-memory dispatch engine,
/// printing one JSON result per command.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command script (one JSON command object per line)
    script: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let engine = DispatchEngine::new(
        Box::new(InMemoryCourierStore::new()),
        Box::new(InMemoryOrderStore::new()),
    );

    let file = File::open(cli.script).into_diagnostic()?;
    let reader = ScriptReader::new(file);
    for command in reader.commands() {
        let result = match command {
            Ok(command) => match command.validate() {
                Ok(checked) => script::execute(&engine, checked).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        // Failed commands become error objects, mirroring the original
        // service's per-request 400 responses; the run continues.
        let line = match result {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "command failed");
                json!({ "error": e.to_string() }).to_string()
            }
        };
        println!("{line}");
    }

    Ok(())
}
