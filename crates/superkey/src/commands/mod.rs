pub mod forge;
pub mod teardown;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use superkey_core::SuperKeyError;

/// Read a JSON document from a file, or stdin for "-"
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a value as pretty JSON to a file, or stdout when no file is given
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Ledger written to {}", path.display().to_string().cyan());
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn report_teardown_errors(errors: &[SuperKeyError]) {
    for error in errors {
        eprintln!("  {} {}", "✗".red(), error);
    }
}
