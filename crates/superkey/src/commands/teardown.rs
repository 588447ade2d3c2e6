use super::{read_json, report_teardown_errors, write_json};
use anyhow::Context;
use colored::Colorize;
use std::path::Path;
use superkey_core::{ForgedApplication, ProviderRegistry};

pub async fn handle(
    registry: &ProviderRegistry,
    ledger_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut application: ForgedApplication = read_json(ledger_path)?;

    if application.steps_completed.is_empty() {
        eprintln!("{}", "Nothing to tear down".dimmed());
        return Ok(());
    }

    let provider = registry.for_request(&application.request)?;

    eprintln!(
        "{}",
        format!(
            "Tearing down {} resources of '{}' (guid {})",
            application.steps_completed.len(),
            application.request.application_type,
            application.guid
        )
        .yellow()
    );

    let errors = provider.tear_down(&mut application).await;
    if errors.is_empty() {
        eprintln!("{}", "✓ Teardown complete".green().bold());
        return Ok(());
    }

    report_teardown_errors(&errors);
    // The remaining ledger can be fed back into teardown to retry
    write_json(&application, output).with_context(|| {
        format!(
            "Teardown finished with {} error(s) and the remaining ledger (guid {}) was not written",
            errors.len(),
            application.guid
        )
    })?;
    anyhow::bail!("Teardown finished with {} error(s)", errors.len())
}
