use super::{read_json, report_teardown_errors, write_json};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use superkey_core::{CreateRequest, ProviderRegistry};
use tracing::error;

/// Forge a request. On failure the partial ledger is rolled back unless
/// `rollback` is false; whatever is still recorded afterwards is written out
/// so it can be torn down later.
pub async fn handle(
    registry: &ProviderRegistry,
    request_path: &Path,
    output: Option<&Path>,
    rollback: bool,
) -> anyhow::Result<()> {
    let request: CreateRequest = read_json(request_path)?;

    let provider = registry.for_request(&request)?;

    eprintln!(
        "{}",
        format!(
            "Forging '{}' with provider '{}' ({} steps)",
            request.application_type,
            provider.name(),
            request.steps.len()
        )
        .cyan()
    );

    let failure = match provider.forge_application(Arc::new(request)).await {
        Ok(application) => {
            eprintln!(
                "{}",
                format!(
                    "✓ Forged {} resources (guid {})",
                    application.steps_completed.len(),
                    application.guid
                )
                .green()
                .bold()
            );
            return write_json(&application, output);
        }
        Err(failure) => failure,
    };

    let (mut application, error) = failure.into_parts();
    eprintln!("{}", format!("✗ {}", error).red().bold());

    if rollback && !application.steps_completed.is_empty() {
        eprintln!(
            "{}",
            format!(
                "Rolling back {} created resources...",
                application.steps_completed.len()
            )
            .yellow()
        );
        let errors = provider.tear_down(&mut application).await;
        if errors.is_empty() {
            eprintln!("{}", "✓ Rollback complete".green());
        } else {
            eprintln!(
                "{}",
                format!("Rollback finished with {} error(s):", errors.len()).yellow()
            );
            report_teardown_errors(&errors);
        }
    }

    // Whatever is still recorded has to be torn down later
    if !application.steps_completed.is_empty() {
        if let Err(write_error) = write_json(&application, output) {
            error!(
                guid = %application.guid,
                error = %error,
                remaining = application.steps_completed.len(),
                "Forge failed and the remaining ledger could not be written"
            );
            return Err(write_error.context(format!(
                "Forge failed ({}) and the ledger of {} remaining resources (guid {}) was not written",
                error,
                application.steps_completed.len(),
                application.guid
            )));
        }
    }

    Err(error.into())
}
