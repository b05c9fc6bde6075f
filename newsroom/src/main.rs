use std::process::ExitCode;

use newsroom::config::{ModelRegistry, OracleFailurePolicy, PipelineConfig};
use newsroom::driver::WorkflowDriver;

/// Search the current directory and its ancestors for a `.env` file so the
/// binary picks up provider keys no matter which workspace directory it runs
/// from.
fn load_env_file() {
    let Ok(cwd) = std::env::current_dir() else {
        tracing::warn!("Could not determine current directory for .env lookup");
        return;
    };

    for dir in cwd.ancestors() {
        let candidate = dir.join(".env");
        if !candidate.exists() {
            continue;
        }
        match dotenvy::from_path(&candidate) {
            Ok(()) => {
                tracing::info!(path = %candidate.display(), "Loaded environment from .env");
            }
            Err(e) => {
                tracing::warn!(path = %candidate.display(), error = %e, "Failed to load .env file");
            }
        }
        return;
    }

    tracing::info!("No .env file found; using process environment only");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    // Provider keys must be in the environment before any client is built.
    load_env_file();

    let task = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if task.trim().is_empty() {
        eprintln!("usage: newsroom <task>");
        return ExitCode::FAILURE;
    }

    let registry = ModelRegistry::new();
    let profile = match registry.resolve(None) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "No usable model profile");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(model = %profile.id, "Resolved model profile");

    let config = PipelineConfig {
        oracle_failure: OracleFailurePolicy::from_env(),
        ..PipelineConfig::default()
    };
    let max_steps = config.max_steps;

    let driver = match WorkflowDriver::from_profile(profile, &config) {
        Ok(driver) => driver,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build pipeline");
            return ExitCode::FAILURE;
        }
    };

    let cancel = driver.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl-C received; cancelling run");
            cancel.cancel();
        }
    });

    let outcome = driver.submit(task, max_steps).await;

    for message in &outcome.messages {
        println!("[{}] {}", message.author, message.content);
    }

    match outcome.final_report {
        Some(report) => {
            println!("\n{report}");
            ExitCode::SUCCESS
        }
        None => {
            tracing::warn!(
                reason = %outcome.termination_reason,
                error = outcome.error.as_deref().unwrap_or("none"),
                "Run ended without a report"
            );
            ExitCode::FAILURE
        }
    }
}
