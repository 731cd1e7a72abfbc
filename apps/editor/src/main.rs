use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use editor::backend::{Credential, HttpBackend, ResumeBackend};
use editor::commands::{self, Command, HELP};
use editor::config::Config;
use editor::errors::Notice;
use editor::pipeline::ExportArtifact;
use editor::preview::markup;
use editor::sync::FlushOutcome;
use editor::{EditorError, EditorSession, Severity};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume editor v{}", env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn ResumeBackend> =
        Arc::new(HttpBackend::new(config.api_url.clone(), config.request_timeout));
    let credential = Credential::bearer(config.api_token.clone());
    info!("Resume service at {}", config.api_url);

    let mut session = match &config.resume_id {
        Some(id) => EditorSession::open(backend, credential, id, config.session_options())
            .await
            .map_err(|e| anyhow::anyhow!("{} ({e})", e.notice().message))?,
        None => EditorSession::start(backend, credential, config.session_options()),
    };

    println!("{}", markup::to_text(session.preview()));
    println!("Type 'help' for commands.");

    let sync = Arc::clone(session.sync());
    let mut states = sync.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match commands::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("! {e}");
                        continue;
                    }
                };
                if !run(&mut session, command, &config).await {
                    break;
                }
            }
            // background saves have no caller to report to
            Some(error) = sync.failed(&mut states) => {
                if session_expired(&error) {
                    break;
                }
                show(&error.notice());
            }
        }
    }

    match session.close().await {
        FlushOutcome::Failed(e) => {
            show(&e.notice());
            warn!("Exited with unsaved changes");
        }
        FlushOutcome::Saved { id } | FlushOutcome::Stale { id, .. } => {
            println!("Saved as resume {id}")
        }
        FlushOutcome::Skipped | FlushOutcome::Coalesced => {}
    }
    Ok(())
}

/// Runs one command. Returns false when the session should end.
async fn run(session: &mut EditorSession, command: Command, config: &Config) -> bool {
    match command {
        Command::Edit(event) => match session.apply(event) {
            Ok(_) => println!("{}", markup::to_text(session.preview())),
            Err(e) => show(&e.notice()),
        },
        Command::Preview => {
            let tree = session.open_preview().await;
            println!("{}", markup::to_text(tree));
        }
        Command::Export(format) => match session.export(format).await {
            Ok(artifact) => save_artifact(&artifact, config).await,
            Err(e) if session_expired(&e) => return false,
            Err(e) => show(&e.notice()),
        },
        Command::Score(job_description) => match session.score(job_description.as_deref()).await {
            Ok(assessment) => {
                show(&Notice::new(assessment.severity, assessment.message.clone()));
                for suggestion in &assessment.report.suggestions {
                    println!("  - [{}] {}", suggestion.kind, suggestion.message);
                }
                if !assessment.report.missing_keywords.is_empty() {
                    println!(
                        "  missing keywords: {}",
                        assessment.report.missing_keywords.join(", ")
                    );
                }
            }
            Err(e) if session_expired(&e) => return false,
            Err(e) => show(&e.notice()),
        },
        Command::Status => {
            let status = session.status();
            let saved = status
                .last_saved_at
                .map(|t| t.format("%H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string());
            println!(
                "{} ({:?}), resume {}, revision {}, last saved {}",
                status.state,
                status.save_status,
                status
                    .resume_id
                    .as_ref()
                    .map_or("unsaved", |id| id.as_str()),
                status.revision,
                saved
            );
            if let Some(error) = status.last_error {
                println!("  last error: {error}");
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => return false,
    }
    true
}

async fn save_artifact(artifact: &ExportArtifact, config: &Config) {
    match artifact.save_into(&config.download_dir).await {
        Ok(path) => println!("Downloaded {} ({})", path.display(), artifact.content_type),
        Err(e) => {
            warn!("Could not write {}: {e}", artifact.file_name);
            show(&Notice::new(
                Severity::Danger,
                format!("Could not write {}.", artifact.file_name),
            ));
        }
    }
}

fn show(notice: &Notice) {
    let marker = match notice.severity {
        Severity::Info => "i",
        Severity::Success => "+",
        Severity::Warning => "~",
        Severity::Danger => "!",
    };
    println!("{marker} {}", notice.message);
}

/// Re-authentication happens outside the editor, so an expired credential
/// ends the session after telling the user.
fn session_expired(error: &EditorError) -> bool {
    if !matches!(error, EditorError::Authorization { .. }) {
        return false;
    }
    show(&error.notice());
    true
}
