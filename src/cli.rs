//! Command-line front end standing in for the wizard pages.
//!
//! Every invocation rehydrates the final step from disk first, so commands
//! can be run one at a time the way a user would revisit the page.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use clap::{ArgAction, Parser, Subcommand};

use ca_app::usecases::{FieldKey, FinalStepSnapshot};
use ca_core::attachment::{AttachmentFile, AttachmentSlot, MimeType};
use ca_core::config::AppConfig;
use ca_core::declaration::Declaration;
use ca_core::fragment::FragmentKey;
use ca_core::ports::SubmissionEventPort;
use ca_core::submission::MAX_SUBMISSION_ATTEMPTS;
use ca_core::{CaptchaProof, SubmissionId, SubmissionState};

use crate::bootstrap::WiredApp;

const MAX_RETRY_MESSAGE: &str = "Maximum retry attempts reached. Please try again later.";

#[derive(Parser)]
#[command(name = "company-apply")]
#[command(about = "Company application wizard: final step and submission", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $COMPANY_APPLY_CONFIG, then <data dir>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the output of an earlier wizard step
    Fragment {
        #[command(subcommand)]
        action: FragmentCommand,
    },
    /// Upload a document into a slot
    Attach {
        /// propertyLawCertificate | registerCertificate | financialStatement
        slot: AttachmentSlot,
        file: PathBuf,
        /// Override the MIME type guessed from the extension
        #[arg(long)]
        mime: Option<String>,
    },
    /// Remove the document held in a slot
    Remove { slot: AttachmentSlot },
    /// Accept or withdraw a declaration
    Declare {
        /// dataIsReal | permitContact | privacyAcceptance
        name: Declaration,
        #[arg(action = ArgAction::Set)]
        accepted: bool,
    },
    /// Show stored documents, declarations and what still blocks submission
    Status,
    /// Confirm and send the application
    Submit {
        /// Token issued by the solved CAPTCHA challenge
        #[arg(long)]
        captcha_token: String,
        /// Keep retrying until success or the attempt budget is spent
        #[arg(long)]
        retry_until_exhausted: bool,
    },
    /// Abandon the application and clear everything stored locally
    Discard,
}

#[derive(Subcommand)]
pub enum FragmentCommand {
    /// Record one step from a JSON file
    Put {
        /// companyData | digitalAndFinancial | digitalReadiness | propertyLaw
        step: FragmentKey,
        json_file: PathBuf,
    },
}

/// Prints submission state changes as they are published.
pub struct CliSubmissionEvents;

#[async_trait]
impl SubmissionEventPort for CliSubmissionEvents {
    async fn emit_state_changed(&self, state: &SubmissionState, submission_id: Option<&SubmissionId>) {
        let id = submission_id.map(|id| id.to_string()).unwrap_or_default();
        match state {
            SubmissionState::Idle => {}
            SubmissionState::ConfirmPending => println!("[{id}] ready to confirm"),
            SubmissionState::Submitting { attempts } => println!(
                "[{id}] submitting (attempt {}/{MAX_SUBMISSION_ATTEMPTS})",
                attempts + 1
            ),
            SubmissionState::Failed { attempts, failure } => {
                println!("[{id}] {}", failure.user_message());
                if state.can_retry() {
                    println!("[{id}] Retry ({}/{MAX_SUBMISSION_ATTEMPTS})", attempts + 1);
                }
            }
            SubmissionState::Abandoned { failure, .. } => {
                println!("[{id}] {}", failure.user_message());
                println!("[{id}] {MAX_RETRY_MESSAGE}");
            }
            SubmissionState::Success => println!("[{id}] application submitted"),
        }
    }
}

pub async fn run(command: Commands, wired: &WiredApp, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Fragment {
            action: FragmentCommand::Put { step, json_file },
        } => put_fragment(wired, step, &json_file).await,
        Commands::Attach { slot, file, mime } => attach(wired, slot, &file, mime).await,
        Commands::Remove { slot } => remove(wired, slot).await,
        Commands::Declare { name, accepted } => declare(wired, name, accepted).await,
        Commands::Status => {
            let snapshot = wired.app.final_step.rehydrate().await;
            print_status(wired, &snapshot);
            Ok(())
        }
        Commands::Submit {
            captcha_token,
            retry_until_exhausted,
        } => submit(wired, config, captcha_token, retry_until_exhausted).await,
        Commands::Discard => discard(wired).await,
    }
}

async fn put_fragment(wired: &WiredApp, step: FragmentKey, json_file: &Path) -> Result<()> {
    let raw = tokio::fs::read_to_string(json_file)
        .await
        .with_context(|| format!("Failed to read {}", json_file.display()))?;
    wired.app.record_fragment.execute_raw(step, &raw).await?;
    println!("{step} recorded");
    Ok(())
}

async fn attach(
    wired: &WiredApp,
    slot: AttachmentSlot,
    path: &Path,
    mime: Option<String>,
) -> Result<()> {
    let form = &wired.app.final_step;
    form.rehydrate().await;

    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    let mime = mime.map(MimeType).unwrap_or_else(|| guess_mime(path));

    match form.attach(slot, AttachmentFile::new(name, mime, data)).await {
        Ok(meta) => {
            println!("{slot}: {} ({}, {} bytes)", meta.name, meta.mime, meta.size);
            Ok(())
        }
        Err(err) => {
            tracing::debug!(error = %err, "attach failed");
            Err(field_error(form.snapshot().await, FieldKey::Slot(slot)))
        }
    }
}

async fn remove(wired: &WiredApp, slot: AttachmentSlot) -> Result<()> {
    let form = &wired.app.final_step;
    form.rehydrate().await;
    if form.remove(slot).await.is_err() {
        return Err(field_error(form.snapshot().await, FieldKey::Slot(slot)));
    }
    println!("{slot}: removed");
    Ok(())
}

async fn declare(wired: &WiredApp, declaration: Declaration, accepted: bool) -> Result<()> {
    let form = &wired.app.final_step;
    form.rehydrate().await;
    form.set_declaration(declaration, accepted).await;

    let snapshot = form.snapshot().await;
    let key = FieldKey::Declaration(declaration);
    if snapshot.field_errors.contains_key(&key) {
        return Err(field_error(snapshot, key));
    }
    println!("{declaration}: {accepted}");
    Ok(())
}

async fn submit(
    wired: &WiredApp,
    config: &AppConfig,
    captcha_token: String,
    retry_until_exhausted: bool,
) -> Result<()> {
    if config.api_base_url.is_empty() {
        bail!("Submission endpoint is not configured; set [api] base_url");
    }

    let form = &wired.app.final_step;
    let submission = &wired.app.submission;
    form.rehydrate().await;
    wired.captcha.set_proof(CaptchaProof::new(captcha_token)).await;

    let state = submission.request_submit().await?;
    if state != SubmissionState::ConfirmPending {
        let snapshot = form.snapshot().await;
        print_field_errors(&snapshot);
        bail!("application is incomplete");
    }

    let mut state = submission.confirm().await?;
    while retry_until_exhausted && state.can_retry() {
        state = submission.retry().await?;
    }

    match &state {
        SubmissionState::Success => {
            submission.dismiss().await?;
            Ok(())
        }
        SubmissionState::Failed { .. } | SubmissionState::Abandoned { .. } => {
            let message = state
                .last_failure()
                .map(|failure| failure.user_message())
                .unwrap_or_default();
            Err(anyhow!(message).context(format!(
                "submission failed after {} attempt(s)",
                state.attempts()
            )))
        }
        _ => {
            // The gate closed between submit and confirm.
            print_field_errors(&form.snapshot().await);
            bail!("application is incomplete")
        }
    }
}

async fn discard(wired: &WiredApp) -> Result<()> {
    let report = wired.app.discard.execute().await;
    if report.is_clean() {
        println!("application discarded");
        return Ok(());
    }
    for failure in &report.failures {
        eprintln!("could not clear {}: {}", failure.target, failure.error);
    }
    bail!("application discarded with {} cleanup failure(s)", report.failures.len())
}

fn guess_mime(path: &Path) -> MimeType {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(MimeType::from_extension)
        .unwrap_or_else(MimeType::octet_stream)
}

fn field_error(snapshot: FinalStepSnapshot, field: FieldKey) -> anyhow::Error {
    match snapshot.field_errors.get(&field) {
        Some(message) => anyhow!("{field}: {message}"),
        None => anyhow!("{field}: operation failed"),
    }
}

fn print_field_errors(snapshot: &FinalStepSnapshot) {
    for (field, message) in &snapshot.field_errors {
        eprintln!("{field}: {message}");
    }
}

fn print_status(wired: &WiredApp, snapshot: &FinalStepSnapshot) {
    let gate = wired.app.final_step.gate();
    let rest = &snapshot.rest_of_data;

    println!("documents:");
    for slot in AttachmentSlot::ALL {
        let marker = if gate.is_required(slot) { "*" } else { " " };
        match rest.files.get(slot) {
            Some(meta) => println!(
                "  {marker} {slot}: {} ({}, {} bytes)",
                meta.name, meta.mime, meta.size
            ),
            None => println!("  {marker} {slot}: -"),
        }
    }

    println!("declarations:");
    for declaration in Declaration::ALL {
        let mark = if rest.declaration.get(declaration) { "x" } else { " " };
        println!("  [{mark}] {declaration}");
    }

    let report = &snapshot.gate;
    if report.missing_slots.is_empty() && report.missing_declarations.is_empty() {
        println!("ready to submit (a CAPTCHA token is required)");
    } else {
        for slot in &report.missing_slots {
            println!("missing document: {slot}");
        }
        for declaration in &report.missing_declarations {
            println!("missing declaration: {declaration}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(guess_mime(Path::new("deed.PDF")), MimeType::pdf());
        assert_eq!(guess_mime(Path::new("fs.xlsx")), MimeType::xlsx());
        assert_eq!(guess_mime(Path::new("photo.png")), MimeType::octet_stream());
        assert_eq!(guess_mime(Path::new("README")), MimeType::octet_stream());
    }

    #[test]
    fn cli_parses_submit_and_declare() {
        let cli = Cli::try_parse_from([
            "company-apply",
            "submit",
            "--captcha-token",
            "tok",
            "--retry-until-exhausted",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Submit { retry_until_exhausted: true, ref captcha_token } if captcha_token == "tok"
        ));

        let cli =
            Cli::try_parse_from(["company-apply", "declare", "permitContact", "false"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Declare {
                name: Declaration::PermitContact,
                accepted: false
            }
        ));
    }

    #[test]
    fn cli_rejects_unknown_slot() {
        assert!(Cli::try_parse_from(["company-apply", "remove", "passport"]).is_err());
    }
}
