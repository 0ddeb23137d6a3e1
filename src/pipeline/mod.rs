use indicatif::{ProgressBar, ProgressStyle};

use crate::acquire::{ytdlp::YtDlpAcquirer, MediaAcquirer};
use crate::compose::AudioCompositor;
use crate::config::Config;
use crate::deliver::{Deliverer, SmtpDeliverer};
use crate::package;
use crate::request::MashupRequest;
use crate::workspace::Workspace;
use crate::{MashupError, Result};

/// Pipeline stages, in execution order. Each stage runs only if the
/// previous one succeeded; a failure names its stage in the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Acquiring,
    Composing,
    Packaging,
    Delivering,
    CleaningUp,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validating => "validation",
            Stage::Acquiring => "acquisition",
            Stage::Composing => "composition",
            Stage::Packaging => "packaging",
            Stage::Delivering => "delivery",
            Stage::CleaningUp => "cleanup",
        };
        write!(f, "{}", name)
    }
}

/// Terminal result of one run, for display to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { message: String },
    Failed { stage: Stage, message: String },
}

impl RunOutcome {
    /// Human-readable status line
    pub fn message(&self) -> String {
        match self {
            RunOutcome::Succeeded { message } => message.clone(),
            RunOutcome::Failed { message, .. } => format!("Error: {}", message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }
}

/// The mashup orchestrator.
///
/// Sequences acquisition, composition, packaging, and delivery strictly in
/// order, attributes any failure to its stage, and removes the run's
/// workspace exactly once on every terminal path once acquisition has
/// begun. Holds no state across runs.
pub struct MashupPipeline {
    config: Config,
    acquirer: Box<dyn MediaAcquirer>,
    deliverer: Box<dyn Deliverer>,
}

impl MashupPipeline {
    /// Create a pipeline wired to yt-dlp and authenticated SMTP delivery.
    pub fn new(config: Config) -> Result<Self> {
        let deliverer = SmtpDeliverer::new(&config.mail)?;

        Ok(Self {
            config,
            acquirer: Box::new(YtDlpAcquirer::new()),
            deliverer: Box::new(deliverer),
        })
    }

    /// Create a pipeline with explicit collaborators at the external
    /// boundaries. Used by tests to substitute mocks.
    pub fn with_collaborators(
        config: Config,
        acquirer: Box<dyn MediaAcquirer>,
        deliverer: Box<dyn Deliverer>,
    ) -> Self {
        Self {
            config,
            acquirer,
            deliverer,
        }
    }

    /// Process one request from raw inputs to a terminal outcome.
    ///
    /// Validation happens before anything is created, so a validation
    /// failure needs no cleanup. From acquisition onward every exit path,
    /// success or failure, cleans the run's workspace before returning.
    pub async fn run(
        &self,
        artist: &str,
        video_count: u32,
        clip_duration_secs: u32,
        recipient_email: &str,
    ) -> RunOutcome {
        let request =
            match MashupRequest::new(artist, video_count, clip_duration_secs, recipient_email) {
                Ok(request) => request,
                Err(e) => {
                    return RunOutcome::Failed {
                        stage: Stage::Validating,
                        message: e.to_string(),
                    }
                }
            };

        tracing::info!(
            "Starting mashup run: artist={:?}, videos={}, clip={}s, to={}",
            request.artist(),
            request.video_count(),
            request.clip_duration_secs(),
            request.recipient_email()
        );

        let workspace = match Workspace::create(&self.config.app.work_root) {
            Ok(workspace) => workspace,
            Err(e) => {
                return RunOutcome::Failed {
                    stage: Stage::Acquiring,
                    message: format!("{:#}", e),
                }
            }
        };

        // Acquiring
        let spinner = stage_spinner("Downloading videos...");
        let assets = match self
            .acquirer
            .acquire(
                request.artist(),
                request.video_count(),
                &workspace.download_dir(),
            )
            .await
        {
            Ok(assets) => assets,
            Err(e) => {
                spinner.finish_and_clear();
                return self.fail(Stage::Acquiring, e, &workspace);
            }
        };
        if assets.is_empty() {
            spinner.finish_and_clear();
            return self.fail(
                Stage::Acquiring,
                anyhow::anyhow!("no results could be downloaded"),
                &workspace,
            );
        }
        spinner.finish_with_message(format!("Downloaded {} clip(s)", assets.len()));

        // Composing
        let spinner = stage_spinner("Processing audio...");
        let compositor = AudioCompositor::new(request.clip_duration_secs());
        let stats = match compositor.compose(&workspace.download_dir(), &workspace.output_path()) {
            Ok(stats) => stats,
            Err(e) => {
                spinner.finish_and_clear();
                return self.fail(Stage::Composing, e, &workspace);
            }
        };
        spinner.finish_with_message(format!(
            "Composed {} clip(s), {}",
            stats.clip_count,
            crate::utils::format_duration(stats.duration_secs)
        ));

        // Packaging
        if let Err(e) = package::package(&workspace.output_path(), &workspace.archive_path()) {
            return self.fail(Stage::Packaging, e, &workspace);
        }

        // Delivering
        let spinner = stage_spinner("Sending email...");
        if let Err(e) = self
            .deliverer
            .deliver(request.recipient_email(), &workspace.archive_path())
            .await
        {
            spinner.finish_and_clear();
            return self.fail(Stage::Delivering, e, &workspace);
        }
        spinner.finish_with_message("Email sent");

        // Cleaning up
        if let Err(e) = workspace.clean() {
            return RunOutcome::Failed {
                stage: Stage::CleaningUp,
                message: format!("{:#}", e),
            };
        }

        RunOutcome::Succeeded {
            message: format!("Mashup sent to {}!", request.recipient_email()),
        }
    }

    /// Terminal failure path: clean the workspace, then report. A cleanup
    /// error here is logged but never masks the stage failure.
    fn fail(&self, stage: Stage, error: anyhow::Error, workspace: &Workspace) -> RunOutcome {
        tracing::error!("Stage {} failed: {:#}", stage, error);

        if let Err(cleanup_error) = workspace.clean() {
            tracing::warn!("Cleanup after failure also failed: {:#}", cleanup_error);
        }

        let cause = format!("{:#}", error);
        let message = match stage {
            Stage::Validating => MashupError::Validation(cause).to_string(),
            Stage::Acquiring => MashupError::Acquisition(cause).to_string(),
            Stage::Composing => MashupError::Composition(cause).to_string(),
            Stage::Packaging => MashupError::Packaging(cause).to_string(),
            Stage::Delivering => MashupError::Delivery(cause).to_string(),
            Stage::CleaningUp => cause,
        };

        RunOutcome::Failed { stage, message }
    }
}

fn stage_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner
}
