//! Conversion session
//!
//! Owns everything a single conversion needs and enforces the lifecycle:
//!
//! ```text
//! Idle --offer_file--> Uploading --generate--> Converting --tick--> Completed
//!   ^                      |                       |                   |
//!   +------remove_file-----+------start_over-------+-----start_over----+
//! ```
//!
//! Any other request is a no-op. Intake is only enabled while idle.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::state::{ConversionState, VisiblePanels};
use crate::backend::{ModelHandle, PlaceholderBackend, ReconstructionBackend};
use crate::config::ForgeConfig;
use crate::error::{ForgeError, Result};
use crate::intake::{CandidateFile, FileIntake, UploadedAsset};
use crate::notify::{Notification, NotificationCenter};
use crate::preview::ImagePreview;
use crate::progress::{
    stage_statuses, CancellationToken, Clock, ConversionProgress, ConversionStage,
    ProgressSimulator, RunStatus, ScaledClock, StageStatus, SystemClock, TickReport,
};
use crate::viewer::{DownloadArtifact, ExportFormat, ModelViewer};

/// What happened to a file offered to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
    Accepted,
    /// Intake was disabled; the offer was dropped without validation
    Ignored,
}

/// The run currently in flight
struct ActiveRun {
    token: CancellationToken,
    handle: ModelHandle,
}

pub struct Session {
    config: ForgeConfig,
    state: ConversionState,
    intake: FileIntake,
    asset: Option<UploadedAsset>,
    simulator: ProgressSimulator,
    run: Option<ActiveRun>,
    viewer: Option<ModelViewer>,
    conversion_time_secs: u64,
    notifications: NotificationCenter,
    clock: Arc<dyn Clock>,
    backend: Arc<dyn ReconstructionBackend>,
    last_frame: Option<Duration>,
}

impl Session {
    /// Session on the wall clock (scaled by `time_scale`) with the
    /// placeholder backend
    pub fn new(config: ForgeConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("[SESSION] Running with an invalid config: {}", e);
        }
        let system: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let clock: Arc<dyn Clock> = if (config.time_scale - 1.0).abs() > f64::EPSILON {
            Arc::new(ScaledClock::new(system, config.time_scale))
        } else {
            system
        };
        Self::with_parts(config, clock, Arc::new(PlaceholderBackend::new()))
    }

    pub fn with_parts(
        config: ForgeConfig,
        clock: Arc<dyn Clock>,
        backend: Arc<dyn ReconstructionBackend>,
    ) -> Self {
        Self {
            intake: FileIntake::from_config(&config),
            simulator: ProgressSimulator::new(config.advance_mode),
            config,
            state: ConversionState::Idle,
            asset: None,
            run: None,
            viewer: None,
            conversion_time_secs: 0,
            notifications: NotificationCenter::new(),
            clock,
            backend,
            last_frame: None,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Offer a file to intake
    ///
    /// State transition: Idle -> Uploading on acceptance. Rejections raise
    /// an error notification and leave the state untouched.
    ///
    /// # Errors
    /// * `UnsupportedFileType` - Extension or MIME type not accepted
    /// * `FileTooLarge` - Size exceeds the upload ceiling
    pub fn offer_file(&mut self, candidate: CandidateFile) -> Result<IntakeOutcome> {
        if !self.intake.is_enabled() {
            debug!("[SESSION] Ignoring {} while {}", candidate.name(), self.state);
            return Ok(IntakeOutcome::Ignored);
        }

        match self.intake.accept(candidate) {
            Ok(asset) => {
                self.notifications
                    .success(format!("{} uploaded successfully!", asset.name()));
                self.asset = Some(asset);
                self.transition(ConversionState::Uploading);
                Ok(IntakeOutcome::Accepted)
            }
            Err(e) => {
                self.notifications.error(e.friendly_message());
                Err(e)
            }
        }
    }

    /// Drop the loaded file
    ///
    /// State transition: Uploading -> Idle. Returns false in any other state.
    pub fn remove_file(&mut self) -> bool {
        if self.state != ConversionState::Uploading {
            debug!("[SESSION] remove_file ignored while {}", self.state);
            return false;
        }
        self.release_asset();
        self.simulator.reset();
        self.transition(ConversionState::Idle);
        true
    }

    /// Submit the loaded image and start the simulated run
    ///
    /// State transition: Uploading -> Converting. Returns `Ok(false)` when
    /// there is nothing to convert.
    ///
    /// # Errors
    /// * `BackendError` - The backend refused the image; state stays Uploading
    pub fn generate(&mut self) -> Result<bool> {
        let asset = match (&self.asset, self.state) {
            (Some(asset), ConversionState::Uploading) => asset,
            _ => {
                debug!("[SESSION] generate ignored while {}", self.state);
                return Ok(false);
            }
        };

        let handle = match self.backend.submit(asset) {
            Ok(handle) => handle,
            Err(e) => {
                self.notifications.error(e.friendly_message());
                return Err(e);
            }
        };

        let token = CancellationToken::new();
        let now = self.clock.now();
        self.simulator.start(now, token.clone());
        self.run = Some(ActiveRun { token, handle });
        self.conversion_time_secs = 0;
        self.last_frame = Some(now);
        self.transition(ConversionState::Converting);
        Ok(true)
    }

    /// Advance one frame
    ///
    /// While converting this samples the simulator; the tick that sees the
    /// final stage reach its target moves the session to Completed. While
    /// completed it animates the viewer.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        let delta = self
            .last_frame
            .map(|last| now.saturating_sub(last))
            .unwrap_or_default();
        self.last_frame = Some(now);

        let report = self.simulator.tick(now);
        match self.state {
            ConversionState::Converting => {
                if let RunStatus::Completed {
                    conversion_time_secs,
                } = report.status
                {
                    self.finish(conversion_time_secs);
                }
            }
            ConversionState::Completed => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.advance_frame(delta);
                }
            }
            _ => {}
        }
        report
    }

    /// Return to Idle from any other state
    ///
    /// An in-flight run is cancelled through its token, so loops holding a
    /// clone stop on their next tick.
    pub fn start_over(&mut self) -> bool {
        if self.state == ConversionState::Idle {
            debug!("[SESSION] start_over ignored while idle");
            return false;
        }

        if let Some(run) = self.run.take() {
            run.token.cancel();
            info!("[SESSION] Cancelled in-flight conversion");
        }
        self.release_asset();
        self.simulator.reset();
        self.viewer = None;
        self.conversion_time_secs = 0;
        self.last_frame = None;
        self.transition(ConversionState::Idle);
        true
    }

    // ========================================================================
    // Viewer actions
    // ========================================================================

    /// Build a download for the generated model
    ///
    /// # Errors
    /// * `ModelNotReady` - Not in the Completed state
    pub fn download(&mut self, format: ExportFormat) -> Result<DownloadArtifact> {
        let viewer = match (&self.viewer, self.state) {
            (Some(viewer), ConversionState::Completed) => viewer,
            _ => return Err(ForgeError::ModelNotReady),
        };

        let artifact = viewer.export(format, self.backend.as_ref())?;
        self.notifications
            .success(format!("Downloading {} file...", format.label()));
        Ok(artifact)
    }

    pub fn reset_camera(&mut self) -> bool {
        match (self.viewer.as_mut(), self.state) {
            (Some(viewer), ConversionState::Completed) => {
                viewer.reset_camera();
                self.notifications.info("Camera view reset");
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> ConversionState {
        self.state
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn asset(&self) -> Option<&UploadedAsset> {
        self.asset.as_ref()
    }

    pub fn preview(&self) -> Option<ImagePreview> {
        self.asset.as_ref().map(ImagePreview::from_asset)
    }

    pub fn progress(&self) -> ConversionProgress {
        self.simulator.progress()
    }

    pub fn stage_statuses(&self) -> Vec<(ConversionStage, StageStatus)> {
        stage_statuses(self.progress().stage)
    }

    pub fn conversion_time_secs(&self) -> u64 {
        self.conversion_time_secs
    }

    pub fn viewer(&self) -> Option<&ModelViewer> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut ModelViewer> {
        self.viewer.as_mut()
    }

    pub fn backend(&self) -> &dyn ReconstructionBackend {
        self.backend.as_ref()
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    /// Token of the run in flight, if any
    pub fn run_token(&self) -> Option<CancellationToken> {
        self.run.as_ref().map(|r| r.token.clone())
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn visible_panels(&self) -> VisiblePanels {
        VisiblePanels::for_state(self.state)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn finish(&mut self, conversion_time_secs: u64) {
        let Some(run) = self.run.take() else {
            warn!("[SESSION] Run completed without an active handle");
            return;
        };
        let stem = self
            .asset
            .as_ref()
            .map(|a| a.stem().to_string())
            .unwrap_or_else(|| "model".to_string());

        self.conversion_time_secs = conversion_time_secs;
        self.viewer = Some(ModelViewer::new(run.handle, stem, conversion_time_secs));
        self.notifications.success("3D model generated successfully!");
        self.transition(ConversionState::Completed);
    }

    fn release_asset(&mut self) {
        if let Some(asset) = self.asset.take() {
            self.intake.release(&asset);
        }
    }

    fn transition(&mut self, to: ConversionState) {
        info!("[SESSION] {} -> {}", self.state, to);
        self.state = to;
        self.intake.set_enabled(to == ConversionState::Idle);
    }
}
