//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::ForgeConfig;
use crate::error::{ForgeError, Result};
use crate::intake::{CandidateFile, FileIntake};
use crate::preview::ImagePreview;
use crate::progress::{
    stage_offset, AdvanceMode, ConversionProgress, ConversionStage, RunStatus, StageEvent,
    TickReport, STAGE_TABLE,
};
use crate::session::{FrameLoop, Session};
use crate::viewer::ExportFormat;

/// Overrides taken from `convert` flags
#[derive(Debug, Clone, Default)]
pub struct ConvertOverrides {
    pub output_dir: Option<PathBuf>,
    pub time_scale: Option<f64>,
    pub advance_mode: Option<AdvanceMode>,
}

impl ConvertOverrides {
    pub fn apply(&self, mut config: ForgeConfig) -> Result<ForgeConfig> {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(scale) = self.time_scale {
            config.time_scale = scale;
        }
        if let Some(mode) = self.advance_mode {
            config.advance_mode = mode;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Upload an image, run the simulated conversion and write the downloads.
///
/// Returns the paths written, in the order of `formats` (all formats when
/// empty).
pub fn convert(
    config: ForgeConfig,
    image: &Path,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>> {
    info!("Converting: {}", image.display());

    let output_dir = config.output_dir.clone();
    let frame_loop = FrameLoop::new(config.frame_interval());
    let mut session = Session::new(config);

    offer_and_report(&mut session, CandidateFile::from_path(image)?)?;

    if let Some(preview) = session.preview() {
        print_preview(&preview);
    }

    let backend = session.backend().info().clone();
    println!();
    println!(
        "Converting with {} v{} ({})",
        backend.name, backend.version, backend.quality
    );

    if !session.generate()? {
        warn!("Nothing to convert");
        return Ok(Vec::new());
    }

    let progress = session.progress();
    print_stage_line(progress.stage, &progress);

    let status = frame_loop.run_blocking(&mut session, |_, report| print_progress(report));
    print_notifications(&mut session);

    let conversion_time_secs = match status {
        RunStatus::Completed {
            conversion_time_secs,
        } => conversion_time_secs,
        other => {
            warn!("Conversion ended without a model: {:?}", other);
            return Err(ForgeError::ModelNotReady);
        }
    };

    if let Some(viewer) = session.viewer() {
        let stats = viewer.stats();
        println!();
        println!("Model ready: {}", viewer.source_name());
        println!("  Vertices:        {}", stats.vertices_label());
        println!("  Faces:           {}", stats.faces_label());
        println!("  File size:       {}", stats.size_label);
        println!("  Conversion time: {}s", conversion_time_secs);
    }

    let requested: Vec<ExportFormat> = if formats.is_empty() {
        ExportFormat::ALL.to_vec()
    } else {
        formats.to_vec()
    };

    let mut written = Vec::with_capacity(requested.len());
    for format in requested {
        let artifact = session.download(format)?;
        let path = artifact.save_to(&output_dir)?;
        println!("Saved {} ({} bytes)", path.display(), artifact.bytes.len());
        written.push(path);
    }
    print_notifications(&mut session);

    Ok(written)
}

/// Run intake only and print the preview panel.
pub fn validate(config: &ForgeConfig, image: &Path) -> Result<ImagePreview> {
    info!("Validating: {}", image.display());

    let mut intake = FileIntake::from_config(config);
    let candidate = CandidateFile::from_path(image)?;

    let asset = match intake.accept(candidate) {
        Ok(asset) => asset,
        Err(e) => {
            println!("Rejected: {}", e.friendly_message());
            for suggestion in e.recovery_suggestions() {
                println!("  - {}", suggestion);
            }
            return Err(e);
        }
    };

    let preview = ImagePreview::from_asset(&asset);
    print_preview(&preview);
    println!("  Checksum:   {}", asset.checksum());
    intake.release(&asset);

    Ok(preview)
}

/// Print the stage table.
pub fn print_stages() -> Result<()> {
    println!("Conversion stages:");
    println!(
        "  {:<4} {:<18} {:>8} {:>8} {:>8}",
        "#", "Stage", "Starts", "Lasts", "Target"
    );
    for (index, spec) in STAGE_TABLE.iter().enumerate() {
        println!(
            "  {:<4} {:<18} {:>7.1}s {:>7.1}s {:>7.0}%",
            index + 1,
            spec.stage.label(),
            stage_offset(index).as_secs_f64(),
            spec.duration.as_secs_f64(),
            spec.target_percent
        );
    }
    Ok(())
}

/// Print the export formats.
pub fn print_formats() -> Result<()> {
    println!("Export formats:");
    for format in ExportFormat::ALL {
        println!("  {:<6} {}", format.label(), format.blurb());
    }
    Ok(())
}

fn print_preview(preview: &ImagePreview) {
    println!("{}", preview.name);
    println!("  Type:       {}", preview.kind.mime_type());
    println!("  Size:       {}", preview.size_label());
    match preview.dimensions {
        Some((w, h)) => println!("  Dimensions: {}x{}", w, h),
        None => println!("  Dimensions: unknown"),
    }
    println!("  Status:     {}", preview.caption());
}

fn print_progress(report: &TickReport) {
    for event in &report.events {
        match event {
            StageEvent::Entered(stage) => print_stage_line(*stage, &report.progress),
            StageEvent::Reached { stage, percentage } => {
                info!("[PROGRESS] {} reached {:.0}%", stage, percentage)
            }
        }
    }
}

fn print_stage_line(stage: ConversionStage, progress: &ConversionProgress) {
    println!(
        "  [{:>3}%] {} ({}/{}), ~{}s remaining",
        progress.rounded_percentage(),
        stage.label(),
        stage.index() + 1,
        ConversionStage::ALL.len(),
        progress.estimated_seconds_remaining
    );
}

/// Offer a file and print the toasts it raised, whether accepted or not
fn offer_and_report(session: &mut Session, candidate: CandidateFile) -> Result<()> {
    let result = session.offer_file(candidate);
    print_notifications(session);
    result.map(|_| ())
}

fn print_notifications(session: &mut Session) {
    for notification in session.drain_notifications() {
        println!("[{}] {}", notification.level, notification.message);
    }
}
