//! Session Integration Tests
//!
//! Drive a full conversion through the public API on a manual clock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use depthforge::backend::PlaceholderBackend;
use depthforge::intake::CandidateFile;
use depthforge::progress::{
    AdvanceMode, ConversionStage, ManualClock, RunStatus, StageEvent, StageStatus,
};
use depthforge::session::IntakeOutcome;
use depthforge::viewer::ExportFormat;
use depthforge::{ConversionState, ForgeConfig, ForgeError, FrameLoop, Session};

const MIB: usize = 1024 * 1024;

fn session_with(config: ForgeConfig) -> (Session, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let session = Session::with_parts(config, clock.clone(), Arc::new(PlaceholderBackend::new()));
    (session, clock)
}

fn session() -> (Session, Arc<ManualClock>) {
    session_with(ForgeConfig::default())
}

fn photo() -> CandidateFile {
    CandidateFile::from_bytes("photo.jpg", vec![0u8; 2 * MIB])
}

/// Tick every `step` until the session leaves Converting, collecting
/// percentages and stage events.
fn run_to_end(
    session: &mut Session,
    clock: &ManualClock,
    step: Duration,
) -> (Vec<f64>, Vec<StageEvent>) {
    let mut percentages = vec![session.progress().percentage];
    let mut events = Vec::new();
    while session.state() == ConversionState::Converting {
        clock.advance(step);
        let report = session.tick();
        percentages.push(report.progress.percentage);
        events.extend(report.events);
    }
    (percentages, events)
}

fn reached(events: &[StageEvent]) -> Vec<(ConversionStage, f64)> {
    events
        .iter()
        .filter_map(|e| match e {
            StageEvent::Reached { stage, percentage } => Some((*stage, *percentage)),
            StageEvent::Entered(_) => None,
        })
        .collect()
}

fn expected_targets() -> Vec<(ConversionStage, f64)> {
    vec![
        (ConversionStage::ImageAnalysis, 20.0),
        (ConversionStage::AiProcessing, 70.0),
        (ConversionStage::MeshGeneration, 95.0),
        (ConversionStage::Complete, 100.0),
    ]
}

// === End-to-End ===

#[test]
fn test_photo_converts_and_downloads_glb() {
    let (mut session, clock) = session();
    assert_eq!(session.state(), ConversionState::Idle);

    assert_eq!(session.offer_file(photo()).unwrap(), IntakeOutcome::Accepted);
    assert_eq!(session.state(), ConversionState::Uploading);
    assert_eq!(session.asset().unwrap().size(), (2 * MIB) as u64);

    assert!(session.generate().unwrap());
    assert_eq!(session.state(), ConversionState::Converting);
    assert_eq!(session.progress().stage, ConversionStage::ImageAnalysis);
    assert_eq!(session.progress().estimated_seconds_remaining, 15);

    let (_, events) = run_to_end(&mut session, &clock, Duration::from_millis(16));
    assert_eq!(reached(&events), expected_targets());

    assert_eq!(session.state(), ConversionState::Completed);
    assert_eq!(session.progress().percentage, 100.0);
    assert!(session.conversion_time_secs() > 0);

    let dir = TempDir::new().unwrap();
    let artifact = session.download(ExportFormat::Glb).unwrap();
    assert_eq!(artifact.file_name, "photo.glb");
    let path = artifact.save_to(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("photo.glb"));
    assert_eq!(std::fs::read(path).unwrap(), b"Mock 3D model data");

    let latest = session.notifications().latest().unwrap();
    assert_eq!(latest.message, "Downloading GLB file...");
}

#[test]
fn test_percentage_is_monotonic_from_zero_to_hundred() {
    let (mut session, clock) = session();
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();

    let (percentages, _) = run_to_end(&mut session, &clock, Duration::from_millis(100));

    assert_eq!(percentages.first().copied(), Some(0.0));
    assert_eq!(percentages.last().copied(), Some(100.0));
    for pair in percentages.windows(2) {
        assert!(pair[1] >= pair[0], "{} then {}", pair[0], pair[1]);
    }
}

#[test]
fn test_slow_frames_skip_no_stage() {
    let (mut session, clock) = session();
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();

    // One frame lands past image analysis, ai processing and mesh generation
    clock.advance(Duration::from_secs(15) + Duration::from_millis(500));
    let report = session.tick();
    assert_eq!(report.progress.stage, ConversionStage::Complete);
    assert_eq!(
        reached(&report.events),
        expected_targets()[..3].to_vec()
    );

    let (_, events) = run_to_end(&mut session, &clock, Duration::from_millis(500));
    assert_eq!(reached(&events), expected_targets()[3..].to_vec());
    assert_eq!(session.state(), ConversionState::Completed);
}

#[test]
fn test_frame_synchronized_run_visits_every_target() {
    let config = ForgeConfig {
        advance_mode: AdvanceMode::FrameSynchronized,
        ..ForgeConfig::default()
    };
    let (mut session, clock) = session_with(config);
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();

    let (percentages, events) = run_to_end(&mut session, &clock, Duration::from_millis(250));
    assert_eq!(reached(&events), expected_targets());
    assert_eq!(percentages.last().copied(), Some(100.0));
    assert!(session.conversion_time_secs() >= 16);
}

#[test]
fn test_stage_statuses_follow_progress() {
    let (mut session, clock) = session();
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();

    clock.advance(Duration::from_secs(3));
    session.tick();

    let statuses: Vec<StageStatus> = session
        .stage_statuses()
        .into_iter()
        .map(|(_, status)| status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            StageStatus::Done,
            StageStatus::Active,
            StageStatus::Pending,
            StageStatus::Pending
        ]
    );
}

// === Lifecycle ===

#[test]
fn test_remove_releases_display_url() {
    let (mut session, _) = session();
    session.offer_file(photo()).unwrap();
    let url = session.asset().unwrap().display_url().clone();
    assert!(session.intake().urls().is_live(&url));

    assert!(session.remove_file());
    assert_eq!(session.state(), ConversionState::Idle);
    assert!(session.asset().is_none());
    assert!(!session.intake().urls().is_live(&url));
    assert_eq!(session.intake().urls().live_count(), 0);
    assert_eq!(session.intake().urls().released_count(), 1);
}

#[test]
fn test_generate_without_file_is_noop() {
    let (mut session, _) = session();
    assert!(!session.generate().unwrap());
    assert_eq!(session.state(), ConversionState::Idle);
}

#[test]
fn test_each_accepted_file_enters_uploading_once() {
    let (mut session, _) = session();
    for name in ["a.png", "b.gif", "c.webp"] {
        let outcome = session
            .offer_file(CandidateFile::from_bytes(name, vec![1, 2, 3]))
            .unwrap();
        assert_eq!(outcome, IntakeOutcome::Accepted);
        assert_eq!(session.state(), ConversionState::Uploading);

        let again = session
            .offer_file(CandidateFile::from_bytes(name, vec![1, 2, 3]))
            .unwrap();
        assert_eq!(again, IntakeOutcome::Ignored);

        session.remove_file();
    }
    assert_eq!(session.intake().urls().issued_count(), 3);
    assert_eq!(session.intake().urls().live_count(), 0);
}

#[test]
fn test_offers_ignored_while_converting_and_completed() {
    let (mut session, clock) = session();
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();

    let late = || CandidateFile::from_bytes("late.png", vec![1, 2, 3]);

    clock.advance(Duration::from_secs(4));
    session.tick();
    assert_eq!(session.state(), ConversionState::Converting);
    assert_eq!(session.offer_file(late()).unwrap(), IntakeOutcome::Ignored);
    // Even an oversized file is dropped without validation
    let huge = CandidateFile::from_bytes("huge.png", vec![0u8; 12 * MIB]);
    assert_eq!(session.offer_file(huge).unwrap(), IntakeOutcome::Ignored);

    clock.advance(Duration::from_secs(12));
    session.tick();
    assert_eq!(session.state(), ConversionState::Completed);
    assert_eq!(session.offer_file(late()).unwrap(), IntakeOutcome::Ignored);

    assert_eq!(session.asset().unwrap().name(), "photo.jpg");
    assert_eq!(session.intake().urls().issued_count(), 1);
    assert_eq!(session.viewer().unwrap().source_name(), "photo.jpg");
}

#[test]
fn test_start_over_mid_run_never_completes() {
    let (mut session, clock) = session();
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();
    let token = session.run_token().unwrap();

    clock.advance(Duration::from_secs(5));
    session.tick();
    assert!(session.start_over());
    assert!(token.is_cancelled());
    assert_eq!(session.state(), ConversionState::Idle);
    assert_eq!(session.intake().urls().live_count(), 0);

    clock.advance(Duration::from_secs(30));
    let report = session.tick();
    assert_eq!(report.status, RunStatus::NotStarted);
    assert_eq!(session.state(), ConversionState::Idle);
    assert!(session.viewer().is_none());
}

#[test]
fn test_start_over_after_completion_returns_to_idle() {
    let (mut session, clock) = session();
    session.offer_file(photo()).unwrap();
    session.generate().unwrap();
    let status = FrameLoop::new(Duration::ZERO).run_blocking(&mut session, |_, _| {
        clock.advance(Duration::from_millis(16));
    });
    assert!(matches!(status, RunStatus::Completed { .. }));

    assert!(session.start_over());
    assert_eq!(session.state(), ConversionState::Idle);
    assert_eq!(session.progress().percentage, 0.0);
    assert_eq!(session.conversion_time_secs(), 0);
    assert!(matches!(
        session.download(ExportFormat::Obj),
        Err(ForgeError::ModelNotReady)
    ));

    // Intake works again
    assert_eq!(session.offer_file(photo()).unwrap(), IntakeOutcome::Accepted);
}

#[test]
fn test_panels_track_state() {
    let (mut session, clock) = session();
    assert!(session.visible_panels().upload_zone);

    session.offer_file(photo()).unwrap();
    assert!(session.visible_panels().generate_button);

    session.generate().unwrap();
    assert!(session.visible_panels().progress);

    clock.advance(Duration::from_secs(16));
    session.tick();
    let panels = session.visible_panels();
    assert!(panels.viewer && panels.start_over_button);
    assert!(!panels.upload_zone);
}
