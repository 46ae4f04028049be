//! Progress Simulator
//!
//! Drives a conversion run through the stage table from a single clock.
//! Stage activation and percentage interpolation are separate concerns:
//!
//! - Which stage is active is decided by the advance mode (by schedule, or
//!   only once the previous stage's interpolation has finished).
//! - The percentage is recomputed on every tick from the time spent in the
//!   active stage.
//!
//! The simulator never sleeps or schedules anything itself; a frame loop
//! calls `tick` with the current clock reading.

use std::fmt;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::cancel::CancellationToken;
use super::stage::{stage_offset, starting_percent, ConversionStage, StageSpec, STAGE_TABLE};

/// Estimate shown before a run starts and after a reset
pub const INITIAL_ESTIMATE_SECS: u32 = 15;

/// When the next stage becomes active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvanceMode {
    /// Stage N starts exactly at the sum of the previous durations, whether
    /// or not a tick ever saw stage N-1 reach its target.
    #[default]
    Scheduled,
    /// Stage N starts on the first tick where stage N-1 reached its target.
    FrameSynchronized,
}

impl fmt::Display for AdvanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvanceMode::Scheduled => write!(f, "scheduled"),
            AdvanceMode::FrameSynchronized => write!(f, "frame-synchronized"),
        }
    }
}

/// Observable progress of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionProgress {
    pub stage: ConversionStage,
    /// 0-100, never decreases within a run
    pub percentage: f64,
    pub estimated_seconds_remaining: u32,
}

impl Default for ConversionProgress {
    fn default() -> Self {
        Self {
            stage: ConversionStage::ImageAnalysis,
            percentage: 0.0,
            estimated_seconds_remaining: INITIAL_ESTIMATE_SECS,
        }
    }
}

impl ConversionProgress {
    /// Percentage as shown on the progress bar
    pub fn rounded_percentage(&self) -> u32 {
        self.percentage.round() as u32
    }
}

/// Something that happened to a stage during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StageEvent {
    Entered(ConversionStage),
    Reached {
        stage: ConversionStage,
        percentage: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    NotStarted,
    Running,
    Completed { conversion_time_secs: u64 },
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed { .. } | RunStatus::Cancelled)
    }
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub progress: ConversionProgress,
    pub events: Vec<StageEvent>,
    pub status: RunStatus,
}

#[derive(Debug, Clone)]
struct RunState {
    started_at: Duration,
    active: usize,
    active_started_at: Duration,
    progress: ConversionProgress,
    status: RunStatus,
    token: CancellationToken,
}

/// Clock-driven stage sequencer
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    stages: &'static [StageSpec],
    mode: AdvanceMode,
    run: Option<RunState>,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::new(AdvanceMode::default())
    }
}

impl ProgressSimulator {
    pub fn new(mode: AdvanceMode) -> Self {
        Self {
            stages: &STAGE_TABLE,
            mode,
            run: None,
        }
    }

    pub fn mode(&self) -> AdvanceMode {
        self.mode
    }

    /// Begin a run at `now`. Any previous run is discarded.
    pub fn start(&mut self, now: Duration, token: CancellationToken) -> TickReport {
        let first = &self.stages[0];
        let progress = ConversionProgress {
            stage: first.stage,
            percentage: 0.0,
            estimated_seconds_remaining: INITIAL_ESTIMATE_SECS,
        };

        self.run = Some(RunState {
            started_at: now,
            active: 0,
            active_started_at: now,
            progress,
            status: RunStatus::Running,
            token,
        });

        info!("[SIMULATOR] Run started ({} mode)", self.mode);
        TickReport {
            progress,
            events: vec![StageEvent::Entered(first.stage)],
            status: RunStatus::Running,
        }
    }

    /// Drop the current run and return to the reset progress
    pub fn reset(&mut self) {
        self.run = None;
    }

    pub fn progress(&self) -> ConversionProgress {
        self.run.as_ref().map(|r| r.progress).unwrap_or_default()
    }

    pub fn status(&self) -> RunStatus {
        self.run
            .as_ref()
            .map(|r| r.status)
            .unwrap_or(RunStatus::NotStarted)
    }

    /// Sample the run at `now`
    pub fn tick(&mut self, now: Duration) -> TickReport {
        let stages = self.stages;
        let mode = self.mode;
        let last = stages.len() - 1;

        let Some(run) = self.run.as_mut() else {
            return TickReport {
                progress: ConversionProgress::default(),
                events: Vec::new(),
                status: RunStatus::NotStarted,
            };
        };

        if run.status.is_terminal() {
            return TickReport {
                progress: run.progress,
                events: Vec::new(),
                status: run.status,
            };
        }

        if run.token.is_cancelled() {
            run.status = RunStatus::Cancelled;
            info!("[SIMULATOR] Run cancelled at {:.1}%", run.progress.percentage);
            return TickReport {
                progress: run.progress,
                events: Vec::new(),
                status: run.status,
            };
        }

        let mut events = Vec::new();
        let elapsed = now.saturating_sub(run.started_at);

        if mode == AdvanceMode::Scheduled {
            let scheduled = scheduled_index(stages, elapsed);
            while run.active < scheduled {
                let left = &stages[run.active];
                events.push(StageEvent::Reached {
                    stage: left.stage,
                    percentage: left.target_percent,
                });
                run.active += 1;
                run.active_started_at = run.started_at + stage_offset(run.active);
                events.push(StageEvent::Entered(stages[run.active].stage));
                debug!("[SIMULATOR] Scheduled start of {}", stages[run.active].stage);
            }
        }

        let spec = &stages[run.active];
        let fraction = stage_fraction(now.saturating_sub(run.active_started_at), spec.duration);
        let from = starting_percent(run.active);
        let percentage = from + (spec.target_percent - from) * fraction;

        run.progress = ConversionProgress {
            stage: spec.stage,
            percentage: percentage.max(run.progress.percentage).min(100.0),
            estimated_seconds_remaining: remaining_secs(stages, run.active, fraction),
        };

        if fraction >= 1.0 {
            if run.active == last {
                run.progress.percentage = spec.target_percent;
                events.push(StageEvent::Reached {
                    stage: spec.stage,
                    percentage: spec.target_percent,
                });
                let conversion_time_secs = elapsed.as_secs_f64().round() as u64;
                run.status = RunStatus::Completed {
                    conversion_time_secs,
                };
                info!("[SIMULATOR] Run completed in {}s", conversion_time_secs);
            } else if mode == AdvanceMode::FrameSynchronized {
                events.push(StageEvent::Reached {
                    stage: spec.stage,
                    percentage: spec.target_percent,
                });
                run.active += 1;
                run.active_started_at = now;
                let next = &stages[run.active];
                events.push(StageEvent::Entered(next.stage));
                run.progress = ConversionProgress {
                    stage: next.stage,
                    percentage: spec.target_percent,
                    estimated_seconds_remaining: remaining_secs(stages, run.active, 0.0),
                };
                debug!("[SIMULATOR] Frame-synchronized start of {}", next.stage);
            }
        }

        TickReport {
            progress: run.progress,
            events,
            status: run.status,
        }
    }
}

/// Index of the last stage whose scheduled offset has passed
fn scheduled_index(stages: &[StageSpec], elapsed: Duration) -> usize {
    let mut offset = Duration::ZERO;
    let mut index = 0;
    for (i, spec) in stages.iter().enumerate().take(stages.len() - 1) {
        offset += spec.duration;
        if elapsed >= offset {
            index = i + 1;
        } else {
            break;
        }
    }
    index
}

fn stage_fraction(in_stage: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (in_stage.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Later stages' total duration scaled by what is left of the active one
fn remaining_secs(stages: &[StageSpec], active: usize, fraction: f64) -> u32 {
    let later: f64 = stages[active + 1..]
        .iter()
        .map(|s| s.duration.as_secs_f64())
        .sum();
    (later * (1.0 - fraction)).max(0.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn reached(events: &[StageEvent]) -> Vec<(ConversionStage, f64)> {
        events
            .iter()
            .filter_map(|e| match e {
                StageEvent::Reached { stage, percentage } => Some((*stage, *percentage)),
                _ => None,
            })
            .collect()
    }

    fn run_to_end(mode: AdvanceMode, frame: Duration) -> (Vec<TickReport>, RunStatus) {
        let mut sim = ProgressSimulator::new(mode);
        let mut reports = vec![sim.start(Duration::ZERO, CancellationToken::new())];
        let mut now = Duration::ZERO;
        for _ in 0..10_000 {
            now += frame;
            let report = sim.tick(now);
            let status = report.status;
            reports.push(report);
            if status.is_terminal() {
                return (reports, status);
            }
        }
        panic!("run never finished");
    }

    #[test]
    fn test_start_reports_zero() {
        let mut sim = ProgressSimulator::default();
        let report = sim.start(Duration::ZERO, CancellationToken::new());
        assert_eq!(report.progress.percentage, 0.0);
        assert_eq!(report.progress.stage, ConversionStage::ImageAnalysis);
        assert_eq!(report.progress.estimated_seconds_remaining, INITIAL_ESTIMATE_SECS);
        assert_eq!(
            report.events,
            vec![StageEvent::Entered(ConversionStage::ImageAnalysis)]
        );

        // The first frame replaces the initial estimate with the computed one
        let report = sim.tick(Duration::ZERO);
        assert_eq!(report.progress.estimated_seconds_remaining, 14);
    }

    #[test]
    fn test_tick_before_start() {
        let mut sim = ProgressSimulator::default();
        let report = sim.tick(ms(500));
        assert_eq!(report.status, RunStatus::NotStarted);
        assert_eq!(report.progress, ConversionProgress::default());
    }

    #[test]
    fn test_interpolation_within_stages() {
        let mut sim = ProgressSimulator::default();
        sim.start(Duration::ZERO, CancellationToken::new());

        let report = sim.tick(ms(1000));
        assert_relative_eq!(report.progress.percentage, 10.0);
        assert_eq!(report.progress.estimated_seconds_remaining, 7);

        let report = sim.tick(ms(6000));
        assert_eq!(report.progress.stage, ConversionStage::AiProcessing);
        assert_relative_eq!(report.progress.percentage, 45.0);
        assert_eq!(report.progress.estimated_seconds_remaining, 3);

        let report = sim.tick(ms(12_500));
        assert_eq!(report.progress.stage, ConversionStage::MeshGeneration);
        assert_relative_eq!(report.progress.percentage, 82.5);
    }

    #[test]
    fn test_full_run_is_monotonic_and_hits_every_target() {
        let (reports, status) = run_to_end(AdvanceMode::Scheduled, ms(16));

        assert_eq!(
            status,
            RunStatus::Completed {
                conversion_time_secs: 16
            }
        );

        let mut last = 0.0;
        for report in &reports {
            assert!(report.progress.percentage >= last);
            last = report.progress.percentage;
        }
        assert_eq!(reports.first().unwrap().progress.percentage, 0.0);
        assert_eq!(last, 100.0);

        let all_events: Vec<StageEvent> =
            reports.iter().flat_map(|r| r.events.iter().copied()).collect();
        assert_eq!(
            reached(&all_events),
            vec![
                (ConversionStage::ImageAnalysis, 20.0),
                (ConversionStage::AiProcessing, 70.0),
                (ConversionStage::MeshGeneration, 95.0),
                (ConversionStage::Complete, 100.0),
            ]
        );
    }

    #[test]
    fn test_slow_frame_does_not_skip_stages() {
        let mut sim = ProgressSimulator::new(AdvanceMode::Scheduled);
        sim.start(Duration::ZERO, CancellationToken::new());

        // One frame that lands well past every scheduled offset
        let report = sim.tick(ms(20_000));
        assert_eq!(
            report.events,
            vec![
                StageEvent::Reached {
                    stage: ConversionStage::ImageAnalysis,
                    percentage: 20.0
                },
                StageEvent::Entered(ConversionStage::AiProcessing),
                StageEvent::Reached {
                    stage: ConversionStage::AiProcessing,
                    percentage: 70.0
                },
                StageEvent::Entered(ConversionStage::MeshGeneration),
                StageEvent::Reached {
                    stage: ConversionStage::MeshGeneration,
                    percentage: 95.0
                },
                StageEvent::Entered(ConversionStage::Complete),
                StageEvent::Reached {
                    stage: ConversionStage::Complete,
                    percentage: 100.0
                },
            ]
        );
        assert_eq!(
            report.status,
            RunStatus::Completed {
                conversion_time_secs: 20
            }
        );
    }

    #[test]
    fn test_scheduled_start_ignores_interpolation() {
        let mut sim = ProgressSimulator::new(AdvanceMode::Scheduled);
        sim.start(Duration::ZERO, CancellationToken::new());
        sim.tick(ms(1000));

        // Stage 2 started at its scheduled 2s offset, not at this tick
        let report = sim.tick(ms(7000));
        assert_relative_eq!(report.progress.percentage, 20.0 + 50.0 * (5.0 / 8.0));
    }

    #[test]
    fn test_frame_synchronized_waits_for_target() {
        let mut sim = ProgressSimulator::new(AdvanceMode::FrameSynchronized);
        sim.start(Duration::ZERO, CancellationToken::new());
        sim.tick(ms(1000));

        // First tick past 2s observes the target and starts the next stage here
        let report = sim.tick(ms(3000));
        assert_eq!(report.progress.stage, ConversionStage::AiProcessing);
        assert_relative_eq!(report.progress.percentage, 20.0);

        let report = sim.tick(ms(7000));
        assert_relative_eq!(report.progress.percentage, 45.0);
    }

    #[test]
    fn test_frame_synchronized_full_run() {
        let (reports, status) = run_to_end(AdvanceMode::FrameSynchronized, ms(16));
        assert!(matches!(status, RunStatus::Completed { .. }));

        let all_events: Vec<StageEvent> =
            reports.iter().flat_map(|r| r.events.iter().copied()).collect();
        assert_eq!(reached(&all_events).len(), 4);
        assert_eq!(reports.last().unwrap().progress.percentage, 100.0);
    }

    #[test]
    fn test_cancelled_run_never_completes() {
        let token = CancellationToken::new();
        let mut sim = ProgressSimulator::default();
        sim.start(Duration::ZERO, token.clone());
        sim.tick(ms(3000));

        token.cancel();
        let report = sim.tick(ms(4000));
        assert_eq!(report.status, RunStatus::Cancelled);

        let report = sim.tick(ms(60_000));
        assert_eq!(report.status, RunStatus::Cancelled);
        assert!(report.events.is_empty());
        assert!(report.progress.percentage < 100.0);
    }

    #[test]
    fn test_ticks_after_completion_are_inert() {
        let mut sim = ProgressSimulator::default();
        sim.start(Duration::ZERO, CancellationToken::new());
        let done = sim.tick(ms(16_000));
        assert!(done.status.is_terminal());

        let again = sim.tick(ms(30_000));
        assert_eq!(again.status, done.status);
        assert!(again.events.is_empty());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut sim = ProgressSimulator::default();
        sim.start(Duration::ZERO, CancellationToken::new());
        sim.tick(ms(5000));
        sim.reset();
        assert_eq!(sim.status(), RunStatus::NotStarted);
        assert_eq!(sim.progress(), ConversionProgress::default());
    }
}
