//! Progress simulation
//!
//! This module provides:
//! - The fixed conversion stage table
//! - `Clock` implementations (system, scaled, manual)
//! - `CancellationToken` for stopping an in-flight run
//! - `ProgressSimulator`, the clock-driven stage sequencer

mod cancel;
mod clock;
mod simulator;
mod stage;

pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, ScaledClock, SystemClock};
pub use simulator::{
    AdvanceMode, ConversionProgress, ProgressSimulator, RunStatus, StageEvent, TickReport,
    INITIAL_ESTIMATE_SECS,
};
pub use stage::{
    stage_offset, stage_spec, stage_statuses, starting_percent, total_duration, ConversionStage,
    StageSpec, StageStatus, STAGE_TABLE,
};
