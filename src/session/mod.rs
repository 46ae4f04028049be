//! Conversion Session
//!
//! The page-level orchestrator:
//! - Lifecycle state machine (idle, uploading, converting, completed)
//! - Frame loop that drives a run to completion
//! - Panel visibility derived from state

mod frame_loop;
mod orchestrator;
mod state;

pub use frame_loop::FrameLoop;
pub use orchestrator::{IntakeOutcome, Session};
pub use state::{ConversionState, VisiblePanels};
