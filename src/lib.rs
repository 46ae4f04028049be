//! Depthforge - Headless Image-to-3D Conversion Session
//!
//! Depthforge models the lifecycle of turning a 2D image into a 3D model:
//! 1. File intake - validate and accept a single image
//! 2. Simulated conversion - a timed, four-stage progress run
//! 3. Model viewer - placeholder scene, orbit camera and downloads
//!
//! # Architecture
//!
//! A `Session` owns all state for one conversion and is driven by a
//! `FrameLoop` reading a single `Clock`. The reconstruction step itself sits
//! behind the `ReconstructionBackend` trait; only a placeholder ships.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod notify;
pub mod preview;
pub mod progress;
pub mod session;
pub mod viewer;

pub use config::ForgeConfig;
pub use error::{ForgeError, Result};
pub use session::{ConversionState, FrameLoop, Session};
