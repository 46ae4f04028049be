//! Frame loop
//!
//! Ticks a converting session once per frame until the run leaves the
//! Converting state, either by completing or by being cancelled.

use std::thread;
use std::time::Duration;

use log::debug;

use super::orchestrator::Session;
use super::state::ConversionState;
use crate::progress::{RunStatus, TickReport};

pub struct FrameLoop {
    frame_interval: Duration,
}

impl FrameLoop {
    pub fn new(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Drive the session on the current thread
    ///
    /// `on_frame` sees every report and may act on the session (e.g. start
    /// over). Returns immediately with `NotStarted` if nothing is converting.
    pub fn run_blocking<F>(&self, session: &mut Session, mut on_frame: F) -> RunStatus
    where
        F: FnMut(&mut Session, &TickReport),
    {
        if session.state() != ConversionState::Converting {
            return RunStatus::NotStarted;
        }

        let mut frames = 0u64;
        loop {
            let report = session.tick();
            frames += 1;
            on_frame(session, &report);

            if session.state() != ConversionState::Converting {
                break;
            }
            if !self.frame_interval.is_zero() {
                thread::sleep(self.frame_interval);
            }
        }

        debug!("[FRAME-LOOP] Stopped after {} frames", frames);
        final_status(session)
    }

    /// Drive the session on a tokio runtime
    #[cfg(feature = "async-runtime")]
    pub async fn run_async<F>(&self, session: &mut Session, mut on_frame: F) -> RunStatus
    where
        F: FnMut(&mut Session, &TickReport),
    {
        if session.state() != ConversionState::Converting {
            return RunStatus::NotStarted;
        }

        let period = self.frame_interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let report = session.tick();
            on_frame(session, &report);
            if session.state() != ConversionState::Converting {
                break;
            }
        }

        final_status(session)
    }
}

fn final_status(session: &Session) -> RunStatus {
    match session.state() {
        ConversionState::Completed => RunStatus::Completed {
            conversion_time_secs: session.conversion_time_secs(),
        },
        _ => RunStatus::Cancelled,
    }
}
