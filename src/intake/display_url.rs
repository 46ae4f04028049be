//! Session-scoped display URLs
//!
//! A display URL lets the preview render an uploaded image without touching
//! its bytes again. Every URL handed out must be released on removal or
//! restart; the registry tracks which ones are still live.

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const URL_SCHEME_PREFIX: &str = "blob:depthforge/";

/// Opaque handle to a rendered image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayUrl(String);

impl DisplayUrl {
    fn generate() -> Self {
        DisplayUrl(format!("{}{}", URL_SCHEME_PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracks live display URLs for one session
#[derive(Debug, Default)]
pub struct DisplayUrlRegistry {
    live: HashSet<DisplayUrl>,
    issued: u64,
    released: u64,
}

impl DisplayUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh URL
    pub fn acquire(&mut self) -> DisplayUrl {
        let url = DisplayUrl::generate();
        self.live.insert(url.clone());
        self.issued += 1;
        debug!("[DISPLAY-URL] Acquired {}", url);
        url
    }

    /// Release a URL. Returns false if it was not live.
    pub fn release(&mut self, url: &DisplayUrl) -> bool {
        if self.live.remove(url) {
            self.released += 1;
            debug!("[DISPLAY-URL] Released {}", url);
            true
        } else {
            warn!("[DISPLAY-URL] Release of unknown or already released {}", url);
            false
        }
    }

    pub fn is_live(&self, url: &DisplayUrl) -> bool {
        self.live.contains(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn issued_count(&self) -> u64 {
        self.issued
    }

    pub fn released_count(&self) -> u64 {
        self.released
    }
}
