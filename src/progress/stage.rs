//! Conversion stage table
//!
//! The stage list is fixed configuration: four stages, each with a nominal
//! duration and the cumulative percentage reached when it finishes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One phase of a simulated conversion, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionStage {
    ImageAnalysis,
    AiProcessing,
    MeshGeneration,
    Complete,
}

impl ConversionStage {
    pub const ALL: [ConversionStage; 4] = [
        ConversionStage::ImageAnalysis,
        ConversionStage::AiProcessing,
        ConversionStage::MeshGeneration,
        ConversionStage::Complete,
    ];

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            ConversionStage::ImageAnalysis => "image-analysis",
            ConversionStage::AiProcessing => "ai-processing",
            ConversionStage::MeshGeneration => "mesh-generation",
            ConversionStage::Complete => "complete",
        }
    }

    /// Label shown in the stage list
    pub fn label(&self) -> &'static str {
        match self {
            ConversionStage::ImageAnalysis => "Image Analysis",
            ConversionStage::AiProcessing => "AI Model Processing",
            ConversionStage::MeshGeneration => "Mesh Generation",
            ConversionStage::Complete => "Ready for Download",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Duration and cumulative target for one stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSpec {
    pub stage: ConversionStage,
    pub duration: Duration,
    /// Cumulative percentage when this stage finishes
    pub target_percent: f64,
}

/// The compiled-in stage sequence (2s, 8s, 5s, 1s)
pub const STAGE_TABLE: [StageSpec; 4] = [
    StageSpec {
        stage: ConversionStage::ImageAnalysis,
        duration: Duration::from_millis(2000),
        target_percent: 20.0,
    },
    StageSpec {
        stage: ConversionStage::AiProcessing,
        duration: Duration::from_millis(8000),
        target_percent: 70.0,
    },
    StageSpec {
        stage: ConversionStage::MeshGeneration,
        duration: Duration::from_millis(5000),
        target_percent: 95.0,
    },
    StageSpec {
        stage: ConversionStage::Complete,
        duration: Duration::from_millis(1000),
        target_percent: 100.0,
    },
];

pub fn stage_spec(stage: ConversionStage) -> &'static StageSpec {
    &STAGE_TABLE[stage.index()]
}

/// Scheduled start of a stage, relative to conversion start
pub fn stage_offset(index: usize) -> Duration {
    STAGE_TABLE[..index].iter().map(|s| s.duration).sum()
}

/// Percentage the stage starts from (the previous stage's target)
pub fn starting_percent(index: usize) -> f64 {
    match index {
        0 => 0.0,
        i => STAGE_TABLE[i - 1].target_percent,
    }
}

/// Sum of all stage durations
pub fn total_duration() -> Duration {
    STAGE_TABLE.iter().map(|s| s.duration).sum()
}

/// How a stage is drawn in the stage list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Pending,
    Active,
    Done,
}

/// Status of every stage relative to the current one
pub fn stage_statuses(current: ConversionStage) -> Vec<(ConversionStage, StageStatus)> {
    ConversionStage::ALL
        .iter()
        .map(|&stage| {
            let status = match stage.cmp(&current) {
                std::cmp::Ordering::Less => StageStatus::Done,
                std::cmp::Ordering::Equal => StageStatus::Active,
                std::cmp::Ordering::Greater => StageStatus::Pending,
            };
            (stage, status)
        })
        .collect()
}
