//! Stridelab Processing Core
//!
//! Gait analysis over complete, time-sorted sensor series:
//! - **Bouts:** segment a series into maximal runs sharing a validity state
//!   and apply bout windows to other series
//! - **Temporal joins:** nearest-time matching within a tolerance
//! - **Gait events:** contact detection and gait-cycle timing from vertical
//!   acceleration
//! - **Symmetry:** left/right pairing, algebraic symmetry indices and the
//!   autocorrelation gait symmetry index
//! - **Filters:** activity, elevation, session and music context
//!
//! This crate is pure computation with no I/O. All inputs are data; all outputs
//! are data. Diagnostics go through `tracing`; installing a subscriber is up
//! to the caller.

pub mod asof;
pub mod bout_window;
pub mod bouts;
pub mod gait_events;
pub mod gsi;
pub mod lowpass;
pub mod merge;
pub mod music;
pub mod peaks;
pub mod pipeline;
pub mod quality_filters;
pub mod range;
pub mod stats;
pub mod symmetry;

pub use asof::{JoinDirection, TemporalJoiner};
pub use bout_window::{
    annotate_bouts_with, annotate_constant, annotate_index, annotate_key, annotate_valid,
    interpolate_bouts, pad_bouts, BoutPadding,
};
pub use bouts::{extract_bouts, extract_bouts_by};
pub use gait_events::{GaitDetection, GaitDetectorConfig, GaitEventDetector};
pub use gsi::{BoutGsi, GsiConfig, GsiEstimate, GsiEstimator};
pub use merge::LeftRightMerger;
pub use music::{merge_music_playstate, music_sections, MusicAnnotation};
pub use pipeline::{GsiSummary, RunContext, RunFilter, RunKey, RunStep, RunSummary};
pub use quality_filters::{ActivityFilter, ElevationFilter, SessionQuality};
pub use range::{select_range, select_ranges, TimeRange};
pub use stats::FeatureSummary;
pub use symmetry::SymmetryCalculator;
