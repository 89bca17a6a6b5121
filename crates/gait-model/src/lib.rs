//! Stridelab Gait Model
//!
//! Defines the data contracts shared by the analysis crates:
//! - **Records:** Time-stamped sensor rows (footpod steps, IMU samples,
//!   phone activity, music playstate, sessions)
//! - **Bouts:** Maximal contiguous time runs sharing one validity state
//! - **Gait:** Contact events, gait cycles, merged left/right steps and
//!   symmetry results
//!
//! All timestamps are signed nanoseconds. Every sequence handed to the
//! analysis crates is expected to be sorted ascending by time.

pub mod bout;
pub mod error;
pub mod gait;
pub mod record;

pub use bout::*;
pub use error::*;
pub use gait::*;
pub use record::*;
