//! Async tasks for the dashboard firmware.
//!
//! - `poll`: Fetch, validate and draw every poll period

pub mod poll;

pub use poll::{BACKLIGHT_SCHEDULED, poll_task};
