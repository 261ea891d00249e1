//! Provides functions to set up and update a progress bar over simulated days.
//!
//! The bar has a maximum of `days` and is advanced once per completed day. It is drawn on the
//! terminal's current line, so while it is active log lines are prefixed with an escape code
//! that clears that line first (see [`crate::log::clear_progress_line`]).
//!
//! ```ignore
//! init_day_progress_bar(30);
//! for day in 1..=30 {
//!     // ... advance the simulation ...
//!     update_day_progress(day);
//! }
//! ```
//!
//! Without the `progress_bar` feature these functions do nothing.

#[cfg(feature = "progress_bar")]
use crate::log::trace;
#[cfg(feature = "progress_bar")]
use progress_bar::{
    finalize_progress_bar, init_progress_bar, set_progress_bar_action, set_progress_bar_progress,
    Color, Style,
};
#[cfg(feature = "progress_bar")]
use std::sync::OnceLock;

/// The number of days the active progress bar finishes at.
#[cfg(feature = "progress_bar")]
static MAX_DAY: OnceLock<usize> = OnceLock::new();

/// Initialize the progress bar with the number of days to simulate. Only the first call in a
/// process has an effect.
#[cfg(feature = "progress_bar")]
pub fn init_day_progress_bar(days: usize) {
    if MAX_DAY.set(days).is_err() {
        trace!("day progress bar already initialized");
        return;
    }
    trace!("initializing day progress bar with {} days", days);
    crate::log::clear_progress_line(true);
    init_progress_bar(days);
    set_progress_bar_action("Day", Color::Blue, Style::Bold);
    if days == 0 {
        finish_day_progress();
    }
}

/// Updates the progress bar with the last completed day and finalizes it on the last day.
#[cfg(feature = "progress_bar")]
pub fn update_day_progress(day: usize) {
    // A zero-day bar was finalized at initialization.
    if let Some(&max_day) = MAX_DAY.get().filter(|&&max_day| max_day > 0) {
        let day = day.min(max_day);
        set_progress_bar_progress(day);
        if day == max_day {
            finish_day_progress();
        }
    }
}

#[cfg(feature = "progress_bar")]
fn finish_day_progress() {
    finalize_progress_bar();
    crate::log::clear_progress_line(false);
}

#[cfg(not(feature = "progress_bar"))]
pub fn init_day_progress_bar(_days: usize) {}

#[cfg(not(feature = "progress_bar"))]
pub fn update_day_progress(_day: usize) {}
