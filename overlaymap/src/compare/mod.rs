//! Side-by-side comparison of two layers.
//!
//! A [`ComparisonState`] names layers A and B and one of four modes:
//!
//! ```text
//! Single     A only
//! Swipe      A │ B          A in [0, x), B in [x, width), x = position% × width
//! Spyglass   A ( B ) A      B inside a circle around the last pointer position
//! Blink      A ⇄ B          alternates on a fixed period while playing
//! ```
//!
//! Switching mode resets that mode's parameters. [`CompareRenderer`] turns
//! a state into a frame, and [`CompareController`] pairs the state with a
//! [`BlinkTimer`] for blink playback.

mod blink;
mod controller;
mod error;
mod render;
mod state;

pub use blink::{BlinkTimer, MIN_BLINK_INTERVAL};
pub use controller::CompareController;
pub use error::CompareError;
pub use render::{in_spyglass, swipe_column, CompareRenderer};
pub use state::{
    CompareDefaults, ComparisonMode, ComparisonState, ModeParams, DEFAULT_BLINK_INTERVAL,
    DEFAULT_SPYGLASS_RADIUS, DEFAULT_SWIPE_POSITION,
};
