//! # gesture_tv
//!
//! Hand-gesture TV remote.  Landmark frames from an external hand tracker
//! are classified one at a time and turned into playback key presses.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action | Presses |
//! |---|---|---|
//! | Thumbs up | Volume up | 1 |
//! | Thumbs down | Volume down | 1 |
//! | Swipe left (index points left) | Rewind (← key) | 5 |
//! | Swipe right (index points right) | Forward (→ key) | 5 |
//! | Open palm | Play / pause (Space) | 1 |
//!
//! At most one command per second is executed; anything in between is
//! reported as suppressed.
//!
//! ## Frame sources
//!
//! * stdin / file - JSON lines from a tracker (see [`hand_pose::Frame`]).
//! * simulation - keys produce canonical poses; from stdin, or from the
//!   preview window with the `preview` feature.
//!
//! ### Simulation keys
//!
//! | Key | Pose |
//! |---|---|
//! | `U` | Thumbs up |
//! | `D` | Thumbs down |
//! | `L` / `←` | Swipe left |
//! | `R` / `→` | Swipe right |
//! | `S` / `Space` | Open palm |
//! | `N` | Resting hand |
//! | `Q` | Quit |
//!
//! ## Feature flags
//!
//! * `inject` - send real key events (otherwise presses are only logged).
//! * `preview` - `minifb` window showing the tracked skeleton.

pub mod source;
pub mod samples;
#[cfg(feature = "preview")]
pub mod preview;
pub mod app;
