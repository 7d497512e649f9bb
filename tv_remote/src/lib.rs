//! # tv_remote
//!
//! Turns recognised hand gestures into TV key presses.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action | Key | Presses |
//! |---|---|---|---|
//! | `thumbs_up` | volume up | VolumeUp | 1 |
//! | `thumbs_down` | volume down | VolumeDown | 1 |
//! | `left_swipe` | seek back | ← | 5 |
//! | `right_swipe` | seek forward | → | 5 |
//! | `stop` | play / pause | Space | 1 |
//!
//! Commands are rate-limited: at most one per second per [`Dispatcher`].
//!
//! ## Feature flags
//!
//! * (default) - **Dry run**: presses are logged through `tracing`.
//! * `inject` - **OS mode**: presses are sent with `enigo`.

pub mod command;
pub mod inject;
pub mod dispatch;

pub use command::{Action, Command, CommandInfo, CommandMapping, UnknownAction, SEEK_REPEATS};
pub use inject::{open_injector, InjectError, KeyInjector, LogInjector};
#[cfg(feature = "inject")]
pub use inject::EnigoInjector;
pub use dispatch::{
    DispatchResult, DispatchTiming, Dispatcher, SharedDispatcher, SuppressReason, Timestamp,
    COMMAND_COOLDOWN, REPEAT_DELAY,
};
