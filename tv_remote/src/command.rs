//! Gesture → TV action table.

use std::fmt;
use std::str::FromStr;

use hand_pose::Gesture;
use serde::Serialize;

/// Key presses per seek gesture.  Players typically seek 2 s per arrow
/// press, so five presses skip roughly 10 s.
pub const SEEK_REPEATS: u32 = 5;

// ════════════════════════════════════════════════════════════════════════════
// Action
// ════════════════════════════════════════════════════════════════════════════

/// A playback control, realised as one key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    VolumeUp,
    VolumeDown,
    SeekBack,
    SeekForward,
    PlayPause,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::VolumeUp,
        Action::VolumeDown,
        Action::SeekBack,
        Action::SeekForward,
        Action::PlayPause,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::VolumeUp    => "volume-up",
            Action::VolumeDown  => "volume-down",
            Action::SeekBack    => "seek-back",
            Action::SeekForward => "seek-forward",
            Action::PlayPause   => "play-pause",
        }
    }

    /// The keyboard key the action is sent as.
    pub fn key_name(self) -> &'static str {
        match self {
            Action::VolumeUp    => "volumeup",
            Action::VolumeDown  => "volumedown",
            Action::SeekBack    => "left",
            Action::SeekForward => "right",
            Action::PlayPause   => "space",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown action `{0}` (expected one of volume-up, volume-down, seek-back, seek-forward, play-pause)")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Command / CommandMapping
// ════════════════════════════════════════════════════════════════════════════

/// What a gesture resolves to: an action and how many presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Command {
    pub action:  Action,
    pub repeats: u32,
}

/// One row of the command catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInfo {
    pub gesture:     Gesture,
    pub command:     Command,
    pub description: &'static str,
}

/// Fixed gesture → command table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandMapping {
    entries: Vec<(Gesture, Command)>,
}

impl Default for CommandMapping {
    fn default() -> Self { Self::standard() }
}

impl CommandMapping {
    /// Volume on the thumb, seek on the swipes, pause on the open palm.
    pub fn standard() -> Self {
        let cmd = |action, repeats| Command { action, repeats };
        CommandMapping {
            entries: vec![
                (Gesture::ThumbsUp,   cmd(Action::VolumeUp,    1)),
                (Gesture::ThumbsDown, cmd(Action::VolumeDown,  1)),
                (Gesture::LeftSwipe,  cmd(Action::SeekBack,    SEEK_REPEATS)),
                (Gesture::RightSwipe, cmd(Action::SeekForward, SEEK_REPEATS)),
                (Gesture::Stop,       cmd(Action::PlayPause,   1)),
            ],
        }
    }

    /// The same table with `gesture` unmapped.
    pub fn without(mut self, gesture: Gesture) -> Self {
        self.entries.retain(|(g, _)| *g != gesture);
        self
    }

    pub fn get(&self, gesture: Gesture) -> Option<Command> {
        self.entries
            .iter()
            .find(|(g, _)| *g == gesture)
            .map(|&(_, c)| c)
    }

    /// Every mapped gesture with a short human description.
    pub fn available_commands(&self) -> Vec<CommandInfo> {
        self.entries
            .iter()
            .map(|&(gesture, command)| CommandInfo {
                gesture,
                command,
                description: describe(command.action),
            })
            .collect()
    }
}

fn describe(action: Action) -> &'static str {
    match action {
        Action::VolumeUp    => "Increase volume",
        Action::VolumeDown  => "Decrease volume",
        Action::SeekBack    => "Rewind 10 seconds",
        Action::SeekForward => "Forward 10 seconds",
        Action::PlayPause   => "Pause/Play content",
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
