//! Fixed-threshold gesture classifier.
//!
//! Rules run in priority order and the first match wins:
//!
//! 1. **Thumb** - thumb tip vs. thumb IP joint.  A steep thumb pointing up
//!    or down past a small dead-band gives `thumbs_up` / `thumbs_down`.
//! 2. **Swipe** - horizontal offset of the index tip from its knuckle.
//! 3. **Stop** - index, middle, ring and pinky all extended upward.
//!
//! All comparisons are in image space, where `y` grows downward.  A tip
//! "above" its joint therefore has the *smaller* `y`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::landmark::{Hand, HandLandmark};

/// Minimum |dx| between index tip and index MCP for a swipe.
pub const SWIPE_THRESHOLD: f32 = 0.15;

/// Minimum |angle| (degrees) of the thumb tip→IP segment before the
/// thumb rule is considered at all.
pub const THUMB_ANGLE_THRESHOLD_DEG: f32 = 20.0;

/// Vertical dead-band for the thumb rule.
pub const THUMB_DEAD_BAND: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// A recognised gesture.  "No gesture" is `None` at the call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    ThumbsUp,
    ThumbsDown,
    LeftSwipe,
    RightSwipe,
    Stop,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::ThumbsUp,
        Gesture::ThumbsDown,
        Gesture::LeftSwipe,
        Gesture::RightSwipe,
        Gesture::Stop,
    ];

    /// Wire / directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::ThumbsUp   => "thumbs_up",
            Gesture::ThumbsDown => "thumbs_down",
            Gesture::LeftSwipe  => "left_swipe",
            Gesture::RightSwipe => "right_swipe",
            Gesture::Stop       => "stop",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown gesture `{0}`")]
pub struct UnknownGesture(pub String);

impl FromStr for Gesture {
    type Err = UnknownGesture;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownGesture(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify one complete hand.  Pure: same hand, same answer.
pub fn classify(hand: &Hand) -> Option<Gesture> {
    thumb_gesture(hand)
        .or_else(|| swipe_gesture(hand))
        .or_else(|| is_stop(hand).then_some(Gesture::Stop))
}

/// Angle in degrees of the vector from thumb tip to thumb IP joint,
/// in `(-180, 180]`.
pub fn thumb_angle_deg(hand: &Hand) -> f32 {
    let tip = hand[HandLandmark::ThumbTip];
    let ip  = hand[HandLandmark::ThumbIp];
    (ip.y - tip.y).atan2(ip.x - tip.x).to_degrees()
}

fn thumb_gesture(hand: &Hand) -> Option<Gesture> {
    if thumb_angle_deg(hand).abs() <= THUMB_ANGLE_THRESHOLD_DEG {
        return None;
    }
    let dy = hand[HandLandmark::ThumbTip].y - hand[HandLandmark::ThumbIp].y;
    if dy < -THUMB_DEAD_BAND {
        Some(Gesture::ThumbsUp)
    } else if dy > THUMB_DEAD_BAND {
        Some(Gesture::ThumbsDown)
    } else {
        // Steep but inside the dead-band: no thumb verdict, later rules decide.
        None
    }
}

fn swipe_gesture(hand: &Hand) -> Option<Gesture> {
    let dx = hand[HandLandmark::IndexTip].x - hand[HandLandmark::IndexMcp].x;
    if dx.abs() <= SWIPE_THRESHOLD {
        None
    } else if dx < 0.0 {
        Some(Gesture::LeftSwipe)
    } else {
        Some(Gesture::RightSwipe)
    }
}

const FINGERS: [(HandLandmark, HandLandmark); 4] = [
    (HandLandmark::IndexTip,  HandLandmark::IndexMcp),
    (HandLandmark::MiddleTip, HandLandmark::MiddleMcp),
    (HandLandmark::RingTip,   HandLandmark::RingMcp),
    (HandLandmark::PinkyTip,  HandLandmark::PinkyMcp),
];

/// True when every non-thumb finger has its tip above its knuckle.
pub fn is_stop(hand: &Hand) -> bool {
    FINGERS.iter().all(|&(tip, mcp)| hand[tip].y < hand[mcp].y)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
