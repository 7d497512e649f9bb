//! Landmarks and the fixed 21-point hand layout.
//!
//! Indices follow the common 21-keypoint hand model used by camera-based
//! trackers: wrist at 0, then four joints per digit from base to tip.
//! Coordinates are normalized to the frame, with `y` growing **downward**.

use std::ops::Index;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmarks in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point, normalized to `[0, 1]` of the frame width/height.
///
/// `z` is relative depth; carried through but never used for classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmark - anatomical index
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist       = 0,
    ThumbCmc    = 1,
    ThumbMcp    = 2,
    ThumbIp     = 3,
    ThumbTip    = 4,
    IndexMcp    = 5,
    IndexPip    = 6,
    IndexDip    = 7,
    IndexTip    = 8,
    MiddleMcp   = 9,
    MiddlePip   = 10,
    MiddleDip   = 11,
    MiddleTip   = 12,
    RingMcp     = 13,
    RingPip     = 14,
    RingDip     = 15,
    RingTip     = 16,
    PinkyMcp    = 17,
    PinkyPip    = 18,
    PinkyDip    = 19,
    PinkyTip    = 20,
}

impl HandLandmark {
    /// All landmarks in array order.
    pub const ALL: [HandLandmark; LANDMARK_COUNT] = [
        HandLandmark::Wrist,
        HandLandmark::ThumbCmc,  HandLandmark::ThumbMcp,  HandLandmark::ThumbIp,   HandLandmark::ThumbTip,
        HandLandmark::IndexMcp,  HandLandmark::IndexPip,  HandLandmark::IndexDip,  HandLandmark::IndexTip,
        HandLandmark::MiddleMcp, HandLandmark::MiddlePip, HandLandmark::MiddleDip, HandLandmark::MiddleTip,
        HandLandmark::RingMcp,   HandLandmark::RingPip,   HandLandmark::RingDip,   HandLandmark::RingTip,
        HandLandmark::PinkyMcp,  HandLandmark::PinkyPip,  HandLandmark::PinkyDip,  HandLandmark::PinkyTip,
    ];

    /// Bones as (parent, child) pairs, for drawing a skeleton.
    pub const BONES: [(HandLandmark, HandLandmark); 21] = {
        use HandLandmark::*;
        [
            (Wrist, ThumbCmc),   (ThumbCmc, ThumbMcp),   (ThumbMcp, ThumbIp),   (ThumbIp, ThumbTip),
            (Wrist, IndexMcp),   (IndexMcp, IndexPip),   (IndexPip, IndexDip),  (IndexDip, IndexTip),
            (Wrist, MiddleMcp),  (MiddleMcp, MiddlePip), (MiddlePip, MiddleDip), (MiddleDip, MiddleTip),
            (Wrist, RingMcp),    (RingMcp, RingPip),     (RingPip, RingDip),    (RingDip, RingTip),
            (Wrist, PinkyMcp),   (PinkyMcp, PinkyPip),   (PinkyPip, PinkyDip),  (PinkyDip, PinkyTip),
            (IndexMcp, MiddleMcp),
        ]
    };

    pub fn index(self) -> usize { self as usize }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandError {
    #[error("expected {LANDMARK_COUNT} landmarks, got {0}")]
    LandmarkCount(usize),
}

/// A complete single hand for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct Hand {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Hand { landmarks }
    }

    /// Build a hand from an estimator's landmark list.
    ///
    /// Anything other than exactly 21 points is rejected.
    pub fn from_landmarks(points: &[Landmark]) -> Result<Self, HandError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| HandError::LandmarkCount(points.len()))?;
        Ok(Hand { landmarks })
    }

    /// Build a hand by evaluating `f` for every anatomical point.
    pub fn from_fn(mut f: impl FnMut(HandLandmark) -> Landmark) -> Self {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for lm in HandLandmark::ALL {
            landmarks[lm.index()] = f(lm);
        }
        Hand { landmarks }
    }

    /// Return a copy with one point moved.
    pub fn with(mut self, lm: HandLandmark, x: f32, y: f32) -> Self {
        self.landmarks[lm.index()] = Landmark::new(x, y);
        self
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }
}

impl Index<HandLandmark> for Hand {
    type Output = Landmark;
    fn index(&self, lm: HandLandmark) -> &Landmark {
        &self.landmarks[lm.index()]
    }
}

impl TryFrom<Vec<Landmark>> for Hand {
    type Error = HandError;
    fn try_from(points: Vec<Landmark>) -> Result<Self, HandError> {
        Hand::from_landmarks(&points)
    }
}

impl From<Hand> for Vec<Landmark> {
    fn from(hand: Hand) -> Self {
        hand.landmarks.to_vec()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, lm) in HandLandmark::ALL.iter().enumerate() {
            assert_eq!(lm.index(), i);
        }
    }

    #[test]
    fn from_landmarks_rejects_short_hand() {
        let pts = vec![Landmark::default(); 20];
        assert_eq!(Hand::from_landmarks(&pts), Err(HandError::LandmarkCount(20)));
    }

    #[test]
    fn from_landmarks_rejects_long_hand() {
        let pts = vec![Landmark::default(); 22];
        assert_eq!(Hand::from_landmarks(&pts), Err(HandError::LandmarkCount(22)));
    }

    #[test]
    fn index_by_anatomical_name() {
        let hand = Hand::from_fn(|lm| Landmark::new(lm.index() as f32 / 100.0, 0.5));
        assert_eq!(hand[HandLandmark::ThumbTip].x, 0.04);
        assert_eq!(hand[HandLandmark::PinkyTip].x, 0.20);
    }

    #[test]
    fn with_moves_one_point() {
        let hand = Hand::from_fn(|_| Landmark::new(0.5, 0.5))
            .with(HandLandmark::IndexTip, 0.1, 0.2);
        assert_eq!(hand[HandLandmark::IndexTip], Landmark::new(0.1, 0.2));
        assert_eq!(hand[HandLandmark::IndexMcp], Landmark::new(0.5, 0.5));
    }

    #[test]
    fn depth_defaults_when_missing() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(lm, Landmark::new(0.25, 0.75));
    }

    #[test]
    fn hand_deserializes_from_list() {
        let json = serde_json::to_string(&vec![Landmark::new(0.1, 0.2); 21]).unwrap();
        let hand: Hand = serde_json::from_str(&json).unwrap();
        assert_eq!(hand[HandLandmark::Wrist], Landmark::new(0.1, 0.2));

        let short = serde_json::to_string(&vec![Landmark::new(0.1, 0.2); 3]).unwrap();
        assert!(serde_json::from_str::<Hand>(&short).is_err());
    }
}
