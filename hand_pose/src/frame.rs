//! Landmark frames as delivered by an external hand tracker.
//!
//! One JSON object per line:
//!
//! ```text
//! {"timestamp": 12.5, "hands": [[{"x":0.51,"y":0.32,"z":-0.01}, …21 points…]]}
//! ```
//!
//! Only the first hand is ever looked at.  A frame with no hands, or whose
//! first hand is incomplete, classifies as "no gesture".

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::classifier::{classify, Gesture};
use crate::landmark::{Hand, HandError, Landmark};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Hand(#[from] HandError),
}

/// Raw per-frame tracker output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time in seconds, if the tracker supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Raw landmark lists, one per detected hand.
    #[serde(default)]
    pub hands: Vec<Vec<Landmark>>,
}

impl Frame {
    pub fn parse_line(line: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// A frame carrying exactly one hand.
    pub fn single(hand: &Hand, timestamp: Option<f64>) -> Self {
        Frame {
            timestamp,
            hands: vec![hand.landmarks().to_vec()],
        }
    }

    /// The first detected hand, validated.
    ///
    /// `Ok(None)` when the tracker saw nothing.
    pub fn first_hand(&self) -> Result<Option<Hand>, HandError> {
        self.hands
            .first()
            .map(|pts| Hand::from_landmarks(pts))
            .transpose()
    }

    /// Classify this frame's first hand.
    ///
    /// Incomplete hands are logged and treated as no gesture.
    pub fn gesture(&self) -> Option<Gesture> {
        match self.first_hand() {
            Ok(Some(hand)) => classify(&hand),
            Ok(None) => {
                debug!("no hand in frame");
                None
            }
            Err(e) => {
                warn!("skipping hand: {e}");
                None
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::HandLandmark;

    fn thumbs_up_hand() -> Hand {
        Hand::from_fn(|_| Landmark::new(0.5, 0.5))
            .with(HandLandmark::ThumbTip, 0.5, 0.30)
            .with(HandLandmark::ThumbIp,  0.5, 0.45)
    }

    #[test]
    fn empty_frame_has_no_gesture() {
        let f = Frame::parse_line(r#"{"hands": []}"#).unwrap();
        assert_eq!(f.first_hand(), Ok(None));
        assert_eq!(f.gesture(), None);
    }

    #[test]
    fn missing_hands_field_is_empty() {
        let f = Frame::parse_line(r#"{"timestamp": 3.25}"#).unwrap();
        assert_eq!(f.timestamp, Some(3.25));
        assert!(f.hands.is_empty());
    }

    #[test]
    fn short_hand_has_no_gesture() {
        let f = Frame { timestamp: None, hands: vec![vec![Landmark::new(0.5, 0.3); 5]] };
        assert_eq!(f.first_hand(), Err(HandError::LandmarkCount(5)));
        assert_eq!(f.gesture(), None);
    }

    #[test]
    fn only_first_hand_counts() {
        let mut f = Frame::single(&thumbs_up_hand(), Some(1.0));
        f.hands.push(vec![Landmark::default(); 3]);
        assert_eq!(f.gesture(), Some(Gesture::ThumbsUp));
    }

    #[test]
    fn line_round_trips_through_json() {
        let f = Frame::single(&thumbs_up_hand(), Some(0.5));
        let line = serde_json::to_string(&f).unwrap();
        let back = Frame::parse_line(&line).unwrap();
        assert_eq!(back.gesture(), Some(Gesture::ThumbsUp));
        assert_eq!(back.timestamp, Some(0.5));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(Frame::parse_line("not json"), Err(FrameError::Json(_))));
    }
}
