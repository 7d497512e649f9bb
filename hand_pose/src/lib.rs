//! # hand_pose
//!
//! Single-hand landmark model and the fixed-threshold gesture classifier
//! that drives the TV remote.
//!
//! Landmark extraction itself (camera, image decoding, model inference) is
//! somebody else's job; this crate starts from 21 normalized points.
//!
//! ## Gestures
//!
//! | Gesture | Pose | Checked |
//! |---|---|---|
//! | `thumbs_up` | thumb steep, tip above IP joint | 1st |
//! | `thumbs_down` | thumb steep, tip below IP joint | 1st |
//! | `left_swipe` | index tip > 0.15 left of its knuckle | 2nd |
//! | `right_swipe` | index tip > 0.15 right of its knuckle | 2nd |
//! | `stop` | all four fingers extended upward | 3rd |
//!
//! ```rust
//! use hand_pose::{classify, Gesture, Hand, HandLandmark, Landmark};
//!
//! let hand = Hand::from_fn(|_| Landmark::new(0.5, 0.5))
//!     .with(HandLandmark::ThumbTip, 0.5, 0.30)
//!     .with(HandLandmark::ThumbIp,  0.5, 0.45);
//! assert_eq!(classify(&hand), Some(Gesture::ThumbsUp));
//! ```

pub mod landmark;
pub mod classifier;
pub mod frame;

pub use landmark::{Hand, HandError, HandLandmark, Landmark, LANDMARK_COUNT};
pub use classifier::{
    classify, is_stop, thumb_angle_deg, Gesture, UnknownGesture,
    SWIPE_THRESHOLD, THUMB_ANGLE_THRESHOLD_DEG, THUMB_DEAD_BAND,
};
pub use frame::{Frame, FrameError};
