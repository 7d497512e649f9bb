//! Frame sources - a hand tracker's JSON output, or keyboard simulation.
//!
//! Every source runs on its own thread and delivers [`SourceEvent`]s over a
//! `mpsc` channel, so the processing loop does not care whether frames came
//! from a real tracker or from the simulator.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use hand_pose::{Frame, Hand, HandLandmark, Landmark};
use tracing::{debug, warn};

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent / FrameSource
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Frame(Frame),
    /// The source is exhausted or the user asked to quit.
    Quit,
}

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource - tracker output, one frame per line
// ════════════════════════════════════════════════════════════════════════════

pub struct JsonLinesSource<R> {
    reader: R,
}

impl<R: BufRead + Send + 'static> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource { reader }
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(JsonLinesSource::new(BufReader::new(File::open(path)?)))
    }
}

impl JsonLinesSource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        JsonLinesSource::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send + 'static> FrameSource for JsonLinesSource<R> {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        for (n, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("frame input closed: {e}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            // A bad line still counts as a frame, just an empty one.
            let frame = Frame::parse_line(&line).unwrap_or_else(|e| {
                warn!("line {}: {e}", n + 1);
                Frame::default()
            });
            if tx.send(SourceEvent::Frame(frame)).is_err() {
                return;
            }
        }
        debug!("frame input exhausted");
        let _ = tx.send(SourceEvent::Quit);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource - keyboard simulation
// ════════════════════════════════════════════════════════════════════════════

/// Simulated poses, one key each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ThumbsUp,    // U
    ThumbsDown,  // D
    SwipeLeft,   // L / ←
    SwipeRight,  // R / →
    OpenPalm,    // S / Space
    Rest,        // N
    Quit,        // Q
}

impl SimKey {
    pub fn from_char(c: char) -> Option<SimKey> {
        match c.to_ascii_lowercase() {
            'u' => Some(SimKey::ThumbsUp),
            'd' => Some(SimKey::ThumbsDown),
            'l' => Some(SimKey::SwipeLeft),
            'r' => Some(SimKey::SwipeRight),
            's' | ' ' => Some(SimKey::OpenPalm),
            'n' => Some(SimKey::Rest),
            'q' => Some(SimKey::Quit),
            _ => None,
        }
    }
}

/// Turns [`SimKey`]s into single-hand frames.
pub struct SimFrameSource {
    pub rx: Receiver<SimKey>,
}

impl FrameSource for SimFrameSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        for key in self.rx {
            let event = match key {
                SimKey::Quit => {
                    let _ = tx.send(SourceEvent::Quit);
                    return;
                }
                k => SourceEvent::Frame(Frame::single(&sim_hand(k), None)),
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        let _ = tx.send(SourceEvent::Quit);
    }
}

/// Read simulation keys from stdin, one or more per line.
pub fn spawn_stdin_keys(tx: Sender<SimKey>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for key in line.chars().filter_map(SimKey::from_char) {
                if tx.send(key).is_err() || key == SimKey::Quit {
                    return;
                }
            }
        }
        let _ = tx.send(SimKey::Quit);
    });
}

// ── synthetic poses ───────────────────────────────────────────────────────

/// Right hand, palm to camera, fingers loosely curled, thumb resting flat.
/// Classifies as no gesture.
pub fn rest_hand() -> Hand {
    use HandLandmark::*;
    let p = |x, y| Landmark::new(x, y);
    Hand::from_fn(|lm| match lm {
        Wrist     => p(0.50, 0.80),
        ThumbCmc  => p(0.44, 0.74),
        ThumbMcp  => p(0.40, 0.68),
        ThumbIp   => p(0.37, 0.63),
        ThumbTip  => p(0.33, 0.62),
        IndexMcp  => p(0.44, 0.58),
        IndexPip  => p(0.44, 0.52),
        IndexDip  => p(0.45, 0.56),
        IndexTip  => p(0.46, 0.60),
        MiddleMcp => p(0.50, 0.57),
        MiddlePip => p(0.50, 0.51),
        MiddleDip => p(0.51, 0.55),
        MiddleTip => p(0.51, 0.59),
        RingMcp   => p(0.55, 0.58),
        RingPip   => p(0.55, 0.53),
        RingDip   => p(0.55, 0.57),
        RingTip   => p(0.55, 0.60),
        PinkyMcp  => p(0.59, 0.61),
        PinkyPip  => p(0.60, 0.57),
        PinkyDip  => p(0.60, 0.60),
        PinkyTip  => p(0.60, 0.63),
    })
}

/// The canonical pose for a simulation key.
pub fn sim_hand(key: SimKey) -> Hand {
    use HandLandmark::*;
    let rest = rest_hand();
    match key {
        SimKey::ThumbsUp => rest
            .with(ThumbMcp, 0.41, 0.64)
            .with(ThumbIp,  0.40, 0.55)
            .with(ThumbTip, 0.40, 0.45),
        SimKey::ThumbsDown => rest
            .with(ThumbMcp, 0.41, 0.74)
            .with(ThumbIp,  0.40, 0.80)
            .with(ThumbTip, 0.40, 0.90),
        SimKey::SwipeLeft => rest
            .with(IndexPip, 0.38, 0.58)
            .with(IndexDip, 0.32, 0.58)
            .with(IndexTip, 0.26, 0.58),
        SimKey::SwipeRight => rest
            .with(IndexPip, 0.51, 0.58)
            .with(IndexDip, 0.58, 0.58)
            .with(IndexTip, 0.64, 0.58),
        SimKey::OpenPalm => rest
            .with(ThumbIp,   0.36, 0.62)
            .with(ThumbTip,  0.30, 0.61)
            .with(IndexPip,  0.43, 0.46)
            .with(IndexDip,  0.43, 0.40)
            .with(IndexTip,  0.43, 0.35)
            .with(MiddlePip, 0.50, 0.44)
            .with(MiddleDip, 0.50, 0.38)
            .with(MiddleTip, 0.50, 0.32)
            .with(RingPip,   0.56, 0.46)
            .with(RingDip,   0.56, 0.40)
            .with(RingTip,   0.56, 0.35)
            .with(PinkyPip,  0.61, 0.52)
            .with(PinkyDip,  0.61, 0.47)
            .with(PinkyTip,  0.61, 0.42),
        SimKey::Rest | SimKey::Quit => rest,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
