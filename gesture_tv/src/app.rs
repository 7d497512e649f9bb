//! Top-level application loop.
//!
//! `AppState` owns the `Dispatcher` and the optional `SampleStore`.  It takes
//! one landmark `Frame` at a time, classifies the first hand, dispatches the
//! gesture, and answers with a `FrameReport` (one JSON line on stdout).

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use hand_pose::{classify, Frame, Gesture, Hand};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use tv_remote::{
    open_injector, Action, CommandMapping, DispatchResult, DispatchTiming, Dispatcher,
    KeyInjector, Timestamp,
};

use crate::samples::{SampleError, SampleStore};
use crate::source::{
    spawn_frame_source, spawn_stdin_keys, JsonLinesSource, SimFrameSource, SourceEvent,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Samples(#[from] SampleError),
    #[error("report encoding: {0}")]
    Json(#[from] serde_json::Error),
    #[error("preview window: {0}")]
    Preview(String),
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Tracker JSON lines on stdin.
    Stdin,
    /// Tracker JSON lines from a file.
    File(PathBuf),
    /// Keyboard simulation.
    Sim,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub source:      SourceKind,
    /// Log key presses instead of sending them.
    pub dry_run:     bool,
    /// Save every hand that produced a gesture under this directory.
    pub capture_dir: Option<PathBuf>,
    /// Write a `FrameReport` line per frame to stdout.
    pub reports:     bool,
    /// Open the preview window (simulation mode, `preview` feature).
    pub preview:     bool,
    pub timing:      DispatchTiming,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source:      SourceKind::Stdin,
            dry_run:     false,
            capture_dir: None,
            reports:     true,
            preview:     false,
            timing:      DispatchTiming::default(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameReport
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Success,
    NoGestureDetected,
}

/// What the dispatcher did with a frame's gesture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandReport {
    Executed   { action: Action, repeats: u32 },
    Suppressed { reason: &'static str },
    Failed     { message: String },
}

impl From<&DispatchResult> for CommandReport {
    fn from(r: &DispatchResult) -> Self {
        match r {
            DispatchResult::Executed { action, repeats } => {
                CommandReport::Executed { action: *action, repeats: *repeats }
            }
            DispatchResult::Suppressed(reason) => CommandReport::Suppressed { reason: reason.as_str() },
            DispatchResult::Failed(e) => CommandReport::Failed { message: e.to_string() },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub gesture: Option<Gesture>,
    pub status:  FrameStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandReport>,
}

// ════════════════════════════════════════════════════════════════════════════
// SessionStats
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames:     u64,
    pub no_gesture: u64,
    /// Indexed like `Gesture::ALL`.
    pub gestures:   [u64; 5],
    pub executed:   u64,
    pub suppressed: u64,
    pub failed:     u64,
}

impl SessionStats {
    fn record(&mut self, gesture: Option<Gesture>, result: Option<&DispatchResult>) {
        self.frames += 1;
        match gesture {
            Some(g) => self.gestures[g as usize] += 1,
            None => self.no_gesture += 1,
        }
        match result {
            Some(DispatchResult::Executed { .. }) => self.executed += 1,
            Some(DispatchResult::Suppressed(_))   => self.suppressed += 1,
            Some(DispatchResult::Failed(_))       => self.failed += 1,
            None => {}
        }
    }

    pub fn summary(&self) -> String {
        let per_gesture: Vec<String> = Gesture::ALL
            .iter()
            .zip(self.gestures.iter())
            .map(|(g, n)| format!("{g}={n}"))
            .collect();
        format!(
            "{} frames ({} none, {})  commands: {} executed, {} suppressed, {} failed",
            self.frames, self.no_gesture, per_gesture.join(" "),
            self.executed, self.suppressed, self.failed
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<I: KeyInjector> {
    dispatcher: Dispatcher<I>,
    samples:    Option<SampleStore>,
    started:    Instant,
    /// Session clock minus tracker clock, fixed by the first usable timestamp.
    tracker_offset: Option<f64>,
    stats:      SessionStats,

    // ── last frame, for the preview ──────────────────────────────────────
    last_hand:    Option<Hand>,
    last_gesture: Option<Gesture>,
    pub status:   String,
}

impl<I: KeyInjector> AppState<I> {
    pub fn new(cfg: &AppConfig, injector: I) -> Result<Self, AppError> {
        let samples = cfg.capture_dir.as_ref().map(SampleStore::open).transpose()?;
        if let Some(s) = &samples {
            info!("capturing gesture samples under {}", s.root().display());
        }
        Ok(AppState {
            dispatcher:   Dispatcher::with_config(injector, CommandMapping::standard(), cfg.timing),
            samples,
            started:      Instant::now(),
            tracker_offset: None,
            stats:        SessionStats::default(),
            last_hand:    None,
            last_gesture: None,
            status:       "Waiting for frames".to_string(),
        })
    }

    /// Frame time on the session clock.
    ///
    /// Tracker timestamps are shifted onto the session clock by an offset
    /// taken from the first usable one, so frames with and without a
    /// timestamp can be mixed in one session.  Timestamps that are negative,
    /// not finite or too large for a `Duration` are ignored.
    fn frame_time(&mut self, frame: &Frame) -> Timestamp {
        let session = self.started.elapsed();
        let Some(t) = frame.timestamp else { return session };

        if Duration::try_from_secs_f64(t).is_err() {
            warn!(timestamp = t, "unusable frame timestamp, using the session clock");
            return session;
        }
        let offset = *self.tracker_offset.get_or_insert(session.as_secs_f64() - t);
        // A tracker clock that runs backwards pins at the session origin.
        Duration::try_from_secs_f64((t + offset).max(0.0)).unwrap_or(session)
    }

    // ── process one Frame ────────────────────────────────────────────────

    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        let now = self.frame_time(frame);

        let hand = frame.first_hand().unwrap_or_else(|e| {
            warn!("skipping hand: {e}");
            None
        });
        let gesture = hand.as_ref().and_then(classify);
        self.last_hand = hand;
        self.last_gesture = gesture;

        let Some(g) = gesture else {
            debug!(t = now.as_secs_f64(), "no gesture");
            self.stats.record(None, None);
            return FrameReport { gesture: None, status: FrameStatus::NoGestureDetected, command: None };
        };

        if let (Some(store), Some(hand)) = (&self.samples, &hand) {
            if let Err(e) = store.save(g, hand) {
                warn!("could not save sample: {e}");
            }
        }

        let result = self.dispatcher.dispatch(Some(g), now);
        self.stats.record(Some(g), Some(&result));
        self.status = match &result {
            DispatchResult::Executed { action, repeats } => format!("{g}: {action} x{repeats}"),
            DispatchResult::Suppressed(r) => format!("{g}: {}", r.as_str()),
            DispatchResult::Failed(e) => format!("{g}: {e}"),
        };

        FrameReport {
            gesture: Some(g),
            status:  FrameStatus::Success,
            command: Some(CommandReport::from(&result)),
        }
    }

    // ── Accessors for the render loop ────────────────────────────────────

    pub fn stats(&self)        -> &SessionStats   { &self.stats }
    pub fn last_hand(&self)    -> Option<&Hand>   { self.last_hand.as_ref() }
    pub fn last_gesture(&self) -> Option<Gesture> { self.last_gesture }
    pub fn dispatcher(&self)   -> &Dispatcher<I>  { &self.dispatcher }
}

// ════════════════════════════════════════════════════════════════════════════
// run() - the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Picks the frame source, opens the key injector (dry run unless built
/// with `inject`), and processes frames until the source quits.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let injector = open_injector(cfg.dry_run);
    info!(backend = injector.name(), "key injection ready");
    let mut app = AppState::new(&cfg, injector)?;

    let frames = match &cfg.source {
        SourceKind::Stdin => spawn_frame_source(JsonLinesSource::stdin()),
        SourceKind::File(path) => spawn_frame_source(JsonLinesSource::open(path)?),
        SourceKind::Sim => {
            let (key_tx, key_rx) = mpsc::channel();
            let frames = spawn_frame_source(SimFrameSource { rx: key_rx });

            if cfg.preview {
                #[cfg(feature = "preview")]
                {
                    return run_preview(&cfg, &mut app, key_tx, frames);
                }
                #[cfg(not(feature = "preview"))]
                {
                    warn!("built without the `preview` feature - reading keys from stdin");
                }
            }
            eprintln!("  keys: u=thumbs up  d=thumbs down  l/r=swipe  s=stop  n=rest  q=quit");
            spawn_stdin_keys(key_tx);
            frames
        }
    };

    drain_blocking(&cfg, &mut app, frames)?;
    info!("{}", app.stats().summary());
    Ok(())
}

fn drain_blocking<I: KeyInjector>(
    cfg: &AppConfig,
    app: &mut AppState<I>,
    frames: Receiver<SourceEvent>,
) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for event in frames {
        match event {
            SourceEvent::Quit => break,
            SourceEvent::Frame(frame) => {
                let report = app.process_frame(&frame);
                if cfg.reports {
                    serde_json::to_writer(&mut out, &report)?;
                    writeln!(out)?;
                    out.flush()?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(feature = "preview")]
fn run_preview<I: KeyInjector>(
    cfg: &AppConfig,
    app: &mut AppState<I>,
    key_tx: mpsc::Sender<crate::source::SimKey>,
    frames: Receiver<SourceEvent>,
) -> Result<(), AppError> {
    use std::sync::mpsc::TryRecvError;
    use crate::preview::Preview;

    let mut vis = Preview::new(key_tx).map_err(AppError::Preview)?;

    'outer: while vis.is_open() {
        if !vis.poll_input() { break; }

        loop {
            match frames.try_recv() {
                Ok(SourceEvent::Quit) => break 'outer,
                Ok(SourceEvent::Frame(frame)) => {
                    let report = app.process_frame(&frame);
                    if cfg.reports {
                        println!("{}", serde_json::to_string(&report)?);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'outer,
            }
        }

        vis.render(app.last_hand(), app.last_gesture(), &app.status);
    }

    info!("{}", app.stats().summary());
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{sim_hand, SimKey};
    use tv_remote::{InjectError, LogInjector};

    fn fast_config() -> AppConfig {
        AppConfig {
            timing: DispatchTiming { repeat_delay: Duration::ZERO, ..DispatchTiming::default() },
            ..AppConfig::default()
        }
    }

    fn make_app() -> AppState<LogInjector> {
        AppState::new(&fast_config(), LogInjector::default()).unwrap()
    }

    fn frame(key: SimKey, t: f64) -> Frame {
        Frame::single(&sim_hand(key), Some(t))
    }

    #[test]
    fn thumbs_up_executes_volume_up() {
        let mut app = make_app();
        let r = app.process_frame(&frame(SimKey::ThumbsUp, 0.0));
        assert_eq!(r.gesture, Some(Gesture::ThumbsUp));
        assert_eq!(r.status, FrameStatus::Success);
        assert_eq!(r.command, Some(CommandReport::Executed { action: Action::VolumeUp, repeats: 1 }));
        assert_eq!(app.dispatcher().injector().presses, 1);
    }

    #[test]
    fn empty_frame_reports_no_gesture() {
        let mut app = make_app();
        let r = app.process_frame(&Frame::default());
        assert_eq!(r, FrameReport { gesture: None, status: FrameStatus::NoGestureDetected, command: None });
        assert_eq!(app.stats().no_gesture, 1);
        assert!(app.last_hand().is_none());
    }

    #[test]
    fn rest_pose_is_not_dispatched() {
        let mut app = make_app();
        let r = app.process_frame(&frame(SimKey::Rest, 0.0));
        assert_eq!(r.status, FrameStatus::NoGestureDetected);
        assert!(app.last_hand().is_some());
        assert_eq!(app.dispatcher().last_command(), None);
    }

    #[test]
    fn frames_inside_cooldown_are_suppressed() {
        let mut app = make_app();
        app.process_frame(&frame(SimKey::ThumbsUp, 0.0));
        let r = app.process_frame(&frame(SimKey::ThumbsDown, 0.5));
        assert_eq!(r.command, Some(CommandReport::Suppressed { reason: "cooldown" }));
        let r = app.process_frame(&frame(SimKey::OpenPalm, 1.1));
        assert_eq!(r.command, Some(CommandReport::Executed { action: Action::PlayPause, repeats: 1 }));

        let s = app.stats();
        assert_eq!((s.frames, s.executed, s.suppressed), (3, 2, 1));
    }

    #[test]
    fn swipe_reports_five_presses() {
        let mut app = make_app();
        let r = app.process_frame(&frame(SimKey::SwipeLeft, 0.0));
        assert_eq!(r.command, Some(CommandReport::Executed { action: Action::SeekBack, repeats: 5 }));
        assert_eq!(app.dispatcher().injector().presses, 5);
    }

    #[test]
    fn report_json_shape() {
        let mut app = make_app();
        let r = app.process_frame(&frame(SimKey::SwipeRight, 0.0));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["gesture"], "right_swipe");
        assert_eq!(json["status"], "success");
        assert_eq!(json["command"]["outcome"], "executed");
        assert_eq!(json["command"]["action"], "seek-forward");

        let none = serde_json::to_string(&app.process_frame(&Frame::default())).unwrap();
        assert_eq!(none, r#"{"gesture":null,"status":"no_gesture_detected"}"#);
    }

    #[test]
    fn failed_injection_is_reported_not_raised() {
        struct Broken;
        impl KeyInjector for Broken {
            fn press(&mut self, _: Action) -> Result<(), InjectError> {
                Err(InjectError::Unavailable("no display".into()))
            }
            fn name(&self) -> &'static str { "broken" }
        }

        let mut app = AppState::new(&fast_config(), Broken).unwrap();
        let r = app.process_frame(&frame(SimKey::ThumbsUp, 0.0));
        assert_eq!(
            r.command,
            Some(CommandReport::Failed { message: "key injection unavailable: no display".into() })
        );
        assert_eq!(app.stats().failed, 1);
        assert_eq!(app.dispatcher().last_command(), None);
    }

    #[test]
    fn capture_saves_gesture_frames_only() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = AppConfig { capture_dir: Some(tmp.path().to_path_buf()), ..fast_config() };
        let mut app = AppState::new(&cfg, LogInjector::default()).unwrap();

        app.process_frame(&frame(SimKey::Rest, 0.0));
        app.process_frame(&frame(SimKey::OpenPalm, 0.1));
        app.process_frame(&frame(SimKey::OpenPalm, 0.2));

        let groups = SampleStore::open(tmp.path()).unwrap().list().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].gesture, Gesture::Stop);
        assert_eq!(groups[0].samples.len(), 2);
    }

    #[test]
    fn frames_without_timestamp_use_session_clock() {
        let mut app = make_app();
        app.process_frame(&Frame::single(&sim_hand(SimKey::ThumbsUp), None));
        let r = app.process_frame(&Frame::single(&sim_hand(SimKey::ThumbsUp), None));
        assert_eq!(r.command, Some(CommandReport::Suppressed { reason: "cooldown" }));
    }

    #[test]
    fn huge_timestamp_falls_back_to_session_clock() {
        let mut app = make_app();
        let r = app.process_frame(&frame(SimKey::ThumbsUp, 1e20));
        assert_eq!(r.command, Some(CommandReport::Executed { action: Action::VolumeUp, repeats: 1 }));

        for bad in [f64::INFINITY, f64::NAN, -3.0] {
            let r = app.process_frame(&frame(SimKey::Rest, bad));
            assert_eq!(r.status, FrameStatus::NoGestureDetected);
        }
    }

    #[test]
    fn mixed_timestamped_and_untimestamped_frames_share_one_clock() {
        let cfg = AppConfig {
            timing: DispatchTiming { cooldown: Duration::from_millis(50), repeat_delay: Duration::ZERO },
            ..AppConfig::default()
        };
        let mut app = AppState::new(&cfg, LogInjector::default()).unwrap();

        let r = app.process_frame(&frame(SimKey::ThumbsUp, 100.0));
        assert!(matches!(r.command, Some(CommandReport::Executed { .. })));

        std::thread::sleep(Duration::from_millis(80));
        let r = app.process_frame(&Frame::single(&sim_hand(SimKey::ThumbsUp), None));
        assert!(matches!(r.command, Some(CommandReport::Executed { .. })), "{r:?}");

        // Tracker time still advances relative to its own first stamp.
        let r = app.process_frame(&frame(SimKey::ThumbsDown, 100.01));
        assert_eq!(r.command, Some(CommandReport::Suppressed { reason: "cooldown" }));
        let r = app.process_frame(&frame(SimKey::ThumbsDown, 101.0));
        assert_eq!(r.command, Some(CommandReport::Executed { action: Action::VolumeDown, repeats: 1 }));
    }

    #[test]
    fn session_clock_first_then_tracker_stamps() {
        let mut app = make_app();
        let r = app.process_frame(&Frame::single(&sim_hand(SimKey::ThumbsUp), None));
        assert!(matches!(r.command, Some(CommandReport::Executed { .. })));
        // A first stamp far ahead of the session clock lands on "now".
        let r = app.process_frame(&frame(SimKey::ThumbsDown, 5000.0));
        assert_eq!(r.command, Some(CommandReport::Suppressed { reason: "cooldown" }));
        let r = app.process_frame(&frame(SimKey::ThumbsDown, 5001.5));
        assert!(matches!(r.command, Some(CommandReport::Executed { .. })), "{r:?}");
    }

    #[test]
    fn summary_mentions_counts() {
        let mut app = make_app();
        app.process_frame(&frame(SimKey::ThumbsUp, 0.0));
        app.process_frame(&Frame::default());
        let s = app.stats().summary();
        assert!(s.starts_with("2 frames (1 none, thumbs_up=1"), "{s}");
        assert!(s.contains("1 executed"), "{s}");
    }
}
