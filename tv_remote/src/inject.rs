//! Key injection backends.
//!
//! [`KeyInjector`] is the seam between the dispatcher and the OS.  The
//! default build only logs presses ([`LogInjector`]); with the `inject`
//! feature [`EnigoInjector`] sends real key events.

use thiserror::Error;
use tracing::{info, warn};

use crate::command::Action;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// The OS input facility could not be opened.
    #[error("key injection unavailable: {0}")]
    Unavailable(String),
    /// A single press was rejected.
    #[error("failed to press {action}: {message}")]
    Press { action: Action, message: String },
}

// ════════════════════════════════════════════════════════════════════════════
// KeyInjector
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can turn an [`Action`] into one key press.
pub trait KeyInjector {
    fn press(&mut self, action: Action) -> Result<(), InjectError>;

    /// Backend name, for logs.
    fn name(&self) -> &'static str;
}

impl<K: KeyInjector + ?Sized> KeyInjector for Box<K> {
    fn press(&mut self, action: Action) -> Result<(), InjectError> {
        (**self).press(action)
    }
    fn name(&self) -> &'static str { (**self).name() }
}

// ── dry-run backend ───────────────────────────────────────────────────────

/// Logs each press and never fails.
#[derive(Debug, Default)]
pub struct LogInjector {
    pub presses: u64,
}

impl KeyInjector for LogInjector {
    fn press(&mut self, action: Action) -> Result<(), InjectError> {
        self.presses += 1;
        info!(target: "tv_remote::inject", "press {} (dry run)", action.key_name());
        Ok(())
    }
    fn name(&self) -> &'static str { "dry-run" }
}

// ── enigo backend ─────────────────────────────────────────────────────────

#[cfg(feature = "inject")]
pub struct EnigoInjector {
    enigo: enigo::Enigo,
}

#[cfg(feature = "inject")]
impl EnigoInjector {
    pub fn new() -> Result<Self, InjectError> {
        let enigo = enigo::Enigo::new(&enigo::Settings::default())
            .map_err(|e| InjectError::Unavailable(e.to_string()))?;
        Ok(EnigoInjector { enigo })
    }

    fn key_for(action: Action) -> enigo::Key {
        use enigo::Key;
        match action {
            Action::VolumeUp    => Key::VolumeUp,
            Action::VolumeDown  => Key::VolumeDown,
            Action::SeekBack    => Key::LeftArrow,
            Action::SeekForward => Key::RightArrow,
            Action::PlayPause   => Key::Space,
        }
    }
}

#[cfg(feature = "inject")]
impl KeyInjector for EnigoInjector {
    fn press(&mut self, action: Action) -> Result<(), InjectError> {
        use enigo::{Direction, Keyboard};
        self.enigo
            .key(Self::key_for(action), Direction::Click)
            .map_err(|e| InjectError::Press { action, message: e.to_string() })
    }
    fn name(&self) -> &'static str { "enigo" }
}

// ════════════════════════════════════════════════════════════════════════════
// open_injector - real backend if we can, dry run otherwise
// ════════════════════════════════════════════════════════════════════════════

/// Open the OS backend unless `dry_run` is set or it is not compiled in.
/// Falls back to [`LogInjector`] with a warning when the OS refuses.
pub fn open_injector(dry_run: bool) -> Box<dyn KeyInjector> {
    if dry_run {
        return Box::new(LogInjector::default());
    }

    #[cfg(feature = "inject")]
    {
        match EnigoInjector::new() {
            Ok(inj) => return Box::new(inj),
            Err(e) => warn!("{e} - key presses will only be logged"),
        }
    }

    #[cfg(not(feature = "inject"))]
    warn!("built without the `inject` feature - key presses will only be logged");

    Box::new(LogInjector::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_injector_counts_presses() {
        let mut inj = LogInjector::default();
        inj.press(Action::VolumeUp).unwrap();
        inj.press(Action::SeekBack).unwrap();
        assert_eq!(inj.presses, 2);
    }

    #[test]
    fn dry_run_is_always_the_log_backend() {
        assert_eq!(open_injector(true).name(), "dry-run");
    }

    #[test]
    fn boxed_injector_forwards() {
        let mut boxed: Box<dyn KeyInjector> = Box::new(LogInjector::default());
        assert!(boxed.press(Action::PlayPause).is_ok());
        assert_eq!(boxed.name(), "dry-run");
    }

    #[test]
    fn press_error_names_the_action() {
        let e = InjectError::Press { action: Action::VolumeDown, message: "denied".into() };
        assert_eq!(e.to_string(), "failed to press volume-down: denied");
    }
}
