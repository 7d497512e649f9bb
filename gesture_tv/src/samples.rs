//! Flat-file store of labelled hands.
//!
//! ```text
//! <root>/
//!   thumbs_up/1718030412345.json
//!   stop/1718030419001.json
//! ```
//!
//! Each file is the 21-landmark JSON list of one hand.  Samples are handy for
//! re-tuning thresholds and for regression-testing a tracker integration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use hand_pose::{Gesture, Hand, UnknownGesture};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sample store I/O: {0}")]
    Io(#[from] io::Error),
    #[error("bad sample file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid sample name `{0}`")]
    InvalidName(String),
    #[error("no sample `{0}`")]
    NotFound(String),
    #[error(transparent)]
    Gesture(#[from] UnknownGesture),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleEntry {
    pub name:     String,
    pub path:     PathBuf,
    pub modified: SystemTime,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleGroup {
    pub gesture: Gesture,
    pub samples: Vec<SampleEntry>,
}

/// `<gesture>/<file name>`, the way samples are named on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleRef {
    pub gesture: Gesture,
    pub name:    String,
}

impl FromStr for SampleRef {
    type Err = SampleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (gesture, name) = s
            .split_once('/')
            .ok_or_else(|| SampleError::InvalidName(s.to_string()))?;
        Ok(SampleRef { gesture: gesture.parse()?, name: name.to_string() })
    }
}

pub struct SampleStore {
    root: PathBuf,
}

impl SampleStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SampleError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(SampleStore { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Write `hand` under its gesture's directory; returns the new file.
    pub fn save(&self, gesture: Gesture, hand: &Hand) -> Result<PathBuf, SampleError> {
        let dir = self.root.join(gesture.as_str());
        fs::create_dir_all(&dir)?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let mut path = dir.join(format!("{millis}.json"));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{millis}-{n}.json"));
            n += 1;
        }

        fs::write(&path, serde_json::to_vec(hand)?)?;
        debug!("saved {} sample to {}", gesture, path.display());
        Ok(path)
    }

    /// Every stored sample, grouped by gesture, oldest first.
    /// Directories that are not gesture names are ignored.
    pub fn list(&self) -> Result<Vec<SampleGroup>, SampleError> {
        let mut groups = Vec::new();
        for gesture in Gesture::ALL {
            let dir = self.root.join(gesture.as_str());
            if !dir.is_dir() {
                continue;
            }
            let mut samples = Vec::new();
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                samples.push(SampleEntry {
                    name:     entry.file_name().to_string_lossy().into_owned(),
                    modified: entry.metadata()?.modified()?,
                    path,
                });
            }
            samples.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
            groups.push(SampleGroup { gesture, samples });
        }
        Ok(groups)
    }

    pub fn load(&self, gesture: Gesture, name: &str) -> Result<Hand, SampleError> {
        let path = self.sample_path(gesture, name)?;
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SampleError::NotFound(name.to_string()),
            _ => SampleError::Io(e),
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn delete(&self, gesture: Gesture, name: &str) -> Result<(), SampleError> {
        let path = self.sample_path(gesture, name)?;
        if !path.is_file() {
            return Err(SampleError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    pub fn load_ref(&self, r: &SampleRef) -> Result<Hand, SampleError> {
        self.load(r.gesture, &r.name)
    }

    pub fn delete_ref(&self, r: &SampleRef) -> Result<(), SampleError> {
        self.delete(r.gesture, &r.name)
    }

    fn sample_path(&self, gesture: Gesture, name: &str) -> Result<PathBuf, SampleError> {
        let bad = name.is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name.contains("..");
        if bad {
            return Err(SampleError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(gesture.as_str()).join(name))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
