//! Student profile, progress counters, and the saved-session store.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::protocol::UserProfile;

/// The logged-in (or guest) student and their progress counters.
///
/// Owned by the app and passed explicitly to whoever needs it; progress
/// mutations come in as controller effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProgress {
    pub id: i64,
    pub name: String,
    pub class_level: u8,
    pub email: String,
    #[serde(default)]
    pub completed_topics: BTreeSet<String>,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub badges: BTreeSet<String>,
}

impl StudentProgress {
    pub fn guest(class_level: u8) -> Self {
        Self {
            id: 1,
            name: "Guest".to_string(),
            class_level,
            email: String::new(),
            completed_topics: BTreeSet::new(),
            stars: 0,
            badges: BTreeSet::new(),
        }
    }

    /// Build from an auth profile. Profile ids are strings server-side;
    /// non-numeric ids hash down to a stable numeric student id.
    pub fn from_profile(profile: &UserProfile) -> Self {
        let id = profile.id.parse().unwrap_or_else(|_| {
            profile
                .id
                .bytes()
                .fold(0i64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as i64))
                .abs()
                .max(1)
        });
        Self {
            id,
            name: profile.name.clone(),
            class_level: profile.class_level(),
            email: profile.email.clone(),
            completed_topics: BTreeSet::new(),
            stars: 0,
            badges: BTreeSet::new(),
        }
    }

    pub fn complete_topic(&mut self, topic: &str) {
        self.completed_topics.insert(topic.to_string());
    }

    pub fn add_stars(&mut self, count: u32) {
        self.stars += count as u64;
    }

    pub fn add_badge(&mut self, badge: &str) {
        self.badges.insert(badge.to_string());
    }
}

/// What gets persisted between runs: the bearer token and the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSession {
    pub token: String,
    pub student: StudentProgress,
}

/// On-disk store for [`SavedSession`], the browser-localStorage analog.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the saved session, if any. A corrupt file is treated as absent.
    pub fn load(&self) -> Option<SavedSession> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, session: &SavedSession) -> io::Result<()> {
        let json = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
        std::fs::write(&self.path, json)
    }

    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
