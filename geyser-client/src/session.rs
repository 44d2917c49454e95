//! Session persistence. A login is exactly the cookies of the community domain.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cookies::StoredCookie;

/// Serialisable snapshot of an authenticated session.
///
/// Encodes as a plain JSON array of cookies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData {
    pub cookies: Vec<StoredCookie>,
}

impl SessionData {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let buf = std::fs::read_to_string(path)?;
        Self::from_json(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn is_empty(&self) -> bool { self.cookies.is_empty() }
}
