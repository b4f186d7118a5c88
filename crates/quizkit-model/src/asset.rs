//! Image asset references.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Prefix of a serialized session handle.
pub const SESSION_SCHEME: &str = "session:";

/// Handle to image bytes held by the current editing session.
///
/// Only meaningful to the session asset registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(Uuid);

impl AssetHandle {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Parse the `session:<uuid>` form.
    pub fn parse(value: &str) -> Option<Self> {
        value
            .strip_prefix(SESSION_SCHEME)
            .and_then(|rest| Uuid::parse_str(rest).ok())
            .map(Self)
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SESSION_SCHEME}{}", self.0)
    }
}

/// Where a question's image lives.
///
/// Persisted state holds one form or the other, never both: the editor and
/// page cache only see [`AssetRef::Session`], archives only contain
/// [`AssetRef::Archived`]. The archive codec translates between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetRef {
    /// Bytes registered with the session asset registry.
    Session(AssetHandle),
    /// Path relative to the page directory inside an archive.
    Archived(String),
}

impl AssetRef {
    pub fn session(&self) -> Option<AssetHandle> {
        match self {
            Self::Session(handle) => Some(*handle),
            Self::Archived(_) => None,
        }
    }

    pub fn archived_path(&self) -> Option<&str> {
        match self {
            Self::Session(_) => None,
            Self::Archived(path) => Some(path),
        }
    }
}

impl From<AssetHandle> for AssetRef {
    fn from(handle: AssetHandle) -> Self {
        Self::Session(handle)
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(handle) => handle.fmt(f),
            Self::Archived(path) => f.write_str(path),
        }
    }
}

impl Serialize for AssetRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match AssetHandle::parse(&raw) {
            Some(handle) => Self::Session(handle),
            None => Self::Archived(raw),
        })
    }
}
