//! Core handle and record types
//!
//! Remote addresses, window handles and process identifiers are all plain
//! integers on the wire. Each gets its own opaque newtype so a
//! controller-local pointer can never be passed where a target-space
//! address is expected.

use serde::{Deserialize, Serialize};

/// Maximum length assumed for unbounded remote text fields. The target does
/// not report string lengths, so reads are capped at its documented maximum
/// path length.
pub const MAX_TEXT_LEN: usize = 260;

/// A location inside the target's address space. Meaningless in the
/// controller's own address space; only ever dereferenced through the
/// remote memory channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteAddress(usize);

impl RemoteAddress {
    pub const NULL: RemoteAddress = RemoteAddress(0);

    pub fn new(raw: usize) -> Self {
        RemoteAddress(raw)
    }

    pub fn raw(self) -> usize {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Address `bytes` past this one, saturating at the top of the space.
    pub fn offset(self, bytes: usize) -> Self {
        RemoteAddress(self.0.saturating_add(bytes))
    }
}

impl std::fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Opaque identifier for one node in the target's window hierarchy.
/// Resolved, never created; immutable once obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub fn new(raw: isize) -> Self {
        WindowHandle(raw)
    }

    pub fn raw(self) -> isize {
        self.0
    }
}

/// Playback state reported by the target's status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    NotPlaying,
    Playing,
    Paused,
}

impl PlaybackStatus {
    /// Wire values: 0 = stopped, 1 = playing, 3 = paused. Anything else is
    /// treated as not playing.
    pub fn from_code(code: isize) -> Self {
        match code {
            1 => PlaybackStatus::Playing,
            3 => PlaybackStatus::Paused,
            _ => PlaybackStatus::NotPlaying,
        }
    }
}

/// One media-library entry, snapshotted out of the target's memory at query
/// time. Never kept in sync with the target afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub filename: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub comment: Option<String>,
    pub genre: Option<String>,
    pub year: i32,
    pub track: i32,
    pub length: i32,
    /// Opaque extended-attributes blob. Present when the target attached
    /// extended columns to the record; the contents are not interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_info: Option<Vec<u8>>,
}
