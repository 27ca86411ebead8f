//! Target message-code table
//!
//! These values are the wire contract with the target's message handler.
//! They are not arbitrary and must not be renumbered.

/// Main window IPC message (WM_USER)
pub const WM_WA_IPC: u32 = 0x0400;
/// Media library IPC message
pub const WM_ML_IPC: u32 = WM_WA_IPC + 0x1000;
/// Command message carrying transport-button codes
pub const WM_COMMAND: u32 = 0x0111;
/// Data-block message; payload lives in the sender's memory
pub const WM_COPYDATA: u32 = 0x004A;

/// Add an item to the playlist (data-block tag)
pub const IPC_ENQUEUEFILE: u32 = 100;
/// Delete the target's internal playlist
pub const IPC_DELETE: u32 = 101;
/// Playback status query
pub const IPC_ISPLAYING: u32 = 104;
/// Get output time; param selects position (ms) or length (s)
pub const IPC_GETOUTPUTTIME: u32 = 105;
/// Set playlist position (zero based)
pub const IPC_SETPLAYLISTPOS: u32 = 121;
/// Set volume, 0-255
pub const IPC_SETVOLUME: u32 = 122;
/// Get playlist length
pub const IPC_GETLISTLENGTH: u32 = 124;
/// Get playlist file name at index; returns a remote string address
pub const IPC_GETPLAYLISTFILE: u32 = 211;
/// Get playlist title at index; returns a remote string address
pub const IPC_GETPLAYLISTTITLE: u32 = 212;
/// Current playing title; returns a remote wide-string address
pub const IPC_GET_PLAYING_TITLE: u32 = 3034;

/// Mode flag for IPC_GETOUTPUTTIME: track position in milliseconds
pub const OUTPUT_TIME_POSITION_MS: usize = 0;
/// Mode flag for IPC_GETOUTPUTTIME: track length in seconds
pub const OUTPUT_TIME_LENGTH_S: usize = 1;

/// Run a media-library query (literal filter syntax)
pub const ML_IPC_DB_RUNQUERY: u32 = 0x0700;
/// Run a media-library query as a keyword search across all fields
pub const ML_IPC_DB_RUNQUERY_SEARCH: u32 = 0x0701;
/// Free query results from the target's memory
pub const ML_IPC_DB_FREEQUERYRESULTS: u32 = 0x0705;

/// Transport buttons (command message codes)
pub const BUTTON_PREVIOUS: u32 = 40044;
pub const BUTTON_PLAY: u32 = 40045;
pub const BUTTON_PAUSE: u32 = 40046;
pub const BUTTON_STOP: u32 = 40047;
pub const BUTTON_NEXT: u32 = 40048;

/// Sort the playlist editor by path and filename
pub const ID_PE_S_PATH: u32 = 40211;
