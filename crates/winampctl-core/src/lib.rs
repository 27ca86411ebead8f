//! winampctl Core Library
//!
//! Controls a running Winamp instance from the outside: window discovery,
//! a privileged process session, remote buffer transfer, synchronous coded
//! messages and pointer-bearing record marshaling. Everything except the
//! `win32` backend is platform-neutral and testable against fakes.

pub mod controller;
pub mod ipc;
pub mod marshal;
pub mod memory;
pub mod query;
pub mod records;
pub mod traits;
pub mod transport;
#[cfg(windows)]
pub mod win32;
pub mod window;

pub use controller::Controller;
pub use memory::RemoteMemoryChannel;
pub use query::QueryMode;
pub use traits::*;
pub use transport::{MessageTransport, TargetWindows};
#[cfg(windows)]
pub use win32::{attach, Win32Backend};
pub use winampctl_common::{Error, ItemRecord, PlaybackStatus, RemoteAddress, Result};
