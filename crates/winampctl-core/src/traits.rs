//! Trait seams over the target process
//!
//! These traits define the primitives the core composes: raw remote memory
//! access, the synchronous message transport, and window discovery. The
//! Win32 backend implements all three; tests substitute fakes.

use winampctl_common::{RemoteAddress, Result, WindowHandle};

/// Raw memory operations against the target's address space.
///
/// `read` is a single attempt with no recovery; the page-boundary degraded
/// path lives above this seam in the remote memory channel.
pub trait RemoteIo {
    /// Request committed read-write memory inside the target
    fn alloc(&self, size: usize) -> Result<RemoteAddress>;

    /// Release memory previously obtained from `alloc`
    fn free(&self, addr: RemoteAddress) -> Result<()>;

    /// Copy `data` into the target at `addr`, returning the bytes written
    fn write(&self, addr: RemoteAddress, data: &[u8]) -> Result<usize>;

    /// Copy `len` bytes out of the target at `addr`, one attempt
    fn read(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>>;
}

/// Synchronous window-message transport.
///
/// Every send blocks until the target's handler returns; there is no
/// timeout, so a stuck handler stalls the caller indefinitely.
pub trait Messenger {
    /// Send a message with two integer parameters, returning the handler's
    /// integer result (which may encode a remote address)
    fn send_message(
        &self,
        target: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<isize>;

    /// Send a data-block message: the block stays in the sender's memory
    /// and the target reads it synchronously while handling the message
    fn send_data_block(&self, target: WindowHandle, tag: u32, data: &[u8]) -> Result<isize>;
}

/// Window discovery inside the target's handle hierarchy.
///
/// `None` for class or title is a wildcard matching anything.
pub trait WindowFinder {
    fn find_top_level(&self, class: Option<&str>, title: Option<&str>) -> Option<WindowHandle>;

    fn find_child(
        &self,
        parent: WindowHandle,
        class: Option<&str>,
        title: Option<&str>,
    ) -> Option<WindowHandle>;
}

impl<T: RemoteIo + ?Sized> RemoteIo for &T {
    fn alloc(&self, size: usize) -> Result<RemoteAddress> {
        (**self).alloc(size)
    }

    fn free(&self, addr: RemoteAddress) -> Result<()> {
        (**self).free(addr)
    }

    fn write(&self, addr: RemoteAddress, data: &[u8]) -> Result<usize> {
        (**self).write(addr, data)
    }

    fn read(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>> {
        (**self).read(addr, len)
    }
}

impl<T: Messenger + ?Sized> Messenger for &T {
    fn send_message(
        &self,
        target: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<isize> {
        (**self).send_message(target, msg, wparam, lparam)
    }

    fn send_data_block(&self, target: WindowHandle, tag: u32, data: &[u8]) -> Result<isize> {
        (**self).send_data_block(target, tag, data)
    }
}
