//! Remote memory channel
//!
//! Allocates buffers inside the target's address space and performs raw
//! byte transfers against arbitrary remote addresses, including a degraded
//! read path for buffers that run off the end of a mapped page.

use crate::traits::RemoteIo;
use tracing::{debug, trace};
use winampctl_common::{Error, RemoteAddress, Result, MAX_TEXT_LEN};

/// Page granularity assumed for the degraded read path.
pub const PAGE_SIZE: usize = 0x1000;

/// Address of the first byte past the page containing `addr`.
fn next_page_boundary(addr: RemoteAddress) -> usize {
    (addr.raw() | (PAGE_SIZE - 1)) + 1
}

/// Byte-level access to the target's address space over a raw [`RemoteIo`].
pub struct RemoteMemoryChannel<I: RemoteIo> {
    io: I,
}

impl<I: RemoteIo> RemoteMemoryChannel<I> {
    pub fn new(io: I) -> Self {
        RemoteMemoryChannel { io }
    }

    /// Request committed read-write memory in the target.
    pub fn allocate(&self, size: usize) -> Result<RemoteAddress> {
        let addr = self.io.alloc(size)?;
        trace!(size, %addr, "allocated remote buffer");
        Ok(addr)
    }

    /// Release a buffer previously obtained from [`allocate`](Self::allocate).
    pub fn free(&self, addr: RemoteAddress) -> Result<()> {
        self.io.free(addr)
    }

    /// Copy the full local buffer into the target at `addr`.
    pub fn write_bytes(&self, addr: RemoteAddress, data: &[u8]) -> Result<()> {
        let written = self.io.write(addr, data)?;
        if written != data.len() {
            return Err(Error::WriteFailed {
                address: addr.raw(),
                expected: data.len(),
                written,
            });
        }
        Ok(())
    }

    /// Copy `len` bytes out of the target.
    ///
    /// If the primary read is refused and the requested range crosses a
    /// page boundary, the read is re-issued clipped to the end of the first
    /// page and the short result is returned as a success. Callers of text
    /// fields must tolerate truncation near page boundaries; the heuristic
    /// makes no stronger guarantee. A refused read entirely within one page
    /// is a genuine fault.
    pub fn read_bytes(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }

        match self.io.read(addr, len) {
            Ok(buf) => Ok(buf),
            Err(_) => {
                let boundary = next_page_boundary(addr);
                if addr.raw().saturating_add(len) <= boundary {
                    return Err(Error::ReadFailed {
                        address: addr.raw(),
                        len,
                    });
                }
                let clipped = boundary - addr.raw();
                debug!(%addr, len, clipped, "remote read refused, clipping to end of page");
                self.io.read(addr, clipped)
            }
        }
    }

    /// Allocate-and-write convenience: returns the new remote location of
    /// a copy of `data`. The allocation is untracked; unless the caller
    /// frees it, it lives for the target's process lifetime.
    pub fn copy_to_target(&self, data: &[u8]) -> Result<RemoteAddress> {
        let addr = self.allocate(data.len())?;
        self.write_bytes(addr, data)?;
        Ok(addr)
    }

    /// Read a NUL-terminated string at `addr`, capped at the target's
    /// maximum path length since remote string lengths are not known.
    pub fn read_cstring(&self, addr: RemoteAddress) -> Result<String> {
        let buf = self.read_bytes(addr, MAX_TEXT_LEN)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// Read a NUL-terminated wide (UTF-16) string at `addr`, with the same
    /// length cap as [`read_cstring`](Self::read_cstring).
    pub fn read_wide_string(&self, addr: RemoteAddress) -> Result<String> {
        let buf = self.read_bytes(addr, MAX_TEXT_LEN * 2)?;
        let units: Vec<u16> = buf
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .take_while(|&u| u != 0)
            .collect();
        Ok(String::from_utf16_lossy(&units))
    }
}
