//! Win32 backend
//!
//! The only platform-specific module. Everything above it talks to the
//! target through the `RemoteIo`, `Messenger` and `WindowFinder` traits;
//! this module implements them over the raw process and window APIs.

use crate::controller::Controller;
use crate::traits::{Messenger, RemoteIo, WindowFinder};
use crate::window::resolve_target_windows;
use std::ffi::c_void;
use tracing::{debug, info, warn};
use winampctl_common::{Error, RemoteAddress, Result, WindowHandle};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::DataExchange::COPYDATASTRUCT;
use windows::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows::Win32::System::Memory::{
    VirtualAllocEx, VirtualFreeEx, MEM_COMMIT, MEM_RELEASE, PAGE_READWRITE,
};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ,
    PROCESS_VM_WRITE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, FindWindowW, GetWindowThreadProcessId, SendMessageW,
};

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn hwnd_of(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as *mut c_void)
}

/// An open privileged handle to the target process. The handle is closed
/// when the session drops; all remote memory operations borrow it.
pub struct ProcessSession {
    handle: HANDLE,
    pid: u32,
}

impl ProcessSession {
    /// Open the process owning the given window with memory-operation
    /// rights.
    pub fn open_for_window(window: WindowHandle) -> Result<Self> {
        let mut pid = 0u32;
        unsafe { GetWindowThreadProcessId(hwnd_of(window), Some(&mut pid)) };
        if pid == 0 {
            return Err(Error::AttachFailed(format!(
                "window {:#x} has no owning process",
                window.raw()
            )));
        }

        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION
                    | PROCESS_QUERY_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(|e| Error::AttachFailed(format!("OpenProcess for pid {pid}: {e}")))?;

        info!(pid, "attached to target process");
        Ok(ProcessSession { handle, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        if let Err(e) = unsafe { CloseHandle(self.handle) } {
            warn!(pid = self.pid, error = %e, "failed to close process handle");
        }
    }
}

/// Backend bundling the process session with the message primitives.
pub struct Win32Backend {
    session: ProcessSession,
}

impl Win32Backend {
    pub fn new(session: ProcessSession) -> Self {
        Win32Backend { session }
    }

    pub fn pid(&self) -> u32 {
        self.session.pid()
    }
}

impl RemoteIo for Win32Backend {
    fn alloc(&self, size: usize) -> Result<RemoteAddress> {
        let ptr = unsafe {
            VirtualAllocEx(self.session.handle, None, size, MEM_COMMIT, PAGE_READWRITE)
        };
        if ptr.is_null() {
            return Err(Error::AllocationFailed { size });
        }
        debug!(size, address = ptr as usize, "allocated remote buffer");
        Ok(RemoteAddress::new(ptr as usize))
    }

    fn free(&self, addr: RemoteAddress) -> Result<()> {
        unsafe {
            VirtualFreeEx(self.session.handle, addr.raw() as *mut c_void, 0, MEM_RELEASE)
        }
        .map_err(|e| Error::FreeFailed {
            address: addr.raw(),
            reason: e.to_string(),
        })
    }

    fn write(&self, addr: RemoteAddress, data: &[u8]) -> Result<usize> {
        let mut written = 0usize;
        unsafe {
            WriteProcessMemory(
                self.session.handle,
                addr.raw() as *const c_void,
                data.as_ptr() as *const c_void,
                data.len(),
                Some(&mut written),
            )
        }
        .map_err(|_| Error::WriteFailed {
            address: addr.raw(),
            expected: data.len(),
            written,
        })?;
        Ok(written)
    }

    fn read(&self, addr: RemoteAddress, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let mut read = 0usize;
        unsafe {
            ReadProcessMemory(
                self.session.handle,
                addr.raw() as *const c_void,
                buf.as_mut_ptr() as *mut c_void,
                len,
                Some(&mut read),
            )
        }
        .map_err(|_| Error::ReadFailed {
            address: addr.raw(),
            len,
        })?;
        buf.truncate(read);
        Ok(buf)
    }
}

impl Messenger for Win32Backend {
    fn send_message(
        &self,
        target: WindowHandle,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Result<isize> {
        let LRESULT(result) =
            unsafe { SendMessageW(hwnd_of(target), msg, WPARAM(wparam), LPARAM(lparam)) };
        Ok(result)
    }

    fn send_data_block(&self, target: WindowHandle, tag: u32, data: &[u8]) -> Result<isize> {
        // The block stays in our address space; the target reads it while
        // handling the message, which blocks until the handler returns.
        let block = COPYDATASTRUCT {
            dwData: tag as usize,
            cbData: data.len() as u32,
            lpData: data.as_ptr() as *mut c_void,
        };
        self.send_message(
            target,
            crate::ipc::WM_COPYDATA,
            0,
            &block as *const COPYDATASTRUCT as isize,
        )
    }
}

/// Window discovery over the native window hierarchy.
pub struct Win32WindowFinder;

impl WindowFinder for Win32WindowFinder {
    fn find_top_level(&self, class: Option<&str>, title: Option<&str>) -> Option<WindowHandle> {
        let class_w = class.map(wide);
        let title_w = title.map(wide);
        let class_p = class_w.as_ref().map_or(PCWSTR::null(), |w| PCWSTR(w.as_ptr()));
        let title_p = title_w.as_ref().map_or(PCWSTR::null(), |w| PCWSTR(w.as_ptr()));

        unsafe { FindWindowW(class_p, title_p) }
            .ok()
            .filter(|h| !h.0.is_null())
            .map(|h| WindowHandle::new(h.0 as isize))
    }

    fn find_child(
        &self,
        parent: WindowHandle,
        class: Option<&str>,
        title: Option<&str>,
    ) -> Option<WindowHandle> {
        let class_w = class.map(wide);
        let title_w = title.map(wide);
        let class_p = class_w.as_ref().map_or(PCWSTR::null(), |w| PCWSTR(w.as_ptr()));
        let title_p = title_w.as_ref().map_or(PCWSTR::null(), |w| PCWSTR(w.as_ptr()));

        unsafe { FindWindowExW(hwnd_of(parent), HWND::default(), class_p, title_p) }
            .ok()
            .filter(|h| !h.0.is_null())
            .map(|h| WindowHandle::new(h.0 as isize))
    }
}

/// Discover a running target, open its process, and build a controller.
///
/// Discovery is one pass with no retries. Any unresolved window surface is
/// `TargetNotFound` (the target is not running, or has not created that
/// window yet); `AttachFailed` is reserved for a refused process open.
pub fn attach() -> Result<Controller<Win32Backend>> {
    let windows = resolve_target_windows(&Win32WindowFinder)?;

    let session = ProcessSession::open_for_window(windows.main)?;
    let backend = Win32Backend::new(session);

    Ok(Controller::new(backend, windows))
}
