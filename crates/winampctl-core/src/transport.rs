//! Message transport
//!
//! Wraps the raw messenger with the target's three message flavors: user
//! messages to the main window, library-scoped user messages, and command
//! messages. User messages carry the argument in the first parameter and
//! the IPC code in the second; the handler's integer result is returned
//! as-is (some codes return remote addresses encoded as integers).

use crate::ipc::{WM_COMMAND, WM_ML_IPC, WM_WA_IPC};
use crate::traits::Messenger;
use tracing::trace;
use winampctl_common::{Result, WindowHandle};

/// The three resolved message endpoints of an attached target.
#[derive(Debug, Clone, Copy)]
pub struct TargetWindows {
    pub main: WindowHandle,
    pub playlist: WindowHandle,
    pub library: WindowHandle,
}

pub struct MessageTransport<M: Messenger> {
    messenger: M,
    windows: TargetWindows,
}

impl<M: Messenger> MessageTransport<M> {
    pub fn new(messenger: M, windows: TargetWindows) -> Self {
        MessageTransport { messenger, windows }
    }

    pub fn windows(&self) -> TargetWindows {
        self.windows
    }

    /// Send a user message to the main window. Blocks until the target's
    /// handler returns.
    pub fn send_user_message(&self, code: u32, param: usize) -> Result<isize> {
        trace!(code, param, "user message");
        self.messenger
            .send_message(self.windows.main, WM_WA_IPC, param, code as isize)
    }

    /// Send a library-scoped user message to the media library window.
    pub fn send_ml_message(&self, code: u32, param: usize) -> Result<isize> {
        trace!(code, param, "media library message");
        self.messenger
            .send_message(self.windows.library, WM_ML_IPC, param, code as isize)
    }

    /// Send a command-message trigger to the main window. The return value
    /// carries no meaning for command codes.
    pub fn send_command_message(&self, command: u32) -> Result<()> {
        self.send_command_message_to(self.windows.main, command)
    }

    /// Send a command-message trigger to a specific window.
    pub fn send_command_message_to(&self, target: WindowHandle, command: u32) -> Result<()> {
        trace!(command, "command message");
        self.messenger
            .send_message(target, WM_COMMAND, command as usize, 0)?;
        Ok(())
    }

    /// Send a data-block message to the main window. The block stays in
    /// controller memory; the target reads it synchronously during message
    /// handling, so no remote allocation is involved.
    pub fn send_data_block(&self, tag: u32, data: &[u8]) -> Result<isize> {
        trace!(tag, len = data.len(), "data-block message");
        self.messenger.send_data_block(self.windows.main, tag, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc;
    use std::cell::RefCell;
    use winampctl_common::WindowHandle;

    #[derive(Debug, PartialEq)]
    enum Sent {
        Message {
            target: isize,
            msg: u32,
            wparam: usize,
            lparam: isize,
        },
        DataBlock {
            target: isize,
            tag: u32,
            len: usize,
        },
    }

    #[derive(Default)]
    struct RecordingMessenger {
        sent: RefCell<Vec<Sent>>,
    }

    impl Messenger for RecordingMessenger {
        fn send_message(
            &self,
            target: WindowHandle,
            msg: u32,
            wparam: usize,
            lparam: isize,
        ) -> winampctl_common::Result<isize> {
            self.sent.borrow_mut().push(Sent::Message {
                target: target.raw(),
                msg,
                wparam,
                lparam,
            });
            Ok(0)
        }

        fn send_data_block(
            &self,
            target: WindowHandle,
            tag: u32,
            data: &[u8],
        ) -> winampctl_common::Result<isize> {
            self.sent.borrow_mut().push(Sent::DataBlock {
                target: target.raw(),
                tag,
                len: data.len(),
            });
            Ok(0)
        }
    }

    fn windows() -> TargetWindows {
        TargetWindows {
            main: WindowHandle::new(1),
            playlist: WindowHandle::new(2),
            library: WindowHandle::new(3),
        }
    }

    #[test]
    fn test_user_message_shape() {
        let transport = MessageTransport::new(RecordingMessenger::default(), windows());
        transport.send_user_message(ipc::IPC_SETVOLUME, 128).unwrap();
        assert_eq!(
            transport.messenger.sent.borrow()[0],
            Sent::Message {
                target: 1,
                msg: ipc::WM_WA_IPC,
                wparam: 128,
                lparam: ipc::IPC_SETVOLUME as isize,
            }
        );
    }

    #[test]
    fn test_ml_message_goes_to_library_window() {
        let transport = MessageTransport::new(RecordingMessenger::default(), windows());
        transport
            .send_ml_message(ipc::ML_IPC_DB_RUNQUERY, 0xBEEF)
            .unwrap();
        assert_eq!(
            transport.messenger.sent.borrow()[0],
            Sent::Message {
                target: 3,
                msg: ipc::WM_ML_IPC,
                wparam: 0xBEEF,
                lparam: ipc::ML_IPC_DB_RUNQUERY as isize,
            }
        );
    }

    #[test]
    fn test_command_message_shape() {
        let transport = MessageTransport::new(RecordingMessenger::default(), windows());
        transport.send_command_message(ipc::BUTTON_PLAY).unwrap();
        transport
            .send_command_message_to(WindowHandle::new(2), ipc::ID_PE_S_PATH)
            .unwrap();
        let sent = transport.messenger.sent.borrow();
        assert_eq!(
            sent[0],
            Sent::Message {
                target: 1,
                msg: ipc::WM_COMMAND,
                wparam: ipc::BUTTON_PLAY as usize,
                lparam: 0,
            }
        );
        assert_eq!(
            sent[1],
            Sent::Message {
                target: 2,
                msg: ipc::WM_COMMAND,
                wparam: ipc::ID_PE_S_PATH as usize,
                lparam: 0,
            }
        );
    }

    #[test]
    fn test_data_block_targets_main_window() {
        let transport = MessageTransport::new(RecordingMessenger::default(), windows());
        transport
            .send_data_block(ipc::IPC_ENQUEUEFILE, b"C:\\music\\a.mp3\0")
            .unwrap();
        assert_eq!(
            transport.messenger.sent.borrow()[0],
            Sent::DataBlock {
                target: 1,
                tag: ipc::IPC_ENQUEUEFILE,
                len: 15,
            }
        );
    }
}
