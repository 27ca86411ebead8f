//! Attached-target controller
//!
//! The public surface over an attached target: playback control, playlist
//! access and media-library queries. Playback calls are one-line forwarders
//! over the message transport; queries go through the query engine.

use crate::ipc;
use crate::memory::RemoteMemoryChannel;
use crate::query::{self, QueryMode};
use crate::traits::{Messenger, RemoteIo};
use crate::transport::{MessageTransport, TargetWindows};
use tracing::info;
use winampctl_common::{
    Error, ItemRecord, PlaybackStatus, RemoteAddress, Result,
};

/// A controller attached to one running target instance.
///
/// Query methods take `&mut self`: the target mutates a single query
/// struct synchronously, so at most one query may be in flight and the
/// borrow checker enforces the required serialization.
pub struct Controller<B: RemoteIo + Messenger> {
    backend: B,
    windows: TargetWindows,
}

impl<B: RemoteIo + Messenger> Controller<B> {
    pub fn new(backend: B, windows: TargetWindows) -> Self {
        Controller { backend, windows }
    }

    fn memory(&self) -> RemoteMemoryChannel<&B> {
        RemoteMemoryChannel::new(&self.backend)
    }

    fn transport(&self) -> MessageTransport<&B> {
        MessageTransport::new(&self.backend, self.windows)
    }

    // --- transport buttons -------------------------------------------------

    pub fn play(&self) -> Result<()> {
        self.transport().send_command_message(ipc::BUTTON_PLAY)
    }

    pub fn pause(&self) -> Result<()> {
        self.transport().send_command_message(ipc::BUTTON_PAUSE)
    }

    pub fn stop(&self) -> Result<()> {
        self.transport().send_command_message(ipc::BUTTON_STOP)
    }

    pub fn next_track(&self) -> Result<()> {
        self.transport().send_command_message(ipc::BUTTON_NEXT)
    }

    pub fn previous_track(&self) -> Result<()> {
        self.transport().send_command_message(ipc::BUTTON_PREVIOUS)
    }

    /// Sort the playlist editor by path and filename.
    pub fn sort_playlist(&self) -> Result<()> {
        self.transport()
            .send_command_message_to(self.windows.playlist, ipc::ID_PE_S_PATH)
    }

    // --- status and simple state ------------------------------------------

    pub fn playback_status(&self) -> Result<PlaybackStatus> {
        let code = self.transport().send_user_message(ipc::IPC_ISPLAYING, 0)?;
        Ok(PlaybackStatus::from_code(code))
    }

    /// Position of the current track in milliseconds.
    pub fn track_position_ms(&self) -> Result<i32> {
        let v = self
            .transport()
            .send_user_message(ipc::IPC_GETOUTPUTTIME, ipc::OUTPUT_TIME_POSITION_MS)?;
        Ok(v as i32)
    }

    /// Length of the current track in seconds.
    pub fn track_length_s(&self) -> Result<i32> {
        let v = self
            .transport()
            .send_user_message(ipc::IPC_GETOUTPUTTIME, ipc::OUTPUT_TIME_LENGTH_S)?;
        Ok(v as i32)
    }

    /// Set the target's volume. Values outside 0-255 are rejected before
    /// any message is sent.
    pub fn set_volume(&self, volume: u32) -> Result<()> {
        if volume > 255 {
            return Err(Error::InvalidArgument(format!(
                "volume {volume} out of range 0-255"
            )));
        }
        self.transport()
            .send_user_message(ipc::IPC_SETVOLUME, volume as usize)?;
        Ok(())
    }

    /// Move the playlist marker to the given zero-based position.
    pub fn set_playlist_position(&self, position: usize) -> Result<()> {
        self.transport()
            .send_user_message(ipc::IPC_SETPLAYLISTPOS, position)?;
        Ok(())
    }

    pub fn clear_playlist(&self) -> Result<()> {
        self.transport().send_user_message(ipc::IPC_DELETE, 0)?;
        Ok(())
    }

    /// Number of entries in the playlist.
    pub fn list_length(&self) -> Result<usize> {
        let len = self
            .transport()
            .send_user_message(ipc::IPC_GETLISTLENGTH, 0)?;
        Ok(len.max(0) as usize)
    }

    // --- remote-string reads -----------------------------------------------

    /// Filename of the playlist entry at `position`, or `None` when the
    /// target reports no entry there.
    pub fn playlist_file(&self, position: usize) -> Result<Option<String>> {
        self.read_returned_string(ipc::IPC_GETPLAYLISTFILE, position)
    }

    /// Display title of the playlist entry at `position`.
    pub fn playlist_title(&self, position: usize) -> Result<Option<String>> {
        self.read_returned_string(ipc::IPC_GETPLAYLISTTITLE, position)
    }

    /// Title of the currently playing track. The target returns this one
    /// as a wide string.
    pub fn current_title(&self) -> Result<Option<String>> {
        let addr = self
            .transport()
            .send_user_message(ipc::IPC_GET_PLAYING_TITLE, 0)?;
        let addr = RemoteAddress::new(addr as usize);
        if addr.is_null() {
            return Ok(None);
        }
        self.memory().read_wide_string(addr).map(Some)
    }

    fn read_returned_string(&self, code: u32, param: usize) -> Result<Option<String>> {
        let addr = self.transport().send_user_message(code, param)?;
        let addr = RemoteAddress::new(addr as usize);
        if addr.is_null() {
            return Ok(None);
        }
        self.memory().read_cstring(addr).map(Some)
    }

    // --- playlist snapshot / replacement ------------------------------------

    /// Append a file to the playlist. The path travels as a data-block
    /// message the target reads synchronously while handling it.
    pub fn enqueue_file(&self, path: &str) -> Result<()> {
        let mut payload = path.as_bytes().to_vec();
        payload.push(0);
        self.transport()
            .send_data_block(ipc::IPC_ENQUEUEFILE, &payload)?;
        Ok(())
    }

    /// Snapshot of the playlist's filenames, in playlist order. Entries
    /// the target reports no filename for are skipped.
    pub fn playlist_snapshot(&self) -> Result<Vec<String>> {
        let len = self.list_length()?;
        let mut files = Vec::with_capacity(len);
        for position in 0..len {
            if let Some(file) = self.playlist_file(position)? {
                files.push(file);
            }
        }
        Ok(files)
    }

    /// Snapshot of the playlist's display titles, in playlist order.
    pub fn playlist_titles(&self) -> Result<Vec<String>> {
        let len = self.list_length()?;
        let mut titles = Vec::with_capacity(len);
        for position in 0..len {
            if let Some(title) = self.playlist_title(position)? {
                titles.push(title);
            }
        }
        Ok(titles)
    }

    /// Clear the playlist, then enqueue each path in order.
    pub fn replace_playlist<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        info!(count = paths.len(), "replacing playlist");
        self.clear_playlist()?;
        for path in paths {
            self.enqueue_file(path.as_ref())?;
        }
        Ok(())
    }

    // --- media library queries ----------------------------------------------

    /// Run a filter-syntax query, e.g. `artist has "opeth"`.
    pub fn query(&mut self, text: &str) -> Result<Vec<ItemRecord>> {
        self.query_with_limit(text, QueryMode::Literal, 0)
    }

    /// Run a keyword search across every library field.
    pub fn query_keyword(&mut self, text: &str) -> Result<Vec<ItemRecord>> {
        self.query_with_limit(text, QueryMode::Keyword, 0)
    }

    /// Run a query with an explicit mode and result limit (0 = unlimited).
    pub fn query_with_limit(
        &mut self,
        text: &str,
        mode: QueryMode,
        max_results: i32,
    ) -> Result<Vec<ItemRecord>> {
        query::run_query(&self.memory(), &self.transport(), text, mode, max_results)
    }

    /// Queue up an album and start playing it from the top.
    pub fn play_album(&mut self, album: &str) -> Result<()> {
        let items = self.query(&format!("album = \"{album}\""))?;
        let files: Vec<String> = items.into_iter().filter_map(|i| i.filename).collect();
        self.replace_playlist(&files)?;
        self.stop()?;
        self.sort_playlist()?;
        self.set_playlist_position(0)?;
        self.play()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TargetWindows;
    use std::cell::RefCell;
    use winampctl_common::WindowHandle;

    /// Backend that records every transport call and answers user messages
    /// from a small script. Remote memory is a flat planted buffer.
    #[derive(Default)]
    struct ScriptedBackend {
        messages: RefCell<Vec<(u32, usize, isize)>>,
        replies: RefCell<Vec<isize>>,
        planted: RefCell<Vec<(usize, Vec<u8>)>>,
    }

    impl ScriptedBackend {
        fn reply_with(&self, values: &[isize]) {
            // replies are popped from the back
            *self.replies.borrow_mut() = values.iter().rev().copied().collect();
        }

        fn plant(&self, addr: usize, bytes: &[u8]) {
            self.planted.borrow_mut().push((addr, bytes.to_vec()));
        }

        fn message_count(&self) -> usize {
            self.messages.borrow().len()
        }
    }

    impl RemoteIo for ScriptedBackend {
        fn alloc(&self, _size: usize) -> winampctl_common::Result<RemoteAddress> {
            unreachable!("no allocations expected")
        }

        fn free(&self, _addr: RemoteAddress) -> winampctl_common::Result<()> {
            Ok(())
        }

        fn write(&self, _addr: RemoteAddress, _data: &[u8]) -> winampctl_common::Result<usize> {
            unreachable!("no writes expected")
        }

        fn read(&self, addr: RemoteAddress, len: usize) -> winampctl_common::Result<Vec<u8>> {
            let planted = self.planted.borrow();
            let buf = planted
                .iter()
                .find(|(a, _)| *a == addr.raw())
                .map(|(_, b)| b.clone())
                .ok_or(Error::ReadFailed {
                    address: addr.raw(),
                    len,
                })?;
            let mut out = buf;
            out.resize(len, 0);
            Ok(out)
        }
    }

    impl Messenger for ScriptedBackend {
        fn send_message(
            &self,
            _target: WindowHandle,
            msg: u32,
            wparam: usize,
            lparam: isize,
        ) -> winampctl_common::Result<isize> {
            self.messages.borrow_mut().push((msg, wparam, lparam));
            Ok(self.replies.borrow_mut().pop().unwrap_or(0))
        }

        fn send_data_block(
            &self,
            _target: WindowHandle,
            tag: u32,
            data: &[u8],
        ) -> winampctl_common::Result<isize> {
            self.messages
                .borrow_mut()
                .push((ipc::WM_COPYDATA, tag as usize, data.len() as isize));
            Ok(0)
        }
    }

    fn controller(backend: ScriptedBackend) -> Controller<ScriptedBackend> {
        Controller::new(
            backend,
            TargetWindows {
                main: WindowHandle::new(1),
                playlist: WindowHandle::new(2),
                library: WindowHandle::new(3),
            },
        )
    }

    #[test]
    fn test_volume_out_of_range_sends_nothing() {
        let ctl = controller(ScriptedBackend::default());
        let err = ctl.set_volume(256).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(ctl.backend.message_count(), 0);
    }

    #[test]
    fn test_volume_boundary_values_send() {
        let ctl = controller(ScriptedBackend::default());
        ctl.set_volume(0).unwrap();
        ctl.set_volume(255).unwrap();
        assert_eq!(ctl.backend.message_count(), 2);
    }

    #[test]
    fn test_playback_status_decodes_pause() {
        let backend = ScriptedBackend::default();
        backend.reply_with(&[3]);
        let ctl = controller(backend);
        assert_eq!(ctl.playback_status().unwrap(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_playlist_file_null_address_is_none() {
        let backend = ScriptedBackend::default();
        backend.reply_with(&[0]);
        let ctl = controller(backend);
        assert_eq!(ctl.playlist_file(5).unwrap(), None);
    }

    #[test]
    fn test_playlist_file_reads_returned_address() {
        let backend = ScriptedBackend::default();
        backend.reply_with(&[0x7000]);
        backend.plant(0x7000, b"C:\\music\\a.mp3\0");
        let ctl = controller(backend);
        assert_eq!(
            ctl.playlist_file(0).unwrap().as_deref(),
            Some("C:\\music\\a.mp3")
        );
    }

    #[test]
    fn test_current_title_is_wide() {
        let backend = ScriptedBackend::default();
        backend.reply_with(&[0x8000]);
        let wide: Vec<u8> = "Blackwater Park"
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(|u| u.to_le_bytes())
            .collect();
        backend.plant(0x8000, &wide);
        let ctl = controller(backend);
        assert_eq!(
            ctl.current_title().unwrap().as_deref(),
            Some("Blackwater Park")
        );
    }

    #[test]
    fn test_replace_playlist_clears_then_enqueues_in_order() {
        let ctl = controller(ScriptedBackend::default());
        ctl.replace_playlist(&["a.mp3", "b.mp3"]).unwrap();

        let messages = ctl.backend.messages.borrow();
        assert_eq!(messages.len(), 3);
        // clear first
        assert_eq!(messages[0], (ipc::WM_WA_IPC, 0, ipc::IPC_DELETE as isize));
        // then one data block per path, in order ("a.mp3\0" = 6 bytes)
        assert_eq!(
            messages[1],
            (ipc::WM_COPYDATA, ipc::IPC_ENQUEUEFILE as usize, 6)
        );
        assert_eq!(
            messages[2],
            (ipc::WM_COPYDATA, ipc::IPC_ENQUEUEFILE as usize, 6)
        );
    }

    #[test]
    fn test_playlist_snapshot_walks_every_index() {
        let backend = ScriptedBackend::default();
        // list_length, then one address reply per index
        backend.reply_with(&[2, 0x7000, 0x7100]);
        backend.plant(0x7000, b"a.mp3\0");
        backend.plant(0x7100, b"b.mp3\0");
        let ctl = controller(backend);

        let files = ctl.playlist_snapshot().unwrap();
        assert_eq!(files, vec!["a.mp3".to_string(), "b.mp3".to_string()]);
    }

    #[test]
    fn test_output_time_mode_flags() {
        let ctl = controller(ScriptedBackend::default());
        ctl.track_position_ms().unwrap();
        ctl.track_length_s().unwrap();
        let messages = ctl.backend.messages.borrow();
        assert_eq!(
            messages[0],
            (ipc::WM_WA_IPC, 0, ipc::IPC_GETOUTPUTTIME as isize)
        );
        assert_eq!(
            messages[1],
            (ipc::WM_WA_IPC, 1, ipc::IPC_GETOUTPUTTIME as isize)
        );
    }
}
