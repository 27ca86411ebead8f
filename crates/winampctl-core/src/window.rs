//! Window hierarchy resolution
//!
//! The target exposes its message-capable endpoints as nested windows. A
//! chain of (class, title) pairs is resolved once at attach time: the first
//! element as a top-level search, every subsequent element as a child
//! search rooted at the previous result. No retries; discovery is either
//! instantaneous or impossible.

use crate::traits::WindowFinder;
use crate::transport::TargetWindows;
use tracing::{debug, trace};
use winampctl_common::{Error, Result, WindowHandle};

/// One step of a window chain. `None` matches any class or title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub class: Option<&'static str>,
    pub title: Option<&'static str>,
}

impl WindowSpec {
    pub const fn new(class: Option<&'static str>, title: Option<&'static str>) -> Self {
        WindowSpec { class, title }
    }
}

/// Chain for the main control surface
pub const MAIN_WINDOW_CHAIN: &[WindowSpec] = &[WindowSpec::new(Some("Winamp v1.x"), None)];

/// Chain for the playlist editor surface
pub const PLAYLIST_WINDOW_CHAIN: &[WindowSpec] = &[
    WindowSpec::new(Some("BaseWindow_RootWnd"), None),
    WindowSpec::new(Some("BaseWindow_RootWnd"), Some("Playlist Editor")),
    WindowSpec::new(Some("Winamp PE"), Some("Winamp Playlist Editor")),
];

/// Chain for the media library surface
pub const LIBRARY_WINDOW_CHAIN: &[WindowSpec] = &[
    WindowSpec::new(Some("BaseWindow_RootWnd"), None),
    WindowSpec::new(Some("BaseWindow_RootWnd"), Some("Winamp Library")),
    WindowSpec::new(Some("Winamp Gen"), Some("Winamp Library")),
    WindowSpec::new(None, None),
];

/// Resolve a window chain to the handle of its last element.
pub fn resolve_chain<F: WindowFinder>(finder: &F, chain: &[WindowSpec]) -> Result<WindowHandle> {
    let mut current: Option<WindowHandle> = None;

    for (step, spec) in chain.iter().enumerate() {
        let found = match current {
            None => finder.find_top_level(spec.class, spec.title),
            Some(parent) => finder.find_child(parent, spec.class, spec.title),
        };

        match found {
            Some(handle) => {
                trace!(step, class = ?spec.class, title = ?spec.title, handle = handle.raw(), "resolved window step");
                current = Some(handle);
            }
            None => {
                debug!(step, class = ?spec.class, title = ?spec.title, "window chain step not found");
                return Err(Error::TargetNotFound {
                    step,
                    class: spec.class.unwrap_or("*").to_string(),
                    title: spec.title.unwrap_or("*").to_string(),
                });
            }
        }
    }

    current.ok_or_else(|| Error::TargetNotFound {
        step: 0,
        class: "*".to_string(),
        title: "*".to_string(),
    })
}

/// Resolve all three message endpoints of a running target. Any unresolved
/// chain means the target is not running or has not created that surface
/// yet; either way the error is `TargetNotFound` with the failing step.
pub fn resolve_target_windows<F: WindowFinder>(finder: &F) -> Result<TargetWindows> {
    Ok(TargetWindows {
        main: resolve_chain(finder, MAIN_WINDOW_CHAIN)?,
        playlist: resolve_chain(finder, PLAYLIST_WINDOW_CHAIN)?,
        library: resolve_chain(finder, LIBRARY_WINDOW_CHAIN)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fake hierarchy: top-level windows keyed by (class, title), children
    /// keyed by (parent, class, title). A `None` key entry matches the
    /// wildcard lookup the chain's last step uses.
    #[derive(Default)]
    struct FakeFinder {
        top: HashMap<(Option<String>, Option<String>), isize>,
        children: HashMap<(isize, Option<String>, Option<String>), isize>,
    }

    impl FakeFinder {
        fn key(class: Option<&str>, title: Option<&str>) -> (Option<String>, Option<String>) {
            (class.map(str::to_string), title.map(str::to_string))
        }
    }

    impl WindowFinder for FakeFinder {
        fn find_top_level(&self, class: Option<&str>, title: Option<&str>) -> Option<WindowHandle> {
            self.top
                .get(&Self::key(class, title))
                .map(|&h| WindowHandle::new(h))
        }

        fn find_child(
            &self,
            parent: WindowHandle,
            class: Option<&str>,
            title: Option<&str>,
        ) -> Option<WindowHandle> {
            let (c, t) = Self::key(class, title);
            self.children
                .get(&(parent.raw(), c, t))
                .map(|&h| WindowHandle::new(h))
        }
    }

    #[test]
    fn test_resolve_single_step() {
        let mut finder = FakeFinder::default();
        finder
            .top
            .insert(FakeFinder::key(Some("Winamp v1.x"), None), 0x10);

        let handle = resolve_chain(&finder, MAIN_WINDOW_CHAIN).unwrap();
        assert_eq!(handle.raw(), 0x10);
    }

    #[test]
    fn test_resolve_nested_chain_with_wildcard_tail() {
        let mut finder = FakeFinder::default();
        finder
            .top
            .insert(FakeFinder::key(Some("BaseWindow_RootWnd"), None), 0x20);
        finder.children.insert(
            (
                0x20,
                Some("BaseWindow_RootWnd".into()),
                Some("Winamp Library".into()),
            ),
            0x21,
        );
        finder.children.insert(
            (0x21, Some("Winamp Gen".into()), Some("Winamp Library".into())),
            0x22,
        );
        finder.children.insert((0x22, None, None), 0x23);

        let handle = resolve_chain(&finder, LIBRARY_WINDOW_CHAIN).unwrap();
        assert_eq!(handle.raw(), 0x23);
    }

    #[test]
    fn test_resolve_fails_mid_chain() {
        let mut finder = FakeFinder::default();
        finder
            .top
            .insert(FakeFinder::key(Some("BaseWindow_RootWnd"), None), 0x20);

        let err = resolve_chain(&finder, PLAYLIST_WINDOW_CHAIN).unwrap_err();
        match err {
            Error::TargetNotFound { step, .. } => assert_eq!(step, 1),
            other => panic!("expected TargetNotFound, got {other}"),
        }
    }

    fn full_hierarchy() -> FakeFinder {
        let mut finder = FakeFinder::default();
        finder
            .top
            .insert(FakeFinder::key(Some("Winamp v1.x"), None), 0x10);
        finder
            .top
            .insert(FakeFinder::key(Some("BaseWindow_RootWnd"), None), 0x20);
        finder.children.insert(
            (
                0x20,
                Some("BaseWindow_RootWnd".into()),
                Some("Playlist Editor".into()),
            ),
            0x30,
        );
        finder.children.insert(
            (
                0x30,
                Some("Winamp PE".into()),
                Some("Winamp Playlist Editor".into()),
            ),
            0x31,
        );
        finder.children.insert(
            (
                0x20,
                Some("BaseWindow_RootWnd".into()),
                Some("Winamp Library".into()),
            ),
            0x40,
        );
        finder.children.insert(
            (0x40, Some("Winamp Gen".into()), Some("Winamp Library".into())),
            0x41,
        );
        finder.children.insert((0x41, None, None), 0x42);
        finder
    }

    #[test]
    fn test_resolve_target_windows_all_surfaces() {
        let windows = resolve_target_windows(&full_hierarchy()).unwrap();
        assert_eq!(windows.main.raw(), 0x10);
        assert_eq!(windows.playlist.raw(), 0x31);
        assert_eq!(windows.library.raw(), 0x42);
    }

    // Every unresolved surface reports the same error kind: the target is
    // not running (or has not created that window), never an attach fault.
    #[test]
    fn test_missing_library_surface_is_target_not_found() {
        let mut finder = full_hierarchy();
        finder.children.remove(&(0x41, None, None));

        let err = resolve_target_windows(&finder).unwrap_err();
        match err {
            Error::TargetNotFound { step, .. } => assert_eq!(step, 3),
            other => panic!("expected TargetNotFound, got {other}"),
        }
    }

    #[test]
    fn test_missing_main_window_is_target_not_found() {
        let err = resolve_target_windows(&FakeFinder::default()).unwrap_err();
        assert!(matches!(err, Error::TargetNotFound { step: 0, .. }));
    }

    #[test]
    fn test_resolve_fails_at_top_level() {
        let finder = FakeFinder::default();
        let err = resolve_chain(&finder, MAIN_WINDOW_CHAIN).unwrap_err();
        match err {
            Error::TargetNotFound { step, class, .. } => {
                assert_eq!(step, 0);
                assert_eq!(class, "Winamp v1.x");
            }
            other => panic!("expected TargetNotFound, got {other}"),
        }
    }
}
