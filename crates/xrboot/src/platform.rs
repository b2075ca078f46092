//! Host lifecycle record and the asset boundary.
//!
//! [`AppState`] is owned by the outer loop and passed by reference to the
//! command handler and to [`crate::Program::tick`]; nothing here is global.

use std::time::Duration;

use xrboot_common::{BootConfig, CONFIG_ASSET};

use crate::BootResult;

/// Opaque native window pointer (an `ANativeWindow*` on Android).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeWindowHandle(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// The host has delivered `start`.
    pub started: bool,
    /// Application-level running flag; cleared by `pause` and by terminal
    /// session states.
    pub running: bool,
    pub native_window: Option<NativeWindowHandle>,
    pub width: u32,
    pub height: u32,
    /// Authoritative terminal signal for the outer loop.
    pub destroy_requested: bool,
    /// Bootstrap waits for a native window before it runs.
    pub window_required: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            started: false,
            running: false,
            native_window: None,
            width: 0,
            height: 0,
            destroy_requested: false,
            window_required: true,
        }
    }

    /// State for hosts without a native window, such as desktop runtimes
    /// that composite on their own.
    pub fn headless() -> Self {
        Self {
            window_required: false,
            ..Self::new()
        }
    }

    pub fn ready_for_bootstrap(&self) -> bool {
        self.started
            && !self.destroy_requested
            && (!self.window_required || self.native_window.is_some())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle notification from the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCommand {
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
    InitWindow {
        window: NativeWindowHandle,
        width: u32,
        height: u32,
    },
    TermWindow,
    /// Anything else the host reports; logged only.
    Other(String),
}

pub fn handle_command(app: &mut AppState, command: PlatformCommand) {
    match command {
        PlatformCommand::Start => {
            log::info!("[Platform] start");
            app.started = true;
            app.running = true;
        }
        PlatformCommand::Resume => {
            log::info!("[Platform] resume");
            app.running = true;
        }
        PlatformCommand::Pause => {
            log::info!("[Platform] pause");
            app.running = false;
        }
        PlatformCommand::Stop => log::info!("[Platform] stop"),
        PlatformCommand::Destroy => {
            log::info!("[Platform] destroy");
            app.native_window = None;
            app.destroy_requested = true;
        }
        PlatformCommand::InitWindow {
            window,
            width,
            height,
        } => {
            log::info!("[Platform] init window {width}x{height}");
            app.native_window = Some(window);
            app.width = width;
            app.height = height;
        }
        PlatformCommand::TermWindow => {
            log::info!("[Platform] term window");
            app.native_window = None;
        }
        PlatformCommand::Other(name) => {
            log::warn!("[Platform] unhandled command {name}");
        }
    }
}

/// How long the host pump may wait for the next command.
///
/// `None` blocks until a command arrives; that only happens while the app is
/// not running and no destroy is pending.
pub fn poll_timeout(app: &AppState) -> Option<Duration> {
    if !app.running && !app.destroy_requested {
        None
    } else {
        Some(Duration::ZERO)
    }
}

/// Read-bytes-by-path access to packaged assets.
pub trait AssetSource {
    /// `Ok(None)` when the asset does not exist.
    fn read(&self, path: &str) -> BootResult<Option<Vec<u8>>>;
}

/// Configuration from the packaged asset, or defaults.
pub fn load_config<A: AssetSource + ?Sized>(assets: &A) -> BootConfig {
    match assets.read(CONFIG_ASSET) {
        Ok(Some(bytes)) => match BootConfig::from_json(&bytes) {
            Ok(config) => config,
            Err(err) => {
                log::error!("[Platform] {CONFIG_ASSET} is invalid, using defaults: {err}");
                BootConfig::default()
            }
        },
        Ok(None) => BootConfig::default(),
        Err(err) => {
            log::error!("[Platform] could not read {CONFIG_ASSET}, using defaults: {err}");
            BootConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapAssets(HashMap<String, Vec<u8>>);

    impl AssetSource for MapAssets {
        fn read(&self, path: &str) -> BootResult<Option<Vec<u8>>> {
            Ok(self.0.get(path).cloned())
        }
    }

    #[test]
    fn test_start_and_window_enable_bootstrap() {
        let mut app = AppState::new();
        assert!(!app.ready_for_bootstrap());
        handle_command(
            &mut app,
            PlatformCommand::InitWindow {
                window: NativeWindowHandle(0x1000),
                width: 1832,
                height: 1920,
            },
        );
        assert!(!app.ready_for_bootstrap());
        handle_command(&mut app, PlatformCommand::Start);
        assert!(app.ready_for_bootstrap());
        assert_eq!((app.width, app.height), (1832, 1920));
    }

    #[test]
    fn test_headless_needs_only_start() {
        let mut app = AppState::headless();
        handle_command(&mut app, PlatformCommand::Start);
        assert!(app.ready_for_bootstrap());
    }

    #[test]
    fn test_pause_resume_toggle_running() {
        let mut app = AppState::new();
        handle_command(&mut app, PlatformCommand::Start);
        handle_command(&mut app, PlatformCommand::Pause);
        assert!(!app.running);
        assert_eq!(poll_timeout(&app), None);
        handle_command(&mut app, PlatformCommand::Resume);
        assert!(app.running);
        assert_eq!(poll_timeout(&app), Some(Duration::ZERO));
    }

    #[test]
    fn test_destroy_clears_window_and_stops_blocking() {
        let mut app = AppState::new();
        handle_command(
            &mut app,
            PlatformCommand::InitWindow {
                window: NativeWindowHandle(1),
                width: 1,
                height: 1,
            },
        );
        handle_command(&mut app, PlatformCommand::Destroy);
        assert!(app.destroy_requested);
        assert!(app.native_window.is_none());
        assert_eq!(poll_timeout(&app), Some(Duration::ZERO));
    }

    #[test]
    fn test_stop_and_unknown_commands_change_nothing() {
        let mut app = AppState::new();
        handle_command(&mut app, PlatformCommand::Start);
        let before = app.clone();
        handle_command(&mut app, PlatformCommand::Stop);
        handle_command(&mut app, PlatformCommand::Other("LowMemory".into()));
        assert_eq!(app, before);
    }

    #[test]
    fn test_config_from_assets() {
        let mut files = HashMap::new();
        files.insert(
            CONFIG_ASSET.to_string(),
            br#"{"application_name": "quest"}"#.to_vec(),
        );
        assert_eq!(load_config(&MapAssets(files)).application_name, "quest");
        assert_eq!(load_config(&MapAssets(HashMap::new())), BootConfig::default());
    }

    #[test]
    fn test_invalid_config_asset_falls_back_to_defaults() {
        let mut files = HashMap::new();
        files.insert(CONFIG_ASSET.to_string(), b"{oops".to_vec());
        assert_eq!(load_config(&MapAssets(files)), BootConfig::default());
    }
}
