use std::ffi::CString;
use std::io::Read;
use std::time::Duration;

use android_activity::{AndroidApp, MainEvent, PollEvent};
use jni::{AttachGuard, JavaVM};
use log::LevelFilter;

use xrboot::platform::{self, AssetSource, NativeWindowHandle, PlatformCommand};
use xrboot::{AppState, BootError, BootResult, Program};
use xrboot_openxr::OpenXrBackend;

const LOG_TAG: &str = "xrboot";

#[no_mangle]
fn android_main(app: AndroidApp) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_tag(LOG_TAG)
            .with_max_level(LevelFilter::Trace),
    );

    let config = platform::load_config(&AndroidAssets(app.clone()));
    log::set_max_level(config.log_level.parse().unwrap_or(LevelFilter::Info));
    log::info!("[Android] starting {}", config.application_name);

    let vm = match unsafe { JavaVM::from_raw(app.vm_as_ptr().cast()) } {
        Ok(vm) => vm,
        Err(err) => {
            log::error!("[Android] no Java VM: {err}");
            return;
        }
    };
    let env = match vm.attach_current_thread() {
        Ok(env) => Some(env),
        Err(err) => {
            log::error!("[Android] attach current thread failed: {err}");
            None
        }
    };

    let backend = match OpenXrBackend::load() {
        Ok(backend) => backend,
        Err(err) => {
            log::error!("[Android] {err}");
            return;
        }
    };

    let mut pump = AndroidPump {
        app,
        env,
        finished: false,
    };
    let mut program = Program::new(backend, config);
    let mut state = AppState::new();
    let summary = xrboot::run(&mut pump, &mut program, &mut state);
    log::info!(
        "[Android] exiting after {} ticks (bootstrapped: {})",
        summary.ticks,
        summary.bootstrapped
    );
}

struct AndroidPump<'vm> {
    app: AndroidApp,
    /// Detaches the loop thread on drop if this host attached it.
    env: Option<AttachGuard<'vm>>,
    finished: bool,
}

impl AndroidPump<'_> {
    fn translate(&self, event: MainEvent<'_>) -> Option<PlatformCommand> {
        let command = match event {
            MainEvent::Start => PlatformCommand::Start,
            MainEvent::Resume { .. } => PlatformCommand::Resume,
            MainEvent::Pause => PlatformCommand::Pause,
            MainEvent::Stop => PlatformCommand::Stop,
            MainEvent::Destroy => PlatformCommand::Destroy,
            MainEvent::InitWindow { .. } => {
                let window = self.app.native_window()?;
                PlatformCommand::InitWindow {
                    window: NativeWindowHandle(window.ptr().as_ptr() as usize),
                    width: u32::try_from(window.width()).unwrap_or(0),
                    height: u32::try_from(window.height()).unwrap_or(0),
                }
            }
            MainEvent::TerminateWindow { .. } => PlatformCommand::TermWindow,
            MainEvent::GainedFocus => PlatformCommand::Other("gained focus".to_string()),
            MainEvent::LostFocus => PlatformCommand::Other("lost focus".to_string()),
            MainEvent::LowMemory => PlatformCommand::Other("low memory".to_string()),
            // Redraw and input notifications arrive every frame.
            _ => return None,
        };
        Some(command)
    }
}

impl xrboot::PlatformPump for AndroidPump<'_> {
    fn pump(&mut self, timeout: Option<Duration>, app: &mut AppState) {
        let mut commands = Vec::new();
        self.app.poll_events(timeout, |event| {
            if let PollEvent::Main(main) = event {
                commands.extend(self.translate(main));
            }
        });
        for command in commands {
            platform::handle_command(app, command);
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        log::info!("[Android] finishing activity");
        unsafe { ndk_sys::ANativeActivity_finish(self.app.activity_as_ptr().cast()) };
    }

    fn detach(&mut self) {
        if self.env.take().is_some() {
            log::info!("[Android] detached loop thread");
        }
    }
}

/// Packaged assets read through the activity's asset manager.
struct AndroidAssets(AndroidApp);

impl AssetSource for AndroidAssets {
    fn read(&self, path: &str) -> BootResult<Option<Vec<u8>>> {
        let name = CString::new(path)
            .map_err(|_| BootError::Config(format!("asset path {path:?} contains NUL")))?;
        let Some(mut asset) = self.0.asset_manager().open(&name) else {
            return Ok(None);
        };
        let mut bytes = Vec::new();
        asset
            .read_to_end(&mut bytes)
            .map_err(|err| BootError::Config(format!("{path}: {err}")))?;
        Ok(Some(bytes))
    }
}
