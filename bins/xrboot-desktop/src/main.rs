#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use xrboot::platform::{self, PlatformCommand};
use xrboot::types::SessionState;
use xrboot::{AppState, BootConfig, DummyBackend, PlatformPump, Program, XrBackend};
use xrboot_openxr::OpenXrBackend;

#[derive(Parser, Debug)]
#[command(name = "xrboot-desktop")]
struct Args {
    /// JSON configuration file; defaults are used when absent.
    #[arg(long, env = "XRBOOT_CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many loop iterations.
    #[arg(long)]
    ticks: Option<u64>,

    /// Run against the scripted in-memory backend instead of a runtime.
    #[arg(long)]
    dummy: bool,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

/// Delivers `start` once, then `destroy` when the iteration budget runs out
/// or the loop asks the host to finish.
struct DesktopPump {
    started: bool,
    remaining: Option<u64>,
    finish_requested: bool,
}

impl DesktopPump {
    fn new(ticks: Option<u64>) -> Self {
        Self {
            started: false,
            remaining: ticks,
            finish_requested: false,
        }
    }
}

impl PlatformPump for DesktopPump {
    fn pump(&mut self, timeout: Option<Duration>, app: &mut AppState) {
        if !self.started {
            self.started = true;
            platform::handle_command(app, PlatformCommand::Start);
            return;
        }

        // No window system here: a blocking wait would never be woken.
        let out_of_budget = self.remaining == Some(0);
        if self.finish_requested || out_of_budget || timeout.is_none() {
            platform::handle_command(app, PlatformCommand::Destroy);
            return;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
    }

    fn finish(&mut self) {
        self.finish_requested = true;
    }

    fn detach(&mut self) {}
}

fn run_host<B: XrBackend>(backend: B, config: BootConfig, ticks: Option<u64>) {
    let mut pump = DesktopPump::new(ticks);
    let mut program = Program::new(backend, config);
    let mut app = AppState::headless();
    let summary = xrboot::run(&mut pump, &mut program, &mut app);
    if summary.bootstrapped {
        info!("session loop ended after {} ticks", summary.ticks);
    } else {
        warn!("bootstrap did not complete");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BootConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => BootConfig::default(),
    };
    let level = args.log_level.as_deref().unwrap_or(&config.log_level);
    xrboot_common::init_tracing_with_default(level);

    info!(
        "xrboot-desktop {} ({})",
        env!("CARGO_PKG_VERSION"),
        config.application_name
    );

    if args.dummy {
        let mut backend = DummyBackend::new();
        backend.push_session_state(SessionState::Ready);
        run_host(backend, config, Some(args.ticks.unwrap_or(90)));
    } else {
        let backend = OpenXrBackend::load().context("loading OpenXR and Vulkan")?;
        run_host(backend, config, args.ticks);
    }
    Ok(())
}
