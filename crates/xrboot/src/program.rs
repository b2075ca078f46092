use xrboot_common::BootConfig;

use crate::backend::XrBackend;
use crate::builder::{self, DeviceBundle};
use crate::ledger::ResourceLedger;
use crate::lifecycle::SessionLifecycle;
use crate::platform::AppState;
use crate::session::{self, ReferenceSpaces};
use crate::swapchain::{self, SwapchainSet};
use crate::types::{FrameState, SessionHandle};
use crate::{BootError, BootResult};

/// Explicit bootstrap context: the backend, everything created through it
/// and the session lifecycle.
///
/// A program is inert until [`Program::init`] succeeds; after a failed init
/// or [`Program::shutdown`] every tick is a no-op.
pub struct Program<B: XrBackend> {
    backend: B,
    config: BootConfig,
    ledger: ResourceLedger,
    device: Option<DeviceBundle>,
    session: Option<SessionHandle>,
    spaces: ReferenceSpaces,
    swapchains: Option<SwapchainSet>,
    lifecycle: SessionLifecycle,
    last_frame: Option<FrameState>,
    shut_down: bool,
}

impl<B: XrBackend> Program<B> {
    pub fn new(backend: B, config: BootConfig) -> Self {
        Self {
            backend,
            config,
            ledger: ResourceLedger::new(),
            device: None,
            session: None,
            spaces: ReferenceSpaces::default(),
            swapchains: None,
            lifecycle: SessionLifecycle::new(),
            last_frame: None,
            shut_down: false,
        }
    }

    /// Runs device, session, space and swapchain creation.
    ///
    /// On failure everything already created is destroyed and the error is
    /// returned; there is no retry. A second call after success is rejected
    /// with [`BootError::AlreadyInitialized`].
    pub fn init(&mut self) -> BootResult<()> {
        if self.shut_down {
            return Err(BootError::NotInitialized);
        }
        if self.device.is_some() || self.session.is_some() {
            return Err(BootError::AlreadyInitialized);
        }
        match self.bootstrap() {
            Ok(()) => {
                log::info!("[Program] Bootstrap complete");
                Ok(())
            }
            Err(err) => {
                log::error!("[Program] Bootstrap failed: {err}");
                self.shutdown();
                Err(err)
            }
        }
    }

    fn bootstrap(&mut self) -> BootResult<()> {
        let device = builder::build_device(&mut self.backend, &self.config, &mut self.ledger)?;
        let session = session::create_session(&mut self.backend, &device, &mut self.ledger)?;
        self.spaces =
            session::create_reference_spaces(&mut self.backend, session, &mut self.ledger)?;
        let swapchains =
            swapchain::build_swapchains(&mut self.backend, &device, session, &mut self.ledger)?;

        self.device = Some(device);
        self.session = Some(session);
        self.swapchains = Some(swapchains);
        Ok(())
    }

    /// One XR tick: drain the event queue, then wait for the next frame if
    /// the session is running. Errors end the tick early and are logged.
    pub fn tick(&mut self, app: &mut AppState) {
        if let Err(err) = self.try_tick(app) {
            log::error!("[Program] Tick aborted: {err}");
        }
    }

    fn try_tick(&mut self, app: &mut AppState) -> BootResult<()> {
        let (Some(device), Some(session), Some(swapchains)) =
            (&self.device, self.session, &self.swapchains)
        else {
            return Ok(());
        };
        if self.lifecycle.is_terminal() {
            return Ok(());
        }
        let instance = device.instance;
        let view_type = swapchains.view_type;
        let blend_mode = swapchains.blend_mode;

        while let Some(event) = self.backend.poll_event(instance)? {
            self.lifecycle
                .handle_event(&mut self.backend, session, view_type, event, app)?;
            if self.lifecycle.is_terminal() {
                return Ok(());
            }
        }

        if !self.lifecycle.session_running() {
            return Ok(());
        }

        let frame = self.backend.wait_frame(session)?;
        self.last_frame = Some(frame);
        if self.config.submit_empty_frames {
            self.backend.begin_frame(session)?;
            self.backend
                .end_frame(session, frame.predicted_display_time_ns, blend_mode)?;
        }
        Ok(())
    }

    /// Destroys every created object in reverse dependency order. Safe to
    /// call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let released = self.ledger.teardown(&mut self.backend);
        self.device = None;
        self.session = None;
        self.spaces = ReferenceSpaces::default();
        self.swapchains = None;
        log::info!("[Program] Shut down, released {released} objects");
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &SessionLifecycle {
        &self.lifecycle
    }

    pub fn device(&self) -> Option<&DeviceBundle> {
        self.device.as_ref()
    }

    pub fn session(&self) -> Option<SessionHandle> {
        self.session
    }

    pub fn reference_spaces(&self) -> &ReferenceSpaces {
        &self.spaces
    }

    pub fn swapchains(&self) -> Option<&SwapchainSet> {
        self.swapchains.as_ref()
    }

    /// Timing of the most recent frame wait.
    pub fn frame_state(&self) -> Option<FrameState> {
        self.last_frame
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// The session reached a state the program cannot continue from.
    pub fn exit_requested(&self) -> bool {
        self.lifecycle.is_terminal()
    }
}

impl<B: XrBackend> Drop for Program<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
