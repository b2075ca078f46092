//! Session state machine driven by the runtime event queue.

use crate::backend::XrBackend;
use crate::platform::AppState;
use crate::types::{RuntimeEvent, SessionHandle, SessionState, ViewConfigurationType};
use crate::BootResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, waiting for the runtime to report `Ready`.
    Idle,
    /// Session begun with the stereo view configuration.
    Running,
    /// Session ended after the runtime reported `Stopping`.
    Stopping,
    Exiting,
    LossPending,
    /// The runtime announced instance loss.
    InstanceLost,
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exiting | Self::LossPending | Self::InstanceLost)
    }
}

#[derive(Debug, Clone)]
pub struct SessionLifecycle {
    state: LifecycleState,
    session_running: bool,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Idle,
            session_running: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn session_running(&self) -> bool {
        self.session_running
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Applies one runtime event.
    ///
    /// A failing begin/end call is returned unchanged and leaves the state as
    /// it was before the event.
    pub fn handle_event<B: XrBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        session: SessionHandle,
        view_type: ViewConfigurationType,
        event: RuntimeEvent,
        app: &mut AppState,
    ) -> BootResult<()> {
        match event {
            RuntimeEvent::SessionStateChanged {
                session: changed,
                state,
            } => {
                if changed != session {
                    log::warn!(
                        "[Lifecycle] Received session state changed for unknown session {:#x}",
                        changed.as_raw()
                    );
                    return Ok(());
                }
                self.handle_state(backend, session, view_type, state, app)
            }
            RuntimeEvent::EventsLost { lost_event_count } => {
                log::warn!("[Lifecycle] EVENTS_LOST: Lost events: {lost_event_count}");
                Ok(())
            }
            RuntimeEvent::InstanceLossPending => {
                log::warn!("[Lifecycle] Instance loss pending");
                self.terminate(LifecycleState::InstanceLost, app);
                Ok(())
            }
            RuntimeEvent::Other => {
                log::debug!("[Lifecycle] Ignoring runtime event");
                Ok(())
            }
        }
    }

    fn handle_state<B: XrBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        session: SessionHandle,
        view_type: ViewConfigurationType,
        state: SessionState,
        app: &mut AppState,
    ) -> BootResult<()> {
        match state {
            SessionState::Ready => match self.state {
                LifecycleState::Idle | LifecycleState::Stopping => {
                    backend.begin_session(session, view_type)?;
                    self.state = LifecycleState::Running;
                    self.session_running = true;
                    log::info!("[Lifecycle] Session begun");
                }
                other => log::warn!("[Lifecycle] READY while {other:?}, not beginning session"),
            },
            SessionState::Stopping => {
                if self.state == LifecycleState::Running {
                    backend.end_session(session)?;
                    self.state = LifecycleState::Stopping;
                    self.session_running = false;
                    log::info!("[Lifecycle] Session ended");
                } else {
                    log::warn!("[Lifecycle] STOPPING while {:?}, ignoring", self.state);
                }
            }
            SessionState::Exiting => self.terminate(LifecycleState::Exiting, app),
            SessionState::LossPending => self.terminate(LifecycleState::LossPending, app),
            other => {
                log::warn!("[Lifecycle] SESSION_STATE_CHANGED: Unhandled event: {other:?}");
            }
        }
        Ok(())
    }

    fn terminate(&mut self, state: LifecycleState, app: &mut AppState) {
        log::info!("[Lifecycle] {:?} -> {:?}", self.state, state);
        self.state = state;
        self.session_running = false;
        app.running = false;
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
