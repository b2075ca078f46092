//! Outer loop behaviour with a scripted host.

use std::collections::VecDeque;
use std::time::Duration;

use xrboot::platform::handle_command;
use xrboot::types::{RuntimeEvent, SessionState};
use xrboot::{
    run, AppState, BootConfig, DummyBackend, LifecycleState, NativeWindowHandle, PlatformCommand,
    PlatformPump, Program,
};

/// Delivers one batch of commands per pump call and records how it was
/// asked to wait.
#[derive(Default)]
struct ScriptedPump {
    batches: VecDeque<Vec<PlatformCommand>>,
    timeouts: Vec<Option<Duration>>,
    finish_calls: usize,
    detached: bool,
}

impl ScriptedPump {
    fn new(batches: Vec<Vec<PlatformCommand>>) -> Self {
        Self {
            batches: batches.into(),
            ..Self::default()
        }
    }
}

impl PlatformPump for ScriptedPump {
    fn pump(&mut self, timeout: Option<Duration>, app: &mut AppState) {
        self.timeouts.push(timeout);
        // An exhausted script behaves like the host tearing the activity down.
        let batch = self
            .batches
            .pop_front()
            .unwrap_or_else(|| vec![PlatformCommand::Destroy]);
        for command in batch {
            handle_command(app, command);
        }
    }

    fn finish(&mut self) {
        self.finish_calls += 1;
    }

    fn detach(&mut self) {
        self.detached = true;
    }
}

fn window() -> PlatformCommand {
    PlatformCommand::InitWindow {
        window: NativeWindowHandle(0xbeef),
        width: 1832,
        height: 1920,
    }
}

#[test]
fn test_window_then_start_bootstraps_and_begins_session() {
    let mut backend = DummyBackend::new();
    backend.push_session_state(SessionState::Ready);
    let mut program = Program::new(backend, BootConfig::default());
    let mut app = AppState::new();
    let mut pump = ScriptedPump::new(vec![
        vec![window()],
        vec![PlatformCommand::Start],
        vec![],
        vec![PlatformCommand::Destroy],
    ]);

    let summary = run(&mut pump, &mut program, &mut app);

    assert!(summary.bootstrapped);
    assert_eq!(summary.ticks, 2);
    assert_eq!(program.backend().call_count("create_session"), 1);
    assert_eq!(program.backend().call_count("begin_session"), 1);
    assert_eq!(program.lifecycle().state(), LifecycleState::Running);
    assert!(program.lifecycle().session_running());
    assert!(program.is_shut_down());
    assert_eq!(program.backend().live_objects(), 0);
    assert_eq!(pump.finish_calls, 1);
    assert!(pump.detached);
}

#[test]
fn test_bootstrap_waits_for_window() {
    let mut program = Program::new(DummyBackend::new(), BootConfig::default());
    let mut app = AppState::new();
    let mut pump = ScriptedPump::new(vec![
        vec![PlatformCommand::Start],
        vec![],
        vec![PlatformCommand::Destroy],
    ]);

    let summary = run(&mut pump, &mut program, &mut app);
    assert!(!summary.bootstrapped);
    assert!(program.backend().calls.is_empty());
    assert_eq!(summary.ticks, 0);
}

#[test]
fn test_loss_pending_leads_to_destroy_without_session_calls() {
    let mut backend = DummyBackend::new();
    backend.push_session_state(SessionState::Ready);
    backend.end_poll_round();
    backend.push_session_state(SessionState::LossPending);
    let mut program = Program::new(backend, BootConfig::default());
    let mut app = AppState::new();
    let mut pump = ScriptedPump::new(vec![
        vec![window(), PlatformCommand::Start],
        vec![],
        vec![],
        vec![],
        vec![PlatformCommand::Destroy],
    ]);

    let summary = run(&mut pump, &mut program, &mut app);

    assert!(summary.bootstrapped);
    assert_eq!(summary.ticks, 2);
    assert!(!app.running);
    assert!(!program.lifecycle().session_running());
    assert_eq!(program.lifecycle().state(), LifecycleState::LossPending);
    assert_eq!(pump.finish_calls, 1);

    // Once terminal the loop only blocks in the pump.
    assert_eq!(&pump.timeouts[2..], &[None, None, None]);

    let backend = program.backend();
    let loss_poll = backend
        .calls
        .iter()
        .rposition(|call| *call == "poll_event")
        .unwrap();
    let after_loss = &backend.calls[loss_poll + 1..];
    for call in after_loss {
        assert!(call.starts_with("destroy_"), "unexpected call {call}");
    }
    assert_eq!(backend.call_count("wait_frame"), 1);
    assert_eq!(backend.live_objects(), 0);
}

#[test]
fn test_instance_loss_stops_the_loop() {
    let mut backend = DummyBackend::new();
    backend.push_event(RuntimeEvent::InstanceLossPending);
    let mut program = Program::new(backend, BootConfig::default());
    let mut app = AppState::headless();
    let mut pump = ScriptedPump::new(vec![vec![PlatformCommand::Start]]);

    let summary = run(&mut pump, &mut program, &mut app);
    assert_eq!(summary.ticks, 1);
    assert_eq!(program.lifecycle().state(), LifecycleState::InstanceLost);
    assert!(!program.backend().called("wait_frame"));
    assert_eq!(pump.finish_calls, 1);
}

#[test]
fn test_failed_bootstrap_is_not_retried() {
    let mut backend = DummyBackend::new();
    backend.fail_on("create_vk_device");
    let mut program = Program::new(backend, BootConfig::default());
    let mut app = AppState::headless();
    let mut pump = ScriptedPump::new(vec![
        vec![PlatformCommand::Start],
        vec![PlatformCommand::Resume],
        vec![PlatformCommand::Destroy],
    ]);

    let summary = run(&mut pump, &mut program, &mut app);
    assert!(!summary.bootstrapped);
    assert_eq!(summary.ticks, 0);
    assert_eq!(program.backend().call_count("create_vk_device"), 1);
    assert_eq!(program.backend().live_objects(), 0);
    assert_eq!(pump.finish_calls, 1);
}

#[test]
fn test_pause_blocks_pump_until_resume() {
    let mut program = Program::new(DummyBackend::new(), BootConfig::default());
    let mut app = AppState::headless();
    let mut pump = ScriptedPump::new(vec![
        vec![PlatformCommand::Start],
        vec![PlatformCommand::Pause],
        vec![PlatformCommand::Resume],
        vec![PlatformCommand::Destroy],
    ]);

    run(&mut pump, &mut program, &mut app);
    assert_eq!(
        pump.timeouts,
        vec![None, Some(Duration::ZERO), None, Some(Duration::ZERO)]
    );
}

#[test]
fn test_resume_after_exit_keeps_pump_blocking() {
    let mut backend = DummyBackend::new();
    backend.push_session_state(SessionState::Ready);
    backend.push_session_state(SessionState::Exiting);
    let mut program = Program::new(backend, BootConfig::default());
    let mut app = AppState::headless();
    let mut pump = ScriptedPump::new(vec![
        vec![PlatformCommand::Start],
        vec![PlatformCommand::Resume],
        vec![],
        vec![PlatformCommand::Destroy],
    ]);

    let summary = run(&mut pump, &mut program, &mut app);
    assert_eq!(summary.ticks, 1);
    assert_eq!(program.lifecycle().state(), LifecycleState::Exiting);
    assert_eq!(pump.finish_calls, 1);
    assert_eq!(pump.timeouts, vec![None, None, None, None]);
    assert!(!app.running);
}
