//! Outer application loop shared by every host.

use std::time::Duration;

use crate::backend::XrBackend;
use crate::platform::{self, AppState};
use crate::program::Program;

/// Host side of the loop: delivers platform commands and owns the process
/// exit calls.
pub trait PlatformPump {
    /// Applies pending host commands to `app`, waiting at most `timeout` for
    /// the first one. `None` waits until a command arrives.
    fn pump(&mut self, timeout: Option<Duration>, app: &mut AppState);

    /// Asks the host to close the activity; destroy follows later.
    fn finish(&mut self);

    /// Releases the host runtime attachment of the loop thread.
    fn detach(&mut self);
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub bootstrapped: bool,
    pub finish_requested: bool,
}

/// Pumps host commands and ticks `program` until destroy is requested.
///
/// Bootstrap runs once, the first time `app` is ready for it. A terminal
/// session state or a failed bootstrap asks the host to finish; the loop then
/// blocks in the pump until destroy arrives. The program is shut down before
/// the host is detached.
pub fn run<P, B>(pump: &mut P, program: &mut Program<B>, app: &mut AppState) -> RunSummary
where
    P: PlatformPump + ?Sized,
    B: XrBackend,
{
    let mut summary = RunSummary {
        ticks: 0,
        bootstrapped: false,
        finish_requested: false,
    };
    let mut attempted = false;

    while !app.destroy_requested {
        pump.pump(platform::poll_timeout(app), app);
        if app.destroy_requested {
            break;
        }
        // A resume after finish must not wake the loop again.
        if summary.finish_requested {
            app.running = false;
        }

        if !attempted && app.ready_for_bootstrap() {
            attempted = true;
            summary.bootstrapped = program.init().is_ok();
            if !summary.bootstrapped {
                app.running = false;
            }
        }

        if program.is_initialized() && !program.exit_requested() {
            program.tick(app);
            summary.ticks += 1;
        }

        let stuck = attempted && !summary.bootstrapped;
        if (program.exit_requested() || stuck) && !summary.finish_requested {
            log::info!("[Driver] Requesting activity finish");
            pump.finish();
            summary.finish_requested = true;
        }
    }

    program.shutdown();
    if !summary.finish_requested {
        pump.finish();
        summary.finish_requested = true;
    }
    pump.detach();
    log::info!("[Driver] Loop ended after {} ticks", summary.ticks);
    summary
}
