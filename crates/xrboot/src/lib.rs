//! Stereo XR session bootstrap over OpenXR and Vulkan.
//!
//! Everything here talks to the runtime through [`XrBackend`]; the real
//! implementation lives in `xrboot-openxr`, and [`DummyBackend`] scripts one
//! in memory.

#![forbid(unsafe_code)]

pub mod backend;
pub mod builder;
pub mod debug;
pub mod driver;
pub mod dummy;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod negotiate;
pub mod platform;
pub mod program;
pub mod session;
pub mod swapchain;
pub mod types;

pub use backend::XrBackend;
pub use builder::DeviceBundle;
pub use debug::{DebugSeverity, DebugSource};
pub use driver::{run, PlatformPump, RunSummary};
pub use dummy::DummyBackend;
pub use error::{BootError, BootResult, Domain};
pub use ledger::ResourceLedger;
pub use lifecycle::{LifecycleState, SessionLifecycle};
pub use platform::{AppState, AssetSource, NativeWindowHandle, PlatformCommand};
pub use program::Program;
pub use session::ReferenceSpaces;
pub use swapchain::{SwapchainInfo, SwapchainSet};
pub use xrboot_common::BootConfig;
