//! Severity mapping shared by the XR and Vulkan debug messengers.

use log::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugSeverity {
    Verbose,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSource {
    Xr,
    Vulkan,
}

impl DebugSource {
    fn tag(self) -> &'static str {
        match self {
            Self::Xr => "XrDebugCallback",
            Self::Vulkan => "VkDebugCallback",
        }
    }
}

const BASE_SEVERITIES: [DebugSeverity; 2] = [DebugSeverity::Error, DebugSeverity::Warning];
const ALL_SEVERITIES: [DebugSeverity; 4] = [
    DebugSeverity::Error,
    DebugSeverity::Warning,
    DebugSeverity::Info,
    DebugSeverity::Verbose,
];

/// Severities a messenger subscribes to. Errors and warnings are always on.
pub fn enabled_severities(verbose: bool) -> &'static [DebugSeverity] {
    if verbose {
        &ALL_SEVERITIES
    } else {
        &BASE_SEVERITIES
    }
}

pub fn level_for(severity: DebugSeverity) -> Level {
    match severity {
        DebugSeverity::Error => Level::Error,
        DebugSeverity::Warning => Level::Warn,
        DebugSeverity::Info | DebugSeverity::Verbose => Level::Info,
    }
}

/// Forwards one messenger callback to the log.
pub fn forward(source: DebugSource, severity: DebugSeverity, message: &str) {
    log::log!(level_for(severity), "[{}] {}", source.tag(), message);
}
