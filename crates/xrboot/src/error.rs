use std::fmt;

use thiserror::Error;

use crate::types::ReferenceSpaceType;

/// The native API a failing call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Xr,
    Vulkan,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xr => f.write_str("OpenXR"),
            Self::Vulkan => f.write_str("Vulkan"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BootError {
    #[error("{operation} failed with: {code} ({domain})")]
    Call {
        domain: Domain,
        code: i32,
        operation: &'static str,
    },
    #[error("runtime unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("reference space {0:?} was not created")]
    MissingReferenceSpace(ReferenceSpaceType),
    #[error("bootstrap has not completed")]
    NotInitialized,
    #[error("bootstrap already completed")]
    AlreadyInitialized,
    #[error("no live {kind} with handle {raw:#x}")]
    UnknownHandle { kind: &'static str, raw: u64 },
    #[error("configuration error: {0}")]
    Config(String),
}

impl BootError {
    pub fn xr(operation: &'static str, code: i32) -> Self {
        Self::Call {
            domain: Domain::Xr,
            code,
            operation,
        }
    }

    pub fn vk(operation: &'static str, code: i32) -> Self {
        Self::Call {
            domain: Domain::Vulkan,
            code,
            operation,
        }
    }

    pub fn unsupported(msg: impl fmt::Display) -> Self {
        Self::Unsupported(msg.to_string())
    }

    /// Domain of the failing native call, if this error came from one.
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Self::Call { domain, .. } => Some(*domain),
            _ => None,
        }
    }
}

impl From<xrboot_common::Error> for BootError {
    fn from(err: xrboot_common::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type BootResult<T> = Result<T, BootError>;
