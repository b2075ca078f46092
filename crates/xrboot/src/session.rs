use std::collections::HashMap;

use crate::backend::XrBackend;
use crate::builder::DeviceBundle;
use crate::ledger::ResourceLedger;
use crate::types::{Pose, ReferenceSpaceType, SessionHandle, SpaceHandle};
use crate::{BootError, BootResult};

/// Spaces created for every session, identity pose each.
pub const SESSION_SPACES: [ReferenceSpaceType; 3] = [
    ReferenceSpaceType::View,
    ReferenceSpaceType::Stage,
    ReferenceSpaceType::LocalFloor,
];

/// Reference spaces keyed by type.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSpaces {
    spaces: HashMap<ReferenceSpaceType, SpaceHandle>,
}

impl ReferenceSpaces {
    pub fn get(&self, space_type: ReferenceSpaceType) -> BootResult<SpaceHandle> {
        self.spaces
            .get(&space_type)
            .copied()
            .ok_or(BootError::MissingReferenceSpace(space_type))
    }

    pub fn contains(&self, space_type: ReferenceSpaceType) -> bool {
        self.spaces.contains_key(&space_type)
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

pub fn create_session<B: XrBackend + ?Sized>(
    backend: &mut B,
    device: &DeviceBundle,
    ledger: &mut ResourceLedger,
) -> BootResult<SessionHandle> {
    let session = backend.create_session(device.system, &device.graphics_binding())?;
    ledger.record_session(session);
    log::info!("[Session] Created session {:#x}", session.as_raw());
    Ok(session)
}

pub fn create_reference_spaces<B: XrBackend + ?Sized>(
    backend: &mut B,
    session: SessionHandle,
    ledger: &mut ResourceLedger,
) -> BootResult<ReferenceSpaces> {
    let mut spaces = ReferenceSpaces::default();
    for space_type in SESSION_SPACES {
        let space = backend.create_reference_space(session, space_type, Pose::IDENTITY)?;
        ledger.record_space(space);
        spaces.spaces.insert(space_type, space);
    }
    Ok(spaces)
}
