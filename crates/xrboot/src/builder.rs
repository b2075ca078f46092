//! XR instance to Vulkan queue handshake.
//!
//! The runtime creates the Vulkan instance and device itself and picks the
//! physical device, so every Vulkan object the session is later bound to is
//! one the compositor has approved.

use xrboot_common::BootConfig;

use crate::backend::XrBackend;
use crate::debug;
use crate::ledger::ResourceLedger;
use crate::negotiate;
use crate::types::{
    ApiVersion, AppIdentity, DeviceHandle, GraphicsBinding, GraphicsRequirements, InstanceHandle,
    PhysicalDeviceHandle, QueueHandle, SystemId, SystemProperties, VkDeviceDesc, VkInstanceDesc,
    VkInstanceHandle, VK_EXT_DEBUG_UTILS, XR_EXT_DEBUG_UTILS, XR_EXT_LOCAL_FLOOR,
    XR_KHR_VULKAN_ENABLE2,
};
use crate::{BootError, BootResult};

/// Vulkan version requested from the runtime; multiview is core from 1.1.
pub const TARGET_VULKAN_VERSION: ApiVersion = ApiVersion::VULKAN_1_1;

/// Runtime and graphics objects produced by [`build_device`].
#[derive(Debug, Clone)]
pub struct DeviceBundle {
    pub instance: InstanceHandle,
    pub system: SystemId,
    pub system_properties: SystemProperties,
    pub requirements: GraphicsRequirements,
    pub vk_instance: VkInstanceHandle,
    pub enabled_layers: Vec<String>,
    pub enabled_extensions: Vec<String>,
    pub physical_device: PhysicalDeviceHandle,
    pub device: DeviceHandle,
    pub queue_family_index: u32,
    pub queue: QueueHandle,
}

impl DeviceBundle {
    pub fn graphics_binding(&self) -> GraphicsBinding {
        GraphicsBinding {
            instance: self.vk_instance,
            physical_device: self.physical_device,
            device: self.device,
            queue_family_index: self.queue_family_index,
            queue_index: 0,
        }
    }
}

pub fn identity(config: &BootConfig) -> AppIdentity {
    AppIdentity {
        application_name: config.application_name.clone(),
        application_version: config.application_version,
        engine_name: config.engine_name.clone(),
        engine_version: config.engine_version,
    }
}

/// Extensions the XR instance is created with.
pub fn xr_instance_extensions<B: XrBackend + ?Sized>(
    backend: &B,
    config: &BootConfig,
) -> Vec<&'static str> {
    let mut extensions = vec![XR_EXT_LOCAL_FLOOR];
    extensions.extend(backend.platform_instance_extensions());
    extensions.push(XR_KHR_VULKAN_ENABLE2);
    if config.debug_messengers {
        extensions.push(XR_EXT_DEBUG_UTILS);
    }
    extensions
}

/// Runs the handshake up to a retrieved graphics queue.
///
/// Every object is recorded in `ledger` as soon as it exists; on error the
/// caller tears the ledger down.
pub fn build_device<B: XrBackend + ?Sized>(
    backend: &mut B,
    config: &BootConfig,
    ledger: &mut ResourceLedger,
) -> BootResult<DeviceBundle> {
    backend.initialize_loader()?;

    let identity = identity(config);
    let extensions = xr_instance_extensions(backend, config);
    let instance = backend.create_instance(&identity, &extensions)?;
    ledger.record_instance(instance);
    log::info!(
        "[Builder] Created XR instance with extensions {:?}",
        extensions
    );

    let severities = debug::enabled_severities(config.verbose_debug);
    if config.debug_messengers {
        let messenger = backend.create_xr_debug_messenger(instance, severities)?;
        ledger.record_xr_messenger(instance, messenger);
    }

    let system = backend.system(instance)?;
    let system_properties = backend.system_properties(system)?;
    log::info!(
        "[Builder] System '{}' (vendor {:#x}): max swapchain {}x{}, {} layers, \
         orientation tracking {}, position tracking {}",
        system_properties.system_name,
        system_properties.vendor_id,
        system_properties.max_swapchain_width,
        system_properties.max_swapchain_height,
        system_properties.max_layer_count,
        system_properties.orientation_tracking,
        system_properties.position_tracking,
    );

    let requirements = backend.graphics_requirements(system)?;
    if !requirements.accepts(TARGET_VULKAN_VERSION) {
        return Err(BootError::unsupported(format!(
            "runtime requires Vulkan between {} and {}.x, application targets {}",
            requirements.min_api_version,
            requirements.max_api_version.major,
            TARGET_VULKAN_VERSION
        )));
    }

    let mut layers = Vec::new();
    if config.enable_validation {
        let available = backend.available_layers()?;
        if let Some(layer) =
            negotiate::select_validation_layer(&available, &config.validation_layers)
        {
            layers.push(layer);
        }
    }

    let mut requested = Vec::new();
    if config.debug_messengers {
        requested.push(VK_EXT_DEBUG_UTILS);
    }
    let available_extensions = backend.available_instance_extensions()?;
    let enabled_extensions =
        negotiate::filter_supported_extensions(&requested, &available_extensions);

    let desc = VkInstanceDesc {
        identity,
        api_version: TARGET_VULKAN_VERSION,
        layers: layers.clone(),
        extensions: enabled_extensions.clone(),
    };
    let vk_instance = backend.create_vk_instance(system, &desc)?;
    ledger.record_vk_instance(vk_instance);
    log::info!(
        "[Builder] Created Vulkan {} instance, layers {:?}, extensions {:?}",
        TARGET_VULKAN_VERSION,
        layers,
        enabled_extensions
    );

    if enabled_extensions.iter().any(|ext| ext == VK_EXT_DEBUG_UTILS) {
        let messenger = backend.create_vk_debug_messenger(vk_instance, severities)?;
        ledger.record_vk_messenger(vk_instance, messenger);
    }

    let physical_device = backend.graphics_device(system, vk_instance)?;
    let families = backend.queue_families(physical_device)?;
    let queue_family_index = negotiate::select_graphics_queue_family(&families)
        .ok_or_else(|| BootError::unsupported("no Vulkan graphics queue family"))?;

    let device_desc = VkDeviceDesc {
        queue_family_index,
        queue_priorities: vec![1.0],
        multiview: true,
        extensions: Vec::new(),
    };
    let device = backend.create_vk_device(system, physical_device, &device_desc)?;
    ledger.record_device(device);

    let queue = backend.device_queue(device, queue_family_index, 0)?;
    if let Some(family) = families.iter().find(|f| f.index == queue_family_index) {
        log::info!(
            "[Builder] Vulkan device ready, graphics queue family {} (compute {}, transfer {})",
            family.index,
            family.compute,
            family.transfer
        );
    }

    Ok(DeviceBundle {
        instance,
        system,
        system_properties,
        requirements,
        vk_instance,
        enabled_layers: layers,
        enabled_extensions,
        physical_device,
        device,
        queue_family_index,
        queue,
    })
}
