//! Ownership record of every object the bootstrap creates.

use crate::backend::XrBackend;
use crate::types::{
    DeviceHandle, ImageViewHandle, InstanceHandle, MessengerHandle, SessionHandle, SpaceHandle,
    SwapchainHandle, VkInstanceHandle,
};
use crate::BootResult;

/// Objects are recorded as soon as their creation call returns, so a
/// bootstrap that fails half way can still be torn down completely.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    image_views: Vec<(DeviceHandle, ImageViewHandle)>,
    swapchains: Vec<SwapchainHandle>,
    spaces: Vec<SpaceHandle>,
    session: Option<SessionHandle>,
    vk_messenger: Option<(VkInstanceHandle, MessengerHandle)>,
    xr_messenger: Option<(InstanceHandle, MessengerHandle)>,
    device: Option<DeviceHandle>,
    vk_instance: Option<VkInstanceHandle>,
    instance: Option<InstanceHandle>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_instance(&mut self, instance: InstanceHandle) {
        self.instance = Some(instance);
    }

    pub fn record_xr_messenger(&mut self, instance: InstanceHandle, messenger: MessengerHandle) {
        self.xr_messenger = Some((instance, messenger));
    }

    pub fn record_vk_instance(&mut self, instance: VkInstanceHandle) {
        self.vk_instance = Some(instance);
    }

    pub fn record_vk_messenger(&mut self, instance: VkInstanceHandle, messenger: MessengerHandle) {
        self.vk_messenger = Some((instance, messenger));
    }

    pub fn record_device(&mut self, device: DeviceHandle) {
        self.device = Some(device);
    }

    pub fn record_session(&mut self, session: SessionHandle) {
        self.session = Some(session);
    }

    pub fn record_space(&mut self, space: SpaceHandle) {
        self.spaces.push(space);
    }

    pub fn record_swapchain(&mut self, swapchain: SwapchainHandle) {
        self.swapchains.push(swapchain);
    }

    pub fn record_image_view(&mut self, device: DeviceHandle, view: ImageViewHandle) {
        self.image_views.push((device, view));
    }

    pub fn image_view_count(&self) -> usize {
        self.image_views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_views.is_empty()
            && self.swapchains.is_empty()
            && self.spaces.is_empty()
            && self.session.is_none()
            && self.vk_messenger.is_none()
            && self.xr_messenger.is_none()
            && self.device.is_none()
            && self.vk_instance.is_none()
            && self.instance.is_none()
    }

    /// Destroys everything recorded: image views, swapchains, reference
    /// spaces, session, debug messengers, device, Vulkan instance, XR
    /// instance. A failed destroy is logged and teardown carries on.
    ///
    /// Returns the number of objects handed back to the backend.
    pub fn teardown<B: XrBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let mut released = 0;

        for (device, view) in self.image_views.drain(..) {
            released += 1;
            report("vkDestroyImageView", backend.destroy_image_view(device, view));
        }
        for swapchain in self.swapchains.drain(..) {
            released += 1;
            report("xrDestroySwapchain", backend.destroy_swapchain(swapchain));
        }
        for space in self.spaces.drain(..) {
            released += 1;
            report("xrDestroySpace", backend.destroy_space(space));
        }
        if let Some(session) = self.session.take() {
            released += 1;
            report("xrDestroySession", backend.destroy_session(session));
        }
        if let Some((instance, messenger)) = self.vk_messenger.take() {
            released += 1;
            report(
                "vkDestroyDebugUtilsMessengerEXT",
                backend.destroy_vk_debug_messenger(instance, messenger),
            );
        }
        if let Some((instance, messenger)) = self.xr_messenger.take() {
            released += 1;
            report(
                "xrDestroyDebugUtilsMessengerEXT",
                backend.destroy_xr_debug_messenger(instance, messenger),
            );
        }
        if let Some(device) = self.device.take() {
            released += 1;
            report("vkDestroyDevice", backend.destroy_device(device));
        }
        if let Some(instance) = self.vk_instance.take() {
            released += 1;
            report("vkDestroyInstance", backend.destroy_vk_instance(instance));
        }
        if let Some(instance) = self.instance.take() {
            released += 1;
            report("xrDestroyInstance", backend.destroy_instance(instance));
        }

        released
    }
}

fn report(operation: &str, result: BootResult<()>) {
    if let Err(err) = result {
        log::error!("[Teardown] {operation}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::DummyBackend;

    #[test]
    fn test_teardown_empties_the_ledger() {
        let mut backend = DummyBackend::new();
        let mut ledger = ResourceLedger::new();
        assert!(ledger.is_empty());

        ledger.record_instance(InstanceHandle(1));
        ledger.record_device(DeviceHandle(2));
        ledger.record_image_view(DeviceHandle(2), ImageViewHandle(3));
        ledger.record_image_view(DeviceHandle(2), ImageViewHandle(4));
        assert_eq!(ledger.image_view_count(), 2);
        assert!(!ledger.is_empty());

        // Unknown handles are logged, not retried.
        assert_eq!(ledger.teardown(&mut backend), 4);
        assert!(ledger.is_empty());
        assert_eq!(
            backend.calls,
            vec![
                "destroy_image_view",
                "destroy_image_view",
                "destroy_device",
                "destroy_instance"
            ]
        );
        assert_eq!(ledger.teardown(&mut backend), 0);
    }
}
