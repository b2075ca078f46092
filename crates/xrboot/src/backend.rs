use crate::debug::DebugSeverity;
use crate::types::{
    AppIdentity, DeviceHandle, EnvironmentBlendMode, FrameState, GraphicsBinding,
    GraphicsRequirements, ImageHandle, ImageViewDesc, ImageViewHandle, InstanceHandle,
    MessengerHandle, PhysicalDeviceHandle, Pose, QueueFamily, QueueHandle, ReferenceSpaceType,
    RuntimeEvent, SessionHandle, SpaceHandle, SwapchainDesc, SwapchainFormat, SwapchainHandle,
    SystemId, SystemProperties, ViewConfigurationType, ViewConfigurationView, VkDeviceDesc,
    VkInstanceDesc, VkInstanceHandle,
};
use crate::BootResult;

/// Every XR runtime and Vulkan call the bootstrap makes.
///
/// An implementation resolves its function tables once and is then moved
/// into [`crate::Program`], which is the only caller. Calls that create an
/// object return its handle; the matching `destroy_*` call receives it back
/// during teardown.
pub trait XrBackend {
    // Runtime connection
    fn initialize_loader(&mut self) -> BootResult<()>;
    /// Extensions the host platform needs to create an instance at all.
    fn platform_instance_extensions(&self) -> Vec<&'static str> {
        Vec::new()
    }
    fn create_instance(
        &mut self,
        identity: &AppIdentity,
        extensions: &[&str],
    ) -> BootResult<InstanceHandle>;
    fn create_xr_debug_messenger(
        &mut self,
        instance: InstanceHandle,
        severities: &[DebugSeverity],
    ) -> BootResult<MessengerHandle>;
    fn system(&mut self, instance: InstanceHandle) -> BootResult<SystemId>;
    fn system_properties(&mut self, system: SystemId) -> BootResult<SystemProperties>;
    fn graphics_requirements(&mut self, system: SystemId) -> BootResult<GraphicsRequirements>;

    // Vulkan instance and device, created through the runtime
    fn available_layers(&mut self) -> BootResult<Vec<String>>;
    fn available_instance_extensions(&mut self) -> BootResult<Vec<String>>;
    fn create_vk_instance(
        &mut self,
        system: SystemId,
        desc: &VkInstanceDesc,
    ) -> BootResult<VkInstanceHandle>;
    fn create_vk_debug_messenger(
        &mut self,
        instance: VkInstanceHandle,
        severities: &[DebugSeverity],
    ) -> BootResult<MessengerHandle>;
    fn graphics_device(
        &mut self,
        system: SystemId,
        instance: VkInstanceHandle,
    ) -> BootResult<PhysicalDeviceHandle>;
    fn queue_families(&mut self, physical_device: PhysicalDeviceHandle)
        -> BootResult<Vec<QueueFamily>>;
    fn create_vk_device(
        &mut self,
        system: SystemId,
        physical_device: PhysicalDeviceHandle,
        desc: &VkDeviceDesc,
    ) -> BootResult<DeviceHandle>;
    fn device_queue(
        &mut self,
        device: DeviceHandle,
        queue_family_index: u32,
        queue_index: u32,
    ) -> BootResult<QueueHandle>;

    // Session and spaces
    fn create_session(
        &mut self,
        system: SystemId,
        binding: &GraphicsBinding,
    ) -> BootResult<SessionHandle>;
    fn create_reference_space(
        &mut self,
        session: SessionHandle,
        space_type: ReferenceSpaceType,
        pose: Pose,
    ) -> BootResult<SpaceHandle>;

    // Views and swapchains
    fn view_configurations(&mut self, system: SystemId) -> BootResult<Vec<ViewConfigurationType>>;
    fn view_configuration_views(
        &mut self,
        system: SystemId,
        view_type: ViewConfigurationType,
    ) -> BootResult<Vec<ViewConfigurationView>>;
    fn environment_blend_modes(
        &mut self,
        system: SystemId,
        view_type: ViewConfigurationType,
    ) -> BootResult<Vec<EnvironmentBlendMode>>;
    fn swapchain_formats(&mut self, session: SessionHandle) -> BootResult<Vec<SwapchainFormat>>;
    fn create_swapchain(
        &mut self,
        session: SessionHandle,
        desc: &SwapchainDesc,
    ) -> BootResult<SwapchainHandle>;
    fn swapchain_images(&mut self, swapchain: SwapchainHandle) -> BootResult<Vec<ImageHandle>>;
    fn create_image_view(
        &mut self,
        device: DeviceHandle,
        desc: &ImageViewDesc,
    ) -> BootResult<ImageViewHandle>;

    // Per-tick
    /// Next pending runtime event, `None` once the queue is empty.
    fn poll_event(&mut self, instance: InstanceHandle) -> BootResult<Option<RuntimeEvent>>;
    fn begin_session(
        &mut self,
        session: SessionHandle,
        view_type: ViewConfigurationType,
    ) -> BootResult<()>;
    fn end_session(&mut self, session: SessionHandle) -> BootResult<()>;
    /// May block until the runtime schedules the next frame.
    fn wait_frame(&mut self, session: SessionHandle) -> BootResult<FrameState>;
    fn begin_frame(&mut self, session: SessionHandle) -> BootResult<()>;
    fn end_frame(
        &mut self,
        session: SessionHandle,
        display_time_ns: i64,
        blend_mode: EnvironmentBlendMode,
    ) -> BootResult<()>;

    // Teardown
    fn destroy_image_view(&mut self, device: DeviceHandle, view: ImageViewHandle)
        -> BootResult<()>;
    fn destroy_swapchain(&mut self, swapchain: SwapchainHandle) -> BootResult<()>;
    fn destroy_space(&mut self, space: SpaceHandle) -> BootResult<()>;
    fn destroy_session(&mut self, session: SessionHandle) -> BootResult<()>;
    fn destroy_vk_debug_messenger(
        &mut self,
        instance: VkInstanceHandle,
        messenger: MessengerHandle,
    ) -> BootResult<()>;
    fn destroy_xr_debug_messenger(
        &mut self,
        instance: InstanceHandle,
        messenger: MessengerHandle,
    ) -> BootResult<()>;
    fn destroy_device(&mut self, device: DeviceHandle) -> BootResult<()>;
    fn destroy_vk_instance(&mut self, instance: VkInstanceHandle) -> BootResult<()>;
    fn destroy_instance(&mut self, instance: InstanceHandle) -> BootResult<()>;
}
