//! In-memory backend that records every call.
//!
//! Used by tests and by hosts that want to exercise the bootstrap without a
//! runtime. Failures and runtime events are scripted up front.

use std::collections::{HashSet, VecDeque};

use crate::backend::XrBackend;
use crate::debug::DebugSeverity;
use crate::types::{
    ApiVersion, AppIdentity, DeviceHandle, EnvironmentBlendMode, FrameState, GraphicsBinding,
    GraphicsRequirements, ImageHandle, ImageViewDesc, ImageViewHandle, InstanceHandle,
    MessengerHandle, PhysicalDeviceHandle, Pose, QueueFamily, QueueHandle, ReferenceSpaceType,
    RuntimeEvent, SessionHandle, SessionState, SpaceHandle, SwapchainDesc, SwapchainFormat,
    SwapchainHandle, SystemId, SystemProperties, ViewConfigurationType, ViewConfigurationView,
    VkDeviceDesc, VkInstanceDesc, VkInstanceHandle,
};
use crate::{BootError, BootResult, Domain};

/// Result code reported for injected failures (`XR_ERROR_RUNTIME_FAILURE`
/// and `VK_ERROR_INITIALIZATION_FAILED` respectively).
const XR_FAILURE: i32 = -2;
const VK_FAILURE: i32 = -3;

const FRAME_PERIOD_NS: i64 = 13_888_889;

#[derive(Debug, Clone, Copy)]
enum Scripted {
    Event(RuntimeEvent),
    /// Resolved against the live session when polled.
    State(SessionState),
    /// Ends one drain of the queue.
    RoundEnd,
}

#[derive(Debug)]
pub struct DummyBackend {
    pub layers: Vec<String>,
    pub instance_extensions: Vec<String>,
    pub queue_families: Vec<QueueFamily>,
    pub requirements: GraphicsRequirements,
    pub view_configurations: Vec<ViewConfigurationType>,
    pub views: Vec<ViewConfigurationView>,
    pub blend_modes: Vec<EnvironmentBlendMode>,
    pub formats: Vec<SwapchainFormat>,
    pub images_per_swapchain: usize,
    /// Names of every backend call, in order.
    pub calls: Vec<&'static str>,
    pub swapchain_descs: Vec<SwapchainDesc>,
    pub image_view_descs: Vec<ImageViewDesc>,
    pub vk_instance_descs: Vec<VkInstanceDesc>,
    pub instance_extensions_requested: Vec<String>,
    pub space_types: Vec<ReferenceSpaceType>,
    failures: HashSet<&'static str>,
    events: VecDeque<Scripted>,
    live: HashSet<u64>,
    next_handle: u64,
    session: Option<SessionHandle>,
    frame_time_ns: i64,
}

impl DummyBackend {
    /// A Quest-like runtime: stereo, 1832x1920 per eye, three images per
    /// swapchain, sRGB and D32 formats available.
    pub fn new() -> Self {
        let view = ViewConfigurationView {
            recommended_width: 1832,
            recommended_height: 1920,
            recommended_sample_count: 1,
            max_width: 4096,
            max_height: 4096,
            max_sample_count: 4,
        };
        Self {
            layers: vec!["VK_LAYER_KHRONOS_validation".to_string()],
            instance_extensions: vec![
                "VK_EXT_debug_utils".to_string(),
                "VK_KHR_surface".to_string(),
            ],
            queue_families: vec![
                QueueFamily {
                    index: 0,
                    queue_count: 16,
                    graphics: true,
                    compute: true,
                    transfer: true,
                },
                QueueFamily {
                    index: 1,
                    queue_count: 2,
                    graphics: false,
                    compute: true,
                    transfer: true,
                },
            ],
            requirements: GraphicsRequirements {
                min_api_version: ApiVersion::new(1, 0, 0),
                max_api_version: ApiVersion::new(1, 3, 0),
            },
            view_configurations: vec![
                ViewConfigurationType::PRIMARY_MONO,
                ViewConfigurationType::PRIMARY_STEREO,
            ],
            views: vec![view, view],
            blend_modes: vec![EnvironmentBlendMode::OPAQUE],
            formats: vec![
                SwapchainFormat::R8G8B8A8_SRGB,
                SwapchainFormat::R8G8B8A8_UNORM,
                SwapchainFormat::D16_UNORM,
                SwapchainFormat::D32_SFLOAT,
            ],
            images_per_swapchain: 3,
            calls: Vec::new(),
            swapchain_descs: Vec::new(),
            image_view_descs: Vec::new(),
            vk_instance_descs: Vec::new(),
            instance_extensions_requested: Vec::new(),
            space_types: Vec::new(),
            failures: HashSet::new(),
            events: VecDeque::new(),
            live: HashSet::new(),
            next_handle: 0x100,
            session: None,
            frame_time_ns: 0,
        }
    }

    /// Makes every later call of `operation` (a trait method name) fail.
    pub fn fail_on(&mut self, operation: &'static str) {
        self.failures.insert(operation);
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    pub fn push_event(&mut self, event: RuntimeEvent) {
        self.events.push_back(Scripted::Event(event));
    }

    /// Queues a state change for whatever session is live when it is polled.
    pub fn push_session_state(&mut self, state: SessionState) {
        self.events.push_back(Scripted::State(state));
    }

    /// Later events are only delivered on the next drain of the queue.
    pub fn end_poll_round(&mut self) {
        self.events.push_back(Scripted::RoundEnd);
    }

    pub fn pending_events(&self) -> usize {
        self.events
            .iter()
            .filter(|event| !matches!(event, Scripted::RoundEnd))
            .count()
    }

    pub fn session_handle(&self) -> Option<SessionHandle> {
        self.session
    }

    /// Objects created and not yet destroyed.
    pub fn live_objects(&self) -> usize {
        self.live.len()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.iter().filter(|call| **call == operation).count()
    }

    pub fn called(&self, operation: &str) -> bool {
        self.call_count(operation) > 0
    }

    /// Position of the first call named `operation`.
    pub fn position(&self, operation: &str) -> Option<usize> {
        self.calls.iter().position(|call| *call == operation)
    }

    fn call(&mut self, operation: &'static str, domain: Domain) -> BootResult<()> {
        self.calls.push(operation);
        if self.failures.contains(operation) {
            return Err(match domain {
                Domain::Xr => BootError::xr(operation, XR_FAILURE),
                Domain::Vulkan => BootError::vk(operation, VK_FAILURE),
            });
        }
        Ok(())
    }

    fn create(&mut self) -> u64 {
        self.next_handle += 1;
        self.live.insert(self.next_handle);
        self.next_handle
    }

    fn release(&mut self, kind: &'static str, raw: u64) -> BootResult<()> {
        if self.live.remove(&raw) {
            Ok(())
        } else {
            Err(BootError::UnknownHandle { kind, raw })
        }
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl XrBackend for DummyBackend {
    fn initialize_loader(&mut self) -> BootResult<()> {
        self.call("initialize_loader", Domain::Xr)
    }

    fn create_instance(
        &mut self,
        _identity: &AppIdentity,
        extensions: &[&str],
    ) -> BootResult<InstanceHandle> {
        self.call("create_instance", Domain::Xr)?;
        self.instance_extensions_requested = extensions.iter().map(|e| e.to_string()).collect();
        Ok(InstanceHandle(self.create()))
    }

    fn create_xr_debug_messenger(
        &mut self,
        _instance: InstanceHandle,
        _severities: &[DebugSeverity],
    ) -> BootResult<MessengerHandle> {
        self.call("create_xr_debug_messenger", Domain::Xr)?;
        Ok(MessengerHandle(self.create()))
    }

    fn system(&mut self, _instance: InstanceHandle) -> BootResult<SystemId> {
        self.call("system", Domain::Xr)?;
        Ok(SystemId(1))
    }

    fn system_properties(&mut self, _system: SystemId) -> BootResult<SystemProperties> {
        self.call("system_properties", Domain::Xr)?;
        Ok(SystemProperties {
            system_name: "Dummy HMD".to_string(),
            vendor_id: 0x2833,
            max_swapchain_width: 4096,
            max_swapchain_height: 4096,
            max_layer_count: 16,
            orientation_tracking: true,
            position_tracking: true,
        })
    }

    fn graphics_requirements(&mut self, _system: SystemId) -> BootResult<GraphicsRequirements> {
        self.call("graphics_requirements", Domain::Xr)?;
        Ok(self.requirements)
    }

    fn available_layers(&mut self) -> BootResult<Vec<String>> {
        self.call("available_layers", Domain::Vulkan)?;
        Ok(self.layers.clone())
    }

    fn available_instance_extensions(&mut self) -> BootResult<Vec<String>> {
        self.call("available_instance_extensions", Domain::Vulkan)?;
        Ok(self.instance_extensions.clone())
    }

    fn create_vk_instance(
        &mut self,
        _system: SystemId,
        desc: &VkInstanceDesc,
    ) -> BootResult<VkInstanceHandle> {
        self.call("create_vk_instance", Domain::Xr)?;
        self.vk_instance_descs.push(desc.clone());
        Ok(VkInstanceHandle(self.create()))
    }

    fn create_vk_debug_messenger(
        &mut self,
        _instance: VkInstanceHandle,
        _severities: &[DebugSeverity],
    ) -> BootResult<MessengerHandle> {
        self.call("create_vk_debug_messenger", Domain::Vulkan)?;
        Ok(MessengerHandle(self.create()))
    }

    fn graphics_device(
        &mut self,
        _system: SystemId,
        _instance: VkInstanceHandle,
    ) -> BootResult<PhysicalDeviceHandle> {
        self.call("graphics_device", Domain::Xr)?;
        Ok(PhysicalDeviceHandle(0xd0))
    }

    fn queue_families(
        &mut self,
        _physical_device: PhysicalDeviceHandle,
    ) -> BootResult<Vec<QueueFamily>> {
        self.call("queue_families", Domain::Vulkan)?;
        Ok(self.queue_families.clone())
    }

    fn create_vk_device(
        &mut self,
        _system: SystemId,
        _physical_device: PhysicalDeviceHandle,
        _desc: &VkDeviceDesc,
    ) -> BootResult<DeviceHandle> {
        self.call("create_vk_device", Domain::Xr)?;
        Ok(DeviceHandle(self.create()))
    }

    fn device_queue(
        &mut self,
        _device: DeviceHandle,
        queue_family_index: u32,
        queue_index: u32,
    ) -> BootResult<QueueHandle> {
        self.call("device_queue", Domain::Vulkan)?;
        Ok(QueueHandle(
            0xa000 + u64::from(queue_family_index) * 16 + u64::from(queue_index),
        ))
    }

    fn create_session(
        &mut self,
        _system: SystemId,
        _binding: &GraphicsBinding,
    ) -> BootResult<SessionHandle> {
        self.call("create_session", Domain::Xr)?;
        let session = SessionHandle(self.create());
        self.session = Some(session);
        Ok(session)
    }

    fn create_reference_space(
        &mut self,
        _session: SessionHandle,
        space_type: ReferenceSpaceType,
        _pose: Pose,
    ) -> BootResult<SpaceHandle> {
        self.call("create_reference_space", Domain::Xr)?;
        self.space_types.push(space_type);
        Ok(SpaceHandle(self.create()))
    }

    fn view_configurations(&mut self, _system: SystemId) -> BootResult<Vec<ViewConfigurationType>> {
        self.call("view_configurations", Domain::Xr)?;
        Ok(self.view_configurations.clone())
    }

    fn view_configuration_views(
        &mut self,
        _system: SystemId,
        _view_type: ViewConfigurationType,
    ) -> BootResult<Vec<ViewConfigurationView>> {
        self.call("view_configuration_views", Domain::Xr)?;
        Ok(self.views.clone())
    }

    fn environment_blend_modes(
        &mut self,
        _system: SystemId,
        _view_type: ViewConfigurationType,
    ) -> BootResult<Vec<EnvironmentBlendMode>> {
        self.call("environment_blend_modes", Domain::Xr)?;
        Ok(self.blend_modes.clone())
    }

    fn swapchain_formats(&mut self, _session: SessionHandle) -> BootResult<Vec<SwapchainFormat>> {
        self.call("swapchain_formats", Domain::Xr)?;
        Ok(self.formats.clone())
    }

    fn create_swapchain(
        &mut self,
        _session: SessionHandle,
        desc: &SwapchainDesc,
    ) -> BootResult<SwapchainHandle> {
        self.call("create_swapchain", Domain::Xr)?;
        self.swapchain_descs.push(*desc);
        Ok(SwapchainHandle(self.create()))
    }

    fn swapchain_images(&mut self, swapchain: SwapchainHandle) -> BootResult<Vec<ImageHandle>> {
        self.call("swapchain_images", Domain::Xr)?;
        Ok((0..self.images_per_swapchain as u64)
            .map(|i| ImageHandle((swapchain.as_raw() << 8) | i))
            .collect())
    }

    fn create_image_view(
        &mut self,
        _device: DeviceHandle,
        desc: &ImageViewDesc,
    ) -> BootResult<ImageViewHandle> {
        self.call("create_image_view", Domain::Vulkan)?;
        self.image_view_descs.push(*desc);
        Ok(ImageViewHandle(self.create()))
    }

    fn poll_event(&mut self, _instance: InstanceHandle) -> BootResult<Option<RuntimeEvent>> {
        self.call("poll_event", Domain::Xr)?;
        Ok(match self.events.pop_front() {
            Some(Scripted::Event(event)) => Some(event),
            Some(Scripted::State(state)) => Some(RuntimeEvent::SessionStateChanged {
                session: self.session.unwrap_or(SessionHandle(0)),
                state,
            }),
            Some(Scripted::RoundEnd) | None => None,
        })
    }

    fn begin_session(
        &mut self,
        _session: SessionHandle,
        _view_type: ViewConfigurationType,
    ) -> BootResult<()> {
        self.call("begin_session", Domain::Xr)
    }

    fn end_session(&mut self, _session: SessionHandle) -> BootResult<()> {
        self.call("end_session", Domain::Xr)
    }

    fn wait_frame(&mut self, _session: SessionHandle) -> BootResult<FrameState> {
        self.call("wait_frame", Domain::Xr)?;
        self.frame_time_ns += FRAME_PERIOD_NS;
        Ok(FrameState {
            predicted_display_time_ns: self.frame_time_ns,
            predicted_display_period_ns: FRAME_PERIOD_NS,
            should_render: true,
        })
    }

    fn begin_frame(&mut self, _session: SessionHandle) -> BootResult<()> {
        self.call("begin_frame", Domain::Xr)
    }

    fn end_frame(
        &mut self,
        _session: SessionHandle,
        _display_time_ns: i64,
        _blend_mode: EnvironmentBlendMode,
    ) -> BootResult<()> {
        self.call("end_frame", Domain::Xr)
    }

    fn destroy_image_view(
        &mut self,
        _device: DeviceHandle,
        view: ImageViewHandle,
    ) -> BootResult<()> {
        self.call("destroy_image_view", Domain::Vulkan)?;
        self.release("image view", view.as_raw())
    }

    fn destroy_swapchain(&mut self, swapchain: SwapchainHandle) -> BootResult<()> {
        self.call("destroy_swapchain", Domain::Xr)?;
        self.release("swapchain", swapchain.as_raw())
    }

    fn destroy_space(&mut self, space: SpaceHandle) -> BootResult<()> {
        self.call("destroy_space", Domain::Xr)?;
        self.release("space", space.as_raw())
    }

    fn destroy_session(&mut self, session: SessionHandle) -> BootResult<()> {
        self.call("destroy_session", Domain::Xr)?;
        self.session = None;
        self.release("session", session.as_raw())
    }

    fn destroy_vk_debug_messenger(
        &mut self,
        _instance: VkInstanceHandle,
        messenger: MessengerHandle,
    ) -> BootResult<()> {
        self.call("destroy_vk_debug_messenger", Domain::Vulkan)?;
        self.release("debug messenger", messenger.as_raw())
    }

    fn destroy_xr_debug_messenger(
        &mut self,
        _instance: InstanceHandle,
        messenger: MessengerHandle,
    ) -> BootResult<()> {
        self.call("destroy_xr_debug_messenger", Domain::Xr)?;
        self.release("debug messenger", messenger.as_raw())
    }

    fn destroy_device(&mut self, device: DeviceHandle) -> BootResult<()> {
        self.call("destroy_device", Domain::Vulkan)?;
        self.release("device", device.as_raw())
    }

    fn destroy_vk_instance(&mut self, instance: VkInstanceHandle) -> BootResult<()> {
        self.call("destroy_vk_instance", Domain::Vulkan)?;
        self.release("Vulkan instance", instance.as_raw())
    }

    fn destroy_instance(&mut self, instance: InstanceHandle) -> BootResult<()> {
        self.call("destroy_instance", Domain::Xr)?;
        self.release("instance", instance.as_raw())
    }
}
