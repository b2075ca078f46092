//! [`XrBackend`] over the `openxr` and `ash` crates.
//!
//! XR objects are owned through the `openxr` wrappers and released by
//! dropping them; Vulkan objects are destroyed explicitly. Every handle given
//! to the bootstrap is the raw value of the underlying object.

use std::collections::HashMap;
use std::ptr;

use ash::extensions::ext::DebugUtils;
use ash::vk::{self, Handle};
use openxr as xr;
use openxr::sys::Handle as _;

use xrboot::debug::DebugSeverity;
use xrboot::types::{
    AppIdentity, DeviceHandle, EnvironmentBlendMode, FrameState, GraphicsBinding,
    GraphicsRequirements, ImageHandle, ImageViewDesc, ImageViewHandle, InstanceHandle,
    MessengerHandle, PhysicalDeviceHandle, Pose, QueueFamily, QueueHandle, ReferenceSpaceType,
    RuntimeEvent, SessionHandle, SessionState, SpaceHandle, SwapchainDesc, SwapchainFormat,
    SwapchainHandle, SystemId, SystemProperties, ViewConfigurationType, ViewConfigurationView,
    VkDeviceDesc, VkInstanceDesc, VkInstanceHandle,
};
use xrboot::{BootError, BootResult, XrBackend};

mod common;
mod debug;

use common::{vk_err, xr_err, NameList};

struct SessionObjects {
    handle: SessionHandle,
    stream: xr::FrameStream<xr::Vulkan>,
    waiter: xr::FrameWaiter,
    session: xr::Session<xr::Vulkan>,
}

struct VulkanInstance {
    handle: VkInstanceHandle,
    instance: ash::Instance,
    debug_utils: Option<DebugUtils>,
}

// Fields drop in declaration order, children before parents.
pub struct OpenXrBackend {
    swapchains: HashMap<u64, xr::Swapchain<xr::Vulkan>>,
    spaces: HashMap<u64, xr::Space>,
    session: Option<SessionObjects>,
    device: Option<(DeviceHandle, ash::Device)>,
    vk_instance: Option<VulkanInstance>,
    instance: Option<xr::Instance>,
    event_buffer: xr::EventDataBuffer,
    vk_entry: ash::Entry,
    entry: xr::Entry,
}

impl OpenXrBackend {
    /// Loads the OpenXR loader and the Vulkan library.
    pub fn load() -> BootResult<Self> {
        let entry = unsafe { xr::Entry::load() }
            .map_err(|e| BootError::Unavailable(format!("OpenXR load failed: {e:?}")))?;
        let vk_entry = unsafe { ash::Entry::load() }
            .map_err(|e| BootError::Unavailable(format!("Vulkan load failed: {e}")))?;
        Ok(Self {
            swapchains: HashMap::new(),
            spaces: HashMap::new(),
            session: None,
            device: None,
            vk_instance: None,
            instance: None,
            event_buffer: xr::EventDataBuffer::new(),
            vk_entry,
            entry,
        })
    }

    fn xr_instance(&self) -> BootResult<&xr::Instance> {
        self.instance.as_ref().ok_or(BootError::NotInitialized)
    }

    fn vulkan(&self, handle: VkInstanceHandle) -> BootResult<&VulkanInstance> {
        self.vk_instance
            .as_ref()
            .filter(|vk| vk.handle == handle)
            .ok_or(BootError::UnknownHandle {
                kind: "Vulkan instance",
                raw: handle.as_raw(),
            })
    }

    fn device(&self, handle: DeviceHandle) -> BootResult<&ash::Device> {
        self.device
            .as_ref()
            .filter(|(live, _)| *live == handle)
            .map(|(_, device)| device)
            .ok_or(BootError::UnknownHandle {
                kind: "device",
                raw: handle.as_raw(),
            })
    }

    fn session(&mut self, handle: SessionHandle) -> BootResult<&mut SessionObjects> {
        self.session
            .as_mut()
            .filter(|objects| objects.handle == handle)
            .ok_or(BootError::UnknownHandle {
                kind: "session",
                raw: handle.as_raw(),
            })
    }

    fn get_instance_proc_addr(&self) -> xr::sys::platform::VkGetInstanceProcAddr {
        // Same C signature, different nominal types on each side.
        unsafe { std::mem::transmute(self.vk_entry.static_fn().get_instance_proc_addr) }
    }
}

fn system_id(system: SystemId) -> xr::SystemId {
    xr::SystemId::from_raw(system.as_raw())
}

impl XrBackend for OpenXrBackend {
    fn initialize_loader(&mut self) -> BootResult<()> {
        #[cfg(target_os = "android")]
        self.entry
            .initialize_android_loader()
            .map_err(xr_err("xrInitializeLoaderKHR"))?;
        Ok(())
    }

    fn platform_instance_extensions(&self) -> Vec<&'static str> {
        if cfg!(target_os = "android") {
            vec![xrboot::types::XR_KHR_ANDROID_CREATE_INSTANCE]
        } else {
            Vec::new()
        }
    }

    fn create_instance(
        &mut self,
        identity: &AppIdentity,
        extensions: &[&str],
    ) -> BootResult<InstanceHandle> {
        let exts = common::extension_set(extensions);

        let app_info = xr::ApplicationInfo {
            application_name: &identity.application_name,
            application_version: identity.application_version,
            engine_name: &identity.engine_name,
            engine_version: identity.engine_version,
            api_version: xr::Version::new(1, 0, 0),
        };
        let instance = self
            .entry
            .create_instance(&app_info, &exts, &[])
            .map_err(xr_err("xrCreateInstance"))?;

        let properties = instance
            .properties()
            .map_err(xr_err("xrGetInstanceProperties"))?;
        log::info!(
            "[OpenXR] Runtime {} {}",
            properties.runtime_name,
            properties.runtime_version
        );

        let handle = InstanceHandle(instance.as_raw().into_raw());
        self.instance = Some(instance);
        Ok(handle)
    }

    fn create_xr_debug_messenger(
        &mut self,
        _instance: InstanceHandle,
        severities: &[DebugSeverity],
    ) -> BootResult<MessengerHandle> {
        let instance = self.xr_instance()?;
        let debug_utils = instance
            .exts()
            .ext_debug_utils
            .as_ref()
            .ok_or_else(|| BootError::unsupported("XR_EXT_debug_utils is not enabled"))?;

        let info = xr::sys::DebugUtilsMessengerCreateInfoEXT {
            ty: xr::sys::DebugUtilsMessengerCreateInfoEXT::TYPE,
            next: ptr::null(),
            message_severities: debug::xr_severity_flags(severities),
            message_types: debug::xr_message_types(),
            user_callback: Some(debug::xr_debug_callback),
            user_data: ptr::null_mut(),
        };
        let mut messenger = xr::sys::DebugUtilsMessengerEXT::NULL;
        let result = unsafe {
            (debug_utils.create_debug_utils_messenger)(instance.as_raw(), &info, &mut messenger)
        };
        if result.into_raw() < 0 {
            return Err(xr_err("xrCreateDebugUtilsMessengerEXT")(result));
        }
        Ok(MessengerHandle(messenger.into_raw()))
    }

    fn system(&mut self, _instance: InstanceHandle) -> BootResult<SystemId> {
        let system = self
            .xr_instance()?
            .system(xr::FormFactor::HEAD_MOUNTED_DISPLAY)
            .map_err(xr_err("xrGetSystem"))?;
        Ok(SystemId(system.into_raw()))
    }

    fn system_properties(&mut self, system: SystemId) -> BootResult<SystemProperties> {
        let properties = self
            .xr_instance()?
            .system_properties(system_id(system))
            .map_err(xr_err("xrGetSystemProperties"))?;
        Ok(SystemProperties {
            system_name: properties.system_name,
            vendor_id: properties.vendor_id,
            max_swapchain_width: properties.graphics_properties.max_swapchain_image_width,
            max_swapchain_height: properties.graphics_properties.max_swapchain_image_height,
            max_layer_count: properties.graphics_properties.max_layer_count,
            orientation_tracking: properties.tracking_properties.orientation_tracking,
            position_tracking: properties.tracking_properties.position_tracking,
        })
    }

    fn graphics_requirements(&mut self, system: SystemId) -> BootResult<GraphicsRequirements> {
        let requirements = self
            .xr_instance()?
            .graphics_requirements::<xr::Vulkan>(system_id(system))
            .map_err(xr_err("xrGetVulkanGraphicsRequirements2KHR"))?;
        Ok(GraphicsRequirements {
            min_api_version: common::api_version(requirements.min_api_version_supported),
            max_api_version: common::api_version(requirements.max_api_version_supported),
        })
    }

    fn available_layers(&mut self) -> BootResult<Vec<String>> {
        let layers = self
            .vk_entry
            .enumerate_instance_layer_properties()
            .map_err(vk_err("vkEnumerateInstanceLayerProperties"))?;
        Ok(layers
            .iter()
            .map(|layer| common::fixed_name(&layer.layer_name))
            .collect())
    }

    fn available_instance_extensions(&mut self) -> BootResult<Vec<String>> {
        let extensions = self
            .vk_entry
            .enumerate_instance_extension_properties(None)
            .map_err(vk_err("vkEnumerateInstanceExtensionProperties"))?;
        Ok(extensions
            .iter()
            .map(|ext| common::fixed_name(&ext.extension_name))
            .collect())
    }

    fn create_vk_instance(
        &mut self,
        system: SystemId,
        desc: &VkInstanceDesc,
    ) -> BootResult<VkInstanceHandle> {
        let app_name = common::c_string(&desc.identity.application_name)?;
        let engine_name = common::c_string(&desc.identity.engine_name)?;
        let layers = NameList::new(&desc.layers)?;
        let extensions = NameList::new(&desc.extensions)?;

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(desc.identity.application_version)
            .engine_name(&engine_name)
            .engine_version(desc.identity.engine_version)
            .api_version(common::vk_api_version(desc.api_version));
        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_layer_names(layers.as_ptrs())
            .enabled_extension_names(extensions.as_ptrs());

        let raw = unsafe {
            self.xr_instance()?.create_vulkan_instance(
                system_id(system),
                self.get_instance_proc_addr(),
                &*create_info as *const vk::InstanceCreateInfo as *const _,
            )
        }
        .map_err(xr_err("xrCreateVulkanInstanceKHR"))?
        .map_err(|code| BootError::vk("vkCreateInstance", code))?;

        let instance = unsafe {
            ash::Instance::load(
                self.vk_entry.static_fn(),
                vk::Instance::from_raw(raw as u64),
            )
        };
        let handle = VkInstanceHandle(instance.handle().as_raw());
        self.vk_instance = Some(VulkanInstance {
            handle,
            instance,
            debug_utils: None,
        });
        Ok(handle)
    }

    fn create_vk_debug_messenger(
        &mut self,
        instance: VkInstanceHandle,
        severities: &[DebugSeverity],
    ) -> BootResult<MessengerHandle> {
        let loader = DebugUtils::new(&self.vk_entry, &self.vulkan(instance)?.instance);
        let info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(debug::vk_severity_flags(severities))
            .message_type(debug::vk_message_types())
            .pfn_user_callback(Some(debug::vk_debug_callback));
        let messenger = unsafe { loader.create_debug_utils_messenger(&info, None) }
            .map_err(vk_err("vkCreateDebugUtilsMessengerEXT"))?;
        if let Some(vulkan) = self.vk_instance.as_mut() {
            vulkan.debug_utils = Some(loader);
        }
        Ok(MessengerHandle(messenger.as_raw()))
    }

    fn graphics_device(
        &mut self,
        system: SystemId,
        instance: VkInstanceHandle,
    ) -> BootResult<PhysicalDeviceHandle> {
        let vk_instance = self.vulkan(instance)?.instance.handle();
        let physical_device = unsafe {
            self.xr_instance()?
                .vulkan_graphics_device(system_id(system), vk_instance.as_raw() as _)
        }
        .map_err(xr_err("xrGetVulkanGraphicsDevice2KHR"))?;
        Ok(PhysicalDeviceHandle(physical_device as u64))
    }

    fn queue_families(
        &mut self,
        physical_device: PhysicalDeviceHandle,
    ) -> BootResult<Vec<QueueFamily>> {
        let vulkan = self
            .vk_instance
            .as_ref()
            .ok_or(BootError::NotInitialized)?;
        let families = unsafe {
            vulkan
                .instance
                .get_physical_device_queue_family_properties(vk::PhysicalDevice::from_raw(
                    physical_device.as_raw(),
                ))
        };
        Ok(families
            .iter()
            .enumerate()
            .map(|(index, family)| common::queue_family(index, family))
            .collect())
    }

    fn create_vk_device(
        &mut self,
        system: SystemId,
        physical_device: PhysicalDeviceHandle,
        desc: &VkDeviceDesc,
    ) -> BootResult<DeviceHandle> {
        let extensions = NameList::new(&desc.extensions)?;
        let queue_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(desc.queue_family_index)
            .queue_priorities(&desc.queue_priorities)
            .build()];
        let mut multiview =
            vk::PhysicalDeviceMultiviewFeatures::builder().multiview(desc.multiview);
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(extensions.as_ptrs())
            .push_next(&mut multiview);

        let raw = unsafe {
            self.xr_instance()?.create_vulkan_device(
                system_id(system),
                self.get_instance_proc_addr(),
                physical_device.as_raw() as _,
                &*create_info as *const vk::DeviceCreateInfo as *const _,
            )
        }
        .map_err(xr_err("xrCreateVulkanDeviceKHR"))?
        .map_err(|code| BootError::vk("vkCreateDevice", code))?;

        let vulkan = self
            .vk_instance
            .as_ref()
            .ok_or(BootError::NotInitialized)?;
        let device = unsafe {
            ash::Device::load(vulkan.instance.fp_v1_0(), vk::Device::from_raw(raw as u64))
        };
        let handle = DeviceHandle(device.handle().as_raw());
        self.device = Some((handle, device));
        Ok(handle)
    }

    fn device_queue(
        &mut self,
        device: DeviceHandle,
        queue_family_index: u32,
        queue_index: u32,
    ) -> BootResult<QueueHandle> {
        let queue = unsafe {
            self.device(device)?
                .get_device_queue(queue_family_index, queue_index)
        };
        Ok(QueueHandle(queue.as_raw()))
    }

    fn create_session(
        &mut self,
        system: SystemId,
        binding: &GraphicsBinding,
    ) -> BootResult<SessionHandle> {
        let create_info = xr::vulkan::SessionCreateInfo {
            instance: binding.instance.as_raw() as _,
            physical_device: binding.physical_device.as_raw() as _,
            device: binding.device.as_raw() as _,
            queue_family_index: binding.queue_family_index,
            queue_index: binding.queue_index,
        };
        let (session, waiter, stream) = unsafe {
            self.xr_instance()?
                .create_session::<xr::Vulkan>(system_id(system), &create_info)
        }
        .map_err(xr_err("xrCreateSession"))?;

        let handle = SessionHandle(session.as_raw().into_raw());
        self.session = Some(SessionObjects {
            handle,
            stream,
            waiter,
            session,
        });
        Ok(handle)
    }

    fn create_reference_space(
        &mut self,
        session: SessionHandle,
        space_type: ReferenceSpaceType,
        pose: Pose,
    ) -> BootResult<SpaceHandle> {
        let [x, y, z, w] = pose.orientation;
        let [px, py, pz] = pose.position;
        let pose = xr::Posef {
            orientation: xr::Quaternionf { x, y, z, w },
            position: xr::Vector3f {
                x: px,
                y: py,
                z: pz,
            },
        };
        let space = self
            .session(session)?
            .session
            .create_reference_space(common::reference_space_type(space_type), pose)
            .map_err(xr_err("xrCreateReferenceSpace"))?;
        let handle = space.as_raw().into_raw();
        self.spaces.insert(handle, space);
        Ok(SpaceHandle(handle))
    }

    fn view_configurations(&mut self, system: SystemId) -> BootResult<Vec<ViewConfigurationType>> {
        let types = self
            .xr_instance()?
            .enumerate_view_configurations(system_id(system))
            .map_err(xr_err("xrEnumerateViewConfigurations"))?;
        Ok(types
            .into_iter()
            .map(|ty| ViewConfigurationType(ty.into_raw()))
            .collect())
    }

    fn view_configuration_views(
        &mut self,
        system: SystemId,
        view_type: ViewConfigurationType,
    ) -> BootResult<Vec<ViewConfigurationView>> {
        let views = self
            .xr_instance()?
            .enumerate_view_configuration_views(
                system_id(system),
                xr::ViewConfigurationType::from_raw(view_type.0),
            )
            .map_err(xr_err("xrEnumerateViewConfigurationViews"))?;
        Ok(views.iter().map(common::view_configuration_view).collect())
    }

    fn environment_blend_modes(
        &mut self,
        system: SystemId,
        view_type: ViewConfigurationType,
    ) -> BootResult<Vec<EnvironmentBlendMode>> {
        let modes = self
            .xr_instance()?
            .enumerate_environment_blend_modes(
                system_id(system),
                xr::ViewConfigurationType::from_raw(view_type.0),
            )
            .map_err(xr_err("xrEnumerateEnvironmentBlendModes"))?;
        Ok(modes
            .into_iter()
            .map(|mode| EnvironmentBlendMode(mode.into_raw()))
            .collect())
    }

    fn swapchain_formats(&mut self, session: SessionHandle) -> BootResult<Vec<SwapchainFormat>> {
        let formats = self
            .session(session)?
            .session
            .enumerate_swapchain_formats()
            .map_err(xr_err("xrEnumerateSwapchainFormats"))?;
        Ok(formats
            .into_iter()
            .map(|format| SwapchainFormat(i64::from(format)))
            .collect())
    }

    fn create_swapchain(
        &mut self,
        session: SessionHandle,
        desc: &SwapchainDesc,
    ) -> BootResult<SwapchainHandle> {
        let format = u32::try_from(desc.format.0).map_err(|_| {
            BootError::unsupported(format!("swapchain format {} is not a VkFormat", desc.format.0))
        })?;
        let create_info = xr::SwapchainCreateInfo::<xr::Vulkan> {
            create_flags: xr::SwapchainCreateFlags::EMPTY,
            usage_flags: common::swapchain_usage(desc.usage),
            format,
            sample_count: desc.sample_count,
            width: desc.width,
            height: desc.height,
            face_count: desc.face_count,
            array_size: desc.array_size,
            mip_count: desc.mip_count,
        };
        let swapchain = self
            .session(session)?
            .session
            .create_swapchain(&create_info)
            .map_err(xr_err("xrCreateSwapchain"))?;
        let handle = swapchain.as_raw().into_raw();
        self.swapchains.insert(handle, swapchain);
        Ok(SwapchainHandle(handle))
    }

    fn swapchain_images(&mut self, swapchain: SwapchainHandle) -> BootResult<Vec<ImageHandle>> {
        let swapchain = self
            .swapchains
            .get(&swapchain.as_raw())
            .ok_or(BootError::UnknownHandle {
                kind: "swapchain",
                raw: swapchain.as_raw(),
            })?;
        let images = swapchain
            .enumerate_images()
            .map_err(xr_err("xrEnumerateSwapchainImages"))?;
        Ok(images.into_iter().map(ImageHandle).collect())
    }

    fn create_image_view(
        &mut self,
        device: DeviceHandle,
        desc: &ImageViewDesc,
    ) -> BootResult<ImageViewHandle> {
        let format = i32::try_from(desc.format.0).map_err(|_| {
            BootError::unsupported(format!("image format {} is not a VkFormat", desc.format.0))
        })?;
        let create_info = vk::ImageViewCreateInfo::builder()
            .image(vk::Image::from_raw(desc.image.as_raw()))
            .view_type(vk::ImageViewType::TYPE_2D_ARRAY)
            .format(vk::Format::from_raw(format))
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: common::aspect_mask(desc.aspect),
                base_mip_level: desc.base_mip_level,
                level_count: desc.level_count,
                base_array_layer: desc.base_array_layer,
                layer_count: desc.layer_count,
            });
        let view = unsafe { self.device(device)?.create_image_view(&create_info, None) }
            .map_err(vk_err("vkCreateImageView"))?;
        Ok(ImageViewHandle(view.as_raw()))
    }

    fn poll_event(&mut self, _instance: InstanceHandle) -> BootResult<Option<RuntimeEvent>> {
        let instance = self.instance.as_ref().ok_or(BootError::NotInitialized)?;
        let event = instance
            .poll_event(&mut self.event_buffer)
            .map_err(xr_err("xrPollEvent"))?;
        Ok(event.map(|event| match event {
            xr::Event::SessionStateChanged(changed) => RuntimeEvent::SessionStateChanged {
                session: SessionHandle(changed.session().into_raw()),
                state: SessionState::from_raw(changed.state().into_raw()),
            },
            xr::Event::EventsLost(lost) => RuntimeEvent::EventsLost {
                lost_event_count: lost.lost_event_count(),
            },
            xr::Event::InstanceLossPending(_) => RuntimeEvent::InstanceLossPending,
            _ => RuntimeEvent::Other,
        }))
    }

    fn begin_session(
        &mut self,
        session: SessionHandle,
        view_type: ViewConfigurationType,
    ) -> BootResult<()> {
        self.session(session)?
            .session
            .begin(xr::ViewConfigurationType::from_raw(view_type.0))
            .map_err(xr_err("xrBeginSession"))?;
        Ok(())
    }

    fn end_session(&mut self, session: SessionHandle) -> BootResult<()> {
        self.session(session)?
            .session
            .end()
            .map_err(xr_err("xrEndSession"))?;
        Ok(())
    }

    fn wait_frame(&mut self, session: SessionHandle) -> BootResult<FrameState> {
        let state = self
            .session(session)?
            .waiter
            .wait()
            .map_err(xr_err("xrWaitFrame"))?;
        Ok(FrameState {
            predicted_display_time_ns: state.predicted_display_time.as_nanos(),
            predicted_display_period_ns: state.predicted_display_period.as_nanos(),
            should_render: state.should_render,
        })
    }

    fn begin_frame(&mut self, session: SessionHandle) -> BootResult<()> {
        self.session(session)?
            .stream
            .begin()
            .map_err(xr_err("xrBeginFrame"))?;
        Ok(())
    }

    fn end_frame(
        &mut self,
        session: SessionHandle,
        display_time_ns: i64,
        blend_mode: EnvironmentBlendMode,
    ) -> BootResult<()> {
        self.session(session)?
            .stream
            .end(
                xr::Time::from_nanos(display_time_ns),
                xr::EnvironmentBlendMode::from_raw(blend_mode.0),
                &[],
            )
            .map_err(xr_err("xrEndFrame"))
    }

    fn destroy_image_view(
        &mut self,
        device: DeviceHandle,
        view: ImageViewHandle,
    ) -> BootResult<()> {
        let device = self.device(device)?;
        unsafe { device.destroy_image_view(vk::ImageView::from_raw(view.as_raw()), None) };
        Ok(())
    }

    fn destroy_swapchain(&mut self, swapchain: SwapchainHandle) -> BootResult<()> {
        self.swapchains
            .remove(&swapchain.as_raw())
            .map(drop)
            .ok_or(BootError::UnknownHandle {
                kind: "swapchain",
                raw: swapchain.as_raw(),
            })
    }

    fn destroy_space(&mut self, space: SpaceHandle) -> BootResult<()> {
        self.spaces
            .remove(&space.as_raw())
            .map(drop)
            .ok_or(BootError::UnknownHandle {
                kind: "space",
                raw: space.as_raw(),
            })
    }

    fn destroy_session(&mut self, session: SessionHandle) -> BootResult<()> {
        self.session(session)?;
        self.session = None;
        Ok(())
    }

    fn destroy_vk_debug_messenger(
        &mut self,
        instance: VkInstanceHandle,
        messenger: MessengerHandle,
    ) -> BootResult<()> {
        let loader = self
            .vulkan(instance)?
            .debug_utils
            .as_ref()
            .ok_or(BootError::UnknownHandle {
                kind: "Vulkan debug messenger",
                raw: messenger.as_raw(),
            })?;
        unsafe {
            loader.destroy_debug_utils_messenger(
                vk::DebugUtilsMessengerEXT::from_raw(messenger.as_raw()),
                None,
            )
        };
        Ok(())
    }

    fn destroy_xr_debug_messenger(
        &mut self,
        _instance: InstanceHandle,
        messenger: MessengerHandle,
    ) -> BootResult<()> {
        let instance = self.xr_instance()?;
        let debug_utils = instance
            .exts()
            .ext_debug_utils
            .as_ref()
            .ok_or(BootError::UnknownHandle {
                kind: "OpenXR debug messenger",
                raw: messenger.as_raw(),
            })?;
        let result = unsafe {
            (debug_utils.destroy_debug_utils_messenger)(xr::sys::DebugUtilsMessengerEXT::from_raw(
                messenger.as_raw(),
            ))
        };
        if result.into_raw() < 0 {
            return Err(xr_err("xrDestroyDebugUtilsMessengerEXT")(result));
        }
        Ok(())
    }

    fn destroy_device(&mut self, device: DeviceHandle) -> BootResult<()> {
        self.device(device)?;
        if let Some((_, device)) = self.device.take() {
            unsafe { device.destroy_device(None) };
        }
        Ok(())
    }

    fn destroy_vk_instance(&mut self, instance: VkInstanceHandle) -> BootResult<()> {
        self.vulkan(instance)?;
        if let Some(vulkan) = self.vk_instance.take() {
            unsafe { vulkan.instance.destroy_instance(None) };
        }
        Ok(())
    }

    fn destroy_instance(&mut self, instance: InstanceHandle) -> BootResult<()> {
        match self.instance.take() {
            Some(live) if live.as_raw().into_raw() == instance.as_raw() => Ok(()),
            other => {
                self.instance = other;
                Err(BootError::UnknownHandle {
                    kind: "OpenXR instance",
                    raw: instance.as_raw(),
                })
            }
        }
    }
}
