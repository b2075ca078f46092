use std::ffi::CString;
use std::os::raw::c_char;

use ash::vk;
use openxr as xr;
use xrboot::types::{
    ApiVersion, ImageAspect, QueueFamily, ReferenceSpaceType, SwapchainUsage,
    ViewConfigurationView, XR_EXT_DEBUG_UTILS, XR_EXT_LOCAL_FLOOR, XR_KHR_VULKAN_ENABLE2,
};
use xrboot::BootError;

pub(crate) fn xr_err(operation: &'static str) -> impl FnOnce(xr::sys::Result) -> BootError {
    move |code| BootError::xr(operation, code.into_raw())
}

pub(crate) fn vk_err(operation: &'static str) -> impl FnOnce(vk::Result) -> BootError {
    move |code| BootError::vk(operation, code.as_raw())
}

/// Typed flags for the extensions the crate knows, raw names for the rest.
pub(crate) fn extension_set(names: &[&str]) -> xr::ExtensionSet {
    let mut exts = xr::ExtensionSet::default();
    for name in names {
        match *name {
            XR_KHR_VULKAN_ENABLE2 => exts.khr_vulkan_enable2 = true,
            XR_EXT_DEBUG_UTILS => exts.ext_debug_utils = true,
            XR_EXT_LOCAL_FLOOR => exts.ext_local_floor = true,
            #[cfg(target_os = "android")]
            xrboot::types::XR_KHR_ANDROID_CREATE_INSTANCE => {
                exts.khr_android_create_instance = true
            }
            other => exts.other.push(other.as_bytes().to_vec()),
        }
    }
    exts
}

pub(crate) fn reference_space_type(space_type: ReferenceSpaceType) -> xr::ReferenceSpaceType {
    match space_type {
        ReferenceSpaceType::View => xr::ReferenceSpaceType::VIEW,
        ReferenceSpaceType::Local => xr::ReferenceSpaceType::LOCAL,
        ReferenceSpaceType::Stage => xr::ReferenceSpaceType::STAGE,
        ReferenceSpaceType::LocalFloor => xr::ReferenceSpaceType::LOCAL_FLOOR_EXT,
    }
}

pub(crate) fn swapchain_usage(usage: SwapchainUsage) -> xr::SwapchainUsageFlags {
    let mut flags = xr::SwapchainUsageFlags::EMPTY;
    if usage.color_attachment {
        flags = flags | xr::SwapchainUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.depth_stencil_attachment {
        flags = flags | xr::SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    if usage.sampled {
        flags = flags | xr::SwapchainUsageFlags::SAMPLED;
    }
    flags
}

pub(crate) fn aspect_mask(aspect: ImageAspect) -> vk::ImageAspectFlags {
    match aspect {
        ImageAspect::Color => vk::ImageAspectFlags::COLOR,
        ImageAspect::Depth => vk::ImageAspectFlags::DEPTH,
    }
}

pub(crate) fn vk_api_version(version: ApiVersion) -> u32 {
    vk::make_api_version(
        0,
        u32::from(version.major),
        u32::from(version.minor),
        version.patch,
    )
}

pub(crate) fn api_version(version: xr::Version) -> ApiVersion {
    ApiVersion::new(version.major(), version.minor(), version.patch())
}

pub(crate) fn view_configuration_view(view: &xr::ViewConfigurationView) -> ViewConfigurationView {
    ViewConfigurationView {
        recommended_width: view.recommended_image_rect_width,
        recommended_height: view.recommended_image_rect_height,
        recommended_sample_count: view.recommended_swapchain_sample_count,
        max_width: view.max_image_rect_width,
        max_height: view.max_image_rect_height,
        max_sample_count: view.max_swapchain_sample_count,
    }
}

pub(crate) fn queue_family(index: usize, properties: &vk::QueueFamilyProperties) -> QueueFamily {
    QueueFamily {
        index: index as u32,
        queue_count: properties.queue_count,
        graphics: properties.queue_flags.contains(vk::QueueFlags::GRAPHICS),
        compute: properties.queue_flags.contains(vk::QueueFlags::COMPUTE),
        transfer: properties.queue_flags.contains(vk::QueueFlags::TRANSFER),
    }
}

/// Owned C strings plus the pointer array Vulkan create-infos expect.
pub(crate) struct NameList {
    _names: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl NameList {
    pub(crate) fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, BootError> {
        let names = names
            .iter()
            .map(|name| {
                CString::new(name.as_ref()).map_err(|_| {
                    BootError::unsupported(format!("name {:?} contains NUL", name.as_ref()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pointers = names.iter().map(|name| name.as_ptr()).collect();
        Ok(Self {
            _names: names,
            pointers,
        })
    }

    pub(crate) fn as_ptrs(&self) -> &[*const c_char] {
        &self.pointers
    }
}

pub(crate) fn c_string(value: &str) -> Result<CString, BootError> {
    CString::new(value).map_err(|_| BootError::unsupported(format!("name {value:?} contains NUL")))
}

/// Reads a fixed-size, NUL-terminated name array from a Vulkan property
/// struct.
pub(crate) fn fixed_name(raw: &[c_char]) -> String {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_set_uses_typed_flags() {
        let exts = extension_set(&[
            XR_EXT_LOCAL_FLOOR,
            XR_KHR_VULKAN_ENABLE2,
            XR_EXT_DEBUG_UTILS,
            "XR_FB_display_refresh_rate",
        ]);
        assert!(exts.ext_local_floor);
        assert!(exts.khr_vulkan_enable2);
        assert!(exts.ext_debug_utils);
        assert_eq!(exts.other, vec![b"XR_FB_display_refresh_rate".to_vec()]);
    }

    #[test]
    fn test_local_floor_maps_to_extension_value() {
        assert_eq!(
            reference_space_type(ReferenceSpaceType::LocalFloor),
            xr::ReferenceSpaceType::LOCAL_FLOOR_EXT
        );
        assert_eq!(
            reference_space_type(ReferenceSpaceType::Stage),
            xr::ReferenceSpaceType::STAGE
        );
    }

    #[test]
    fn test_depth_usage_flags() {
        let flags = swapchain_usage(SwapchainUsage::for_role(xrboot::types::SwapchainRole::Depth));
        assert!(flags.contains(xr::SwapchainUsageFlags::DEPTH_STENCIL_ATTACHMENT));
        assert!(!flags.contains(xr::SwapchainUsageFlags::COLOR_ATTACHMENT));
    }

    #[test]
    fn test_vulkan_1_1_encoding() {
        assert_eq!(vk_api_version(ApiVersion::VULKAN_1_1), vk::API_VERSION_1_1);
    }

    #[test]
    fn test_fixed_name_stops_at_nul() {
        let mut raw = [0 as c_char; 16];
        for (slot, byte) in raw.iter_mut().zip(b"VK_LAYER_x") {
            *slot = *byte as c_char;
        }
        assert_eq!(fixed_name(&raw), "VK_LAYER_x");
    }

    #[test]
    fn test_name_list_rejects_interior_nul() {
        assert!(NameList::new(&["ok", "bad\0name"]).is_err());
        assert_eq!(NameList::new(&["a", "b"]).unwrap().as_ptrs().len(), 2);
    }
}
