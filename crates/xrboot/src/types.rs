//! Handles, descriptors and events exchanged with a backend.
//!
//! Handles are raw values owned by the backend; the bootstrap only copies them
//! into later calls and hands them back for destruction.

macro_rules! raw_handle {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(pub u64);

            impl $name {
                pub fn as_raw(self) -> u64 {
                    self.0
                }
            }
        )*
    };
}

raw_handle!(
    /// Connection to the XR runtime.
    InstanceHandle,
    /// Head-mounted display system reported by the runtime.
    SystemId,
    /// Debug-utils messenger of either domain.
    MessengerHandle,
    VkInstanceHandle,
    PhysicalDeviceHandle,
    DeviceHandle,
    QueueHandle,
    SessionHandle,
    SpaceHandle,
    SwapchainHandle,
    /// Runtime-owned swapchain image.
    ImageHandle,
    ImageViewHandle,
);

pub const XR_KHR_VULKAN_ENABLE2: &str = "XR_KHR_vulkan_enable2";
pub const XR_KHR_ANDROID_CREATE_INSTANCE: &str = "XR_KHR_android_create_instance";
pub const XR_EXT_LOCAL_FLOOR: &str = "XR_EXT_local_floor";
pub const XR_EXT_DEBUG_UTILS: &str = "XR_EXT_debug_utils";
pub const VK_EXT_DEBUG_UTILS: &str = "VK_EXT_debug_utils";

/// Application and engine identity shared by the XR and Vulkan instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub application_name: String,
    pub application_version: u32,
    pub engine_name: String,
    pub engine_version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u32,
}

impl ApiVersion {
    pub const VULKAN_1_1: Self = Self::new(1, 1, 0);

    pub const fn new(major: u16, minor: u16, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Vulkan versions the runtime accepts for this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsRequirements {
    pub min_api_version: ApiVersion,
    pub max_api_version: ApiVersion,
}

impl GraphicsRequirements {
    /// The maximum is only binding on the major version.
    pub fn accepts(&self, version: ApiVersion) -> bool {
        version >= self.min_api_version && version.major <= self.max_api_version.major
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    pub system_name: String,
    pub vendor_id: u32,
    pub max_swapchain_width: u32,
    pub max_swapchain_height: u32,
    pub max_layer_count: u32,
    pub orientation_tracking: bool,
    pub position_tracking: bool,
}

/// Vulkan instance parameters handed to the runtime's instance factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VkInstanceDesc {
    pub identity: AppIdentity,
    pub api_version: ApiVersion,
    pub layers: Vec<String>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub queue_count: u32,
    pub graphics: bool,
    pub compute: bool,
    pub transfer: bool,
}

/// Logical device parameters handed to the runtime's device factory.
#[derive(Debug, Clone, PartialEq)]
pub struct VkDeviceDesc {
    pub queue_family_index: u32,
    pub queue_priorities: Vec<f32>,
    pub multiview: bool,
    pub extensions: Vec<String>,
}

/// Graphics objects the session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsBinding {
    pub instance: VkInstanceHandle,
    pub physical_device: PhysicalDeviceHandle,
    pub device: DeviceHandle,
    pub queue_family_index: u32,
    pub queue_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceSpaceType {
    View,
    Local,
    Stage,
    LocalFloor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub orientation: [f32; 4],
    pub position: [f32; 3],
}

impl Pose {
    pub const IDENTITY: Self = Self {
        orientation: [0.0, 0.0, 0.0, 1.0],
        position: [0.0, 0.0, 0.0],
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewConfigurationType(pub i32);

impl ViewConfigurationType {
    pub const PRIMARY_MONO: Self = Self(1);
    pub const PRIMARY_STEREO: Self = Self(2);
}

/// Per-eye rendering recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfigurationView {
    pub recommended_width: u32,
    pub recommended_height: u32,
    pub recommended_sample_count: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub max_sample_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentBlendMode(pub i32);

impl EnvironmentBlendMode {
    pub const OPAQUE: Self = Self(1);
    pub const ADDITIVE: Self = Self(2);
    pub const ALPHA_BLEND: Self = Self(3);

    pub fn name(self) -> &'static str {
        match self {
            Self::OPAQUE => "OPAQUE",
            Self::ADDITIVE => "ADDITIVE",
            Self::ALPHA_BLEND => "ALPHA_BLEND",
            _ => "UNKNOWN",
        }
    }
}

/// A swapchain pixel format as reported by the runtime (a `VkFormat` value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapchainFormat(pub i64);

impl SwapchainFormat {
    pub const R8G8B8A8_UNORM: Self = Self(37);
    pub const R8G8B8A8_SRGB: Self = Self(43);
    pub const B8G8R8A8_UNORM: Self = Self(44);
    pub const B8G8R8A8_SRGB: Self = Self(50);
    pub const D16_UNORM: Self = Self(124);
    pub const D32_SFLOAT: Self = Self(126);

    /// Colour formats, sRGB before linear and BGRA before RGBA.
    pub const COLOR_PREFERENCE: [Self; 4] = [
        Self::B8G8R8A8_SRGB,
        Self::R8G8B8A8_SRGB,
        Self::B8G8R8A8_UNORM,
        Self::R8G8B8A8_UNORM,
    ];

    pub const DEPTH_PREFERENCE: [Self; 2] = [Self::D32_SFLOAT, Self::D16_UNORM];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapchainRole {
    Color,
    Depth,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapchainUsage {
    pub color_attachment: bool,
    pub depth_stencil_attachment: bool,
    pub sampled: bool,
}

impl SwapchainUsage {
    pub fn for_role(role: SwapchainRole) -> Self {
        match role {
            SwapchainRole::Color => Self {
                color_attachment: true,
                sampled: true,
                ..Self::default()
            },
            SwapchainRole::Depth => Self {
                depth_stencil_attachment: true,
                sampled: true,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub usage: SwapchainUsage,
    pub format: SwapchainFormat,
    pub sample_count: u32,
    pub width: u32,
    pub height: u32,
    pub face_count: u32,
    pub array_size: u32,
    pub mip_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAspect {
    Color,
    Depth,
}

/// A 2D-array view over one swapchain image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageViewDesc {
    pub image: ImageHandle,
    pub format: SwapchainFormat,
    pub aspect: ImageAspect,
    pub base_mip_level: u32,
    pub level_count: u32,
    pub base_array_layer: u32,
    pub layer_count: u32,
}

/// Session state as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Idle,
    Ready,
    Synchronized,
    Visible,
    Focused,
    Stopping,
    LossPending,
    Exiting,
    Other(i32),
}

impl SessionState {
    /// Maps an `XrSessionState` value.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Unknown,
            1 => Self::Idle,
            2 => Self::Ready,
            3 => Self::Synchronized,
            4 => Self::Visible,
            5 => Self::Focused,
            6 => Self::Stopping,
            7 => Self::LossPending,
            8 => Self::Exiting,
            other => Self::Other(other),
        }
    }
}

/// One entry of the runtime event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    SessionStateChanged {
        session: SessionHandle,
        state: SessionState,
    },
    EventsLost {
        lost_event_count: u32,
    },
    InstanceLossPending,
    /// Any event type the bootstrap does not act on.
    Other,
}

/// Frame timing returned by a frame wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    pub predicted_display_time_ns: i64,
    pub predicted_display_period_ns: i64,
    pub should_render: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_mode_names() {
        assert_eq!(EnvironmentBlendMode::OPAQUE.name(), "OPAQUE");
        assert_eq!(EnvironmentBlendMode::ADDITIVE.name(), "ADDITIVE");
        assert_eq!(EnvironmentBlendMode::ALPHA_BLEND.name(), "ALPHA_BLEND");
        assert_eq!(EnvironmentBlendMode(42).name(), "UNKNOWN");
    }

    #[test]
    fn test_requirements_bind_only_major_maximum() {
        let requirements = GraphicsRequirements {
            min_api_version: ApiVersion::new(1, 0, 0),
            max_api_version: ApiVersion::new(1, 1, 0),
        };
        assert!(requirements.accepts(ApiVersion::new(1, 3, 0)));
        assert!(!requirements.accepts(ApiVersion::new(2, 0, 0)));
    }
}
