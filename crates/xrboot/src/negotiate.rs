//! Capability selection: layers, extensions, swapchain formats, queue family.
//!
//! Pure functions over the lists a backend reports. Nothing here touches a
//! runtime or keeps state.

use crate::types::{QueueFamily, SwapchainFormat};

/// First candidate (in priority order) that the driver advertises.
///
/// Returns `None` with a warning when nothing matches; running without
/// validation is never fatal.
pub fn select_validation_layer<S: AsRef<str>>(
    available: &[String],
    candidates: &[S],
) -> Option<String> {
    let selected = candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|candidate| available.iter().any(|layer| layer == candidate))
        .map(str::to_string);
    if selected.is_none() {
        log::warn!("[Negotiate] Could not find a validation layer!");
    }
    selected
}

/// The requested extensions the driver supports, in request order.
///
/// Unsupported extensions are dropped with a warning; the caller decides
/// whether a missing one matters.
pub fn filter_supported_extensions<S: AsRef<str>>(
    requested: &[S],
    available: &[String],
) -> Vec<String> {
    requested
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| {
            let supported = available.iter().any(|ext| ext == name);
            if !supported {
                log::warn!("[Negotiate] Extension {name} is not supported, skipping");
            }
            supported
        })
        .map(str::to_string)
        .collect()
}

/// First preferred format the runtime offers, `None` if there is no overlap.
pub fn select_swapchain_format(
    preferred: &[SwapchainFormat],
    available: &[SwapchainFormat],
) -> Option<SwapchainFormat> {
    preferred
        .iter()
        .copied()
        .find(|format| available.contains(format))
}

/// Index of the first queue family with graphics support.
pub fn select_graphics_queue_family(families: &[QueueFamily]) -> Option<u32> {
    families
        .iter()
        .find(|family| family.graphics && family.queue_count > 0)
        .map(|family| family.index)
}

pub fn describe_format(format: SwapchainFormat) -> &'static str {
    match format {
        SwapchainFormat::R8G8B8A8_UNORM => "VK_FORMAT_R8G8B8A8_UNORM",
        SwapchainFormat::R8G8B8A8_SRGB => "VK_FORMAT_R8G8B8A8_SRGB",
        SwapchainFormat::B8G8R8A8_UNORM => "VK_FORMAT_B8G8R8A8_UNORM",
        SwapchainFormat::B8G8R8A8_SRGB => "VK_FORMAT_B8G8R8A8_SRGB",
        SwapchainFormat::D16_UNORM => "VK_FORMAT_D16_UNORM",
        SwapchainFormat::D32_SFLOAT => "VK_FORMAT_D32_SFLOAT",
        _ => "UNKNOWN_VK_FORMAT",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn family(index: u32, graphics: bool) -> QueueFamily {
        QueueFamily {
            index,
            queue_count: 1,
            graphics,
            compute: true,
            transfer: true,
        }
    }

    #[test]
    fn test_layer_selection_follows_candidate_priority() {
        let available = strings(&["X", "Y"]);
        assert_eq!(
            select_validation_layer(&available, &["V", "X"]),
            Some("X".to_string())
        );
        assert_eq!(
            select_validation_layer(&available, &["Y", "X"]),
            Some("Y".to_string())
        );
    }

    #[test]
    fn test_layer_selection_without_overlap_is_none() {
        let available = strings(&["X", "Y"]);
        assert_eq!(select_validation_layer(&available, &["V", "W"]), None);
        assert_eq!(select_validation_layer::<&str>(&available, &[]), None);
    }

    #[test]
    fn test_extension_filter_drops_missing() {
        let available = strings(&["a", "b", "c"]);
        let filtered = filter_supported_extensions(&["c", "missing", "a"], &available);
        assert_eq!(filtered, strings(&["c", "a"]));
    }

    #[test]
    fn test_extension_filter_is_idempotent() {
        let available = strings(&["VK_EXT_debug_utils", "VK_KHR_surface"]);
        let once = filter_supported_extensions(
            &["VK_EXT_debug_utils", "VK_KHR_android_surface"],
            &available,
        );
        let twice = filter_supported_extensions(&once, &available);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_selection_picks_first_preferred_available() {
        let a = SwapchainFormat(1);
        let b = SwapchainFormat(2);
        let c = SwapchainFormat(3);
        let d = SwapchainFormat(4);
        assert_eq!(select_swapchain_format(&[a, b, c], &[d, b]), Some(b));
        assert_eq!(select_swapchain_format(&[a, b, c], &[d]), None);
        assert_eq!(select_swapchain_format(&[a, b, c], &[]), None);
    }

    #[test]
    fn test_color_preference_order() {
        let available = [
            SwapchainFormat::R8G8B8A8_UNORM,
            SwapchainFormat::R8G8B8A8_SRGB,
            SwapchainFormat::D32_SFLOAT,
        ];
        assert_eq!(
            select_swapchain_format(&SwapchainFormat::COLOR_PREFERENCE, &available),
            Some(SwapchainFormat::R8G8B8A8_SRGB)
        );
        assert_eq!(
            select_swapchain_format(&SwapchainFormat::DEPTH_PREFERENCE, &available),
            Some(SwapchainFormat::D32_SFLOAT)
        );
    }

    #[test]
    fn test_graphics_queue_family() {
        let families = [family(0, false), family(1, true), family(2, true)];
        assert_eq!(select_graphics_queue_family(&families), Some(1));
        assert_eq!(select_graphics_queue_family(&[family(0, false)]), None);
        assert_eq!(select_graphics_queue_family(&[]), None);
    }

    #[test]
    fn test_describe_format() {
        assert_eq!(
            describe_format(SwapchainFormat::B8G8R8A8_SRGB),
            "VK_FORMAT_B8G8R8A8_SRGB"
        );
        assert_eq!(describe_format(SwapchainFormat(9999)), "UNKNOWN_VK_FORMAT");
    }
}
