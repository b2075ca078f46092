//! View configuration and multiview swapchains.
//!
//! One colour and one depth swapchain serve both eyes: each image has one
//! array layer per view and every image gets a 2D-array view over all layers.

use crate::backend::XrBackend;
use crate::builder::DeviceBundle;
use crate::ledger::ResourceLedger;
use crate::negotiate;
use crate::types::{
    EnvironmentBlendMode, ImageAspect, ImageHandle, ImageViewDesc, ImageViewHandle,
    SessionHandle, SwapchainDesc, SwapchainFormat, SwapchainHandle, SwapchainRole,
    SwapchainUsage, ViewConfigurationType, ViewConfigurationView,
};
use crate::{BootError, BootResult};

/// A runtime swapchain with views over its images.
///
/// Images belong to the runtime; the views belong to the bootstrap and are
/// released through the ledger before the device.
#[derive(Debug, Clone)]
pub struct SwapchainInfo {
    pub role: SwapchainRole,
    pub swapchain: SwapchainHandle,
    pub format: SwapchainFormat,
    pub width: u32,
    pub height: u32,
    pub array_size: u32,
    pub images: Vec<ImageHandle>,
    pub views: Vec<ImageViewHandle>,
}

impl SwapchainInfo {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

#[derive(Debug, Clone)]
pub struct SwapchainSet {
    pub view_type: ViewConfigurationType,
    pub views: Vec<ViewConfigurationView>,
    pub blend_mode: EnvironmentBlendMode,
    pub color: SwapchainInfo,
    pub depth: SwapchainInfo,
}

impl SwapchainSet {
    pub fn eye_count(&self) -> usize {
        self.views.len()
    }
}

pub fn build_swapchains<B: XrBackend + ?Sized>(
    backend: &mut B,
    device: &DeviceBundle,
    session: SessionHandle,
    ledger: &mut ResourceLedger,
) -> BootResult<SwapchainSet> {
    let view_type = ViewConfigurationType::PRIMARY_STEREO;
    let view_types = backend.view_configurations(device.system)?;
    if !view_types.contains(&view_type) {
        return Err(BootError::unsupported(
            "view configuration STEREO was not supported on runtime",
        ));
    }

    let views = backend.view_configuration_views(device.system, view_type)?;
    let first = *views
        .first()
        .ok_or_else(|| BootError::unsupported("runtime reported no stereo views"))?;
    for (eye, view) in views.iter().enumerate() {
        log::info!(
            "[Swapchain] View {eye}: recommended {}x{} x{} samples",
            view.recommended_width,
            view.recommended_height,
            view.recommended_sample_count
        );
    }

    let blend_mode = backend
        .environment_blend_modes(device.system, view_type)?
        .first()
        .copied()
        .unwrap_or(EnvironmentBlendMode::OPAQUE);
    log::info!("[Swapchain] Environment blend mode {}", blend_mode.name());

    let formats = backend.swapchain_formats(session)?;
    let color_format =
        negotiate::select_swapchain_format(&SwapchainFormat::COLOR_PREFERENCE, &formats);
    let depth_format =
        negotiate::select_swapchain_format(&SwapchainFormat::DEPTH_PREFERENCE, &formats);
    let (color_format, depth_format) = match (color_format, depth_format) {
        (Some(color), Some(depth)) => (color, depth),
        _ => {
            return Err(BootError::unsupported(format!(
                "no supported swapchain format for color or depth (runtime offers {:?})",
                formats.iter().map(|f| f.0).collect::<Vec<_>>()
            )))
        }
    };
    log::info!(
        "[Swapchain] Selected color {} and depth {}",
        negotiate::describe_format(color_format),
        negotiate::describe_format(depth_format)
    );

    let layer_count = views.len() as u32;
    let color = create_swapchain(
        backend,
        device,
        session,
        ledger,
        SwapchainRole::Color,
        color_format,
        &first,
        layer_count,
    )?;
    let depth = create_swapchain(
        backend,
        device,
        session,
        ledger,
        SwapchainRole::Depth,
        depth_format,
        &first,
        layer_count,
    )?;

    Ok(SwapchainSet {
        view_type,
        views,
        blend_mode,
        color,
        depth,
    })
}

#[allow(clippy::too_many_arguments)]
fn create_swapchain<B: XrBackend + ?Sized>(
    backend: &mut B,
    device: &DeviceBundle,
    session: SessionHandle,
    ledger: &mut ResourceLedger,
    role: SwapchainRole,
    format: SwapchainFormat,
    view: &ViewConfigurationView,
    layer_count: u32,
) -> BootResult<SwapchainInfo> {
    let desc = SwapchainDesc {
        usage: SwapchainUsage::for_role(role),
        format,
        sample_count: view.recommended_sample_count,
        width: view.recommended_width,
        height: view.recommended_height,
        face_count: 1,
        array_size: layer_count,
        mip_count: 1,
    };
    let swapchain = backend.create_swapchain(session, &desc)?;
    ledger.record_swapchain(swapchain);

    let images = backend.swapchain_images(swapchain)?;
    let aspect = match role {
        SwapchainRole::Color => ImageAspect::Color,
        SwapchainRole::Depth => ImageAspect::Depth,
    };

    let mut views = Vec::with_capacity(images.len());
    for &image in &images {
        let view_desc = ImageViewDesc {
            image,
            format,
            aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count,
        };
        let image_view = backend.create_image_view(device.device, &view_desc)?;
        ledger.record_image_view(device.device, image_view);
        views.push(image_view);
    }

    log::info!(
        "[Swapchain] {:?} swapchain {}x{} with {} layers, {} images",
        role,
        desc.width,
        desc.height,
        layer_count,
        images.len()
    );

    Ok(SwapchainInfo {
        role,
        swapchain,
        format,
        width: desc.width,
        height: desc.height,
        array_size: layer_count,
        images,
        views,
    })
}
