//! Bootstrap and teardown against the scripted backend.

use xrboot::types::{
    EnvironmentBlendMode, ImageAspect, ReferenceSpaceType, SessionState, SwapchainFormat,
    SwapchainRole, ViewConfigurationType, XR_EXT_DEBUG_UTILS, XR_EXT_LOCAL_FLOOR,
    XR_KHR_VULKAN_ENABLE2,
};
use xrboot::{AppState, BootConfig, BootError, DummyBackend, LifecycleState, Program};

fn config() -> BootConfig {
    BootConfig {
        enable_validation: true,
        debug_messengers: true,
        ..BootConfig::default()
    }
}

fn running_app() -> AppState {
    AppState {
        started: true,
        running: true,
        ..AppState::headless()
    }
}

#[test]
fn test_bootstrap_runs_handshake_in_order() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    assert!(program.is_initialized());

    let backend = program.backend();
    let order = [
        "initialize_loader",
        "create_instance",
        "create_xr_debug_messenger",
        "system",
        "system_properties",
        "graphics_requirements",
        "available_layers",
        "available_instance_extensions",
        "create_vk_instance",
        "create_vk_debug_messenger",
        "graphics_device",
        "queue_families",
        "create_vk_device",
        "device_queue",
        "create_session",
        "create_reference_space",
        "view_configurations",
        "view_configuration_views",
        "swapchain_formats",
        "create_swapchain",
        "create_image_view",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|op| backend.position(op).unwrap_or_else(|| panic!("{op} not called")))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", backend.calls);

    assert_eq!(
        backend.instance_extensions_requested,
        vec![XR_EXT_LOCAL_FLOOR, XR_KHR_VULKAN_ENABLE2, XR_EXT_DEBUG_UTILS]
    );
    let vk_desc = &backend.vk_instance_descs[0];
    assert_eq!(vk_desc.layers, vec!["VK_LAYER_KHRONOS_validation".to_string()]);
    assert_eq!(vk_desc.extensions, vec!["VK_EXT_debug_utils".to_string()]);
}

#[test]
fn test_graphics_queue_comes_from_first_graphics_family() {
    let mut backend = DummyBackend::new();
    backend.queue_families.reverse();
    let mut program = Program::new(backend, config());
    program.init().unwrap();
    assert_eq!(program.device().unwrap().queue_family_index, 0);
}

#[test]
fn test_validation_disabled_skips_layer_query() {
    let config = BootConfig {
        enable_validation: false,
        debug_messengers: false,
        ..BootConfig::default()
    };
    let mut program = Program::new(DummyBackend::new(), config);
    program.init().unwrap();
    let backend = program.backend();
    assert!(!backend.called("available_layers"));
    assert!(!backend.called("create_xr_debug_messenger"));
    assert!(!backend.called("create_vk_debug_messenger"));
    assert!(backend.vk_instance_descs[0].layers.is_empty());
}

#[test]
fn test_missing_vulkan_debug_utils_skips_vulkan_messenger() {
    let mut backend = DummyBackend::new();
    backend
        .instance_extensions
        .retain(|ext| ext != "VK_EXT_debug_utils");
    let mut program = Program::new(backend, config());
    program.init().unwrap();

    let backend = program.backend();
    assert!(backend.called("create_xr_debug_messenger"));
    assert!(!backend.called("create_vk_debug_messenger"));
    assert!(backend.vk_instance_descs[0].extensions.is_empty());
    assert!(program.device().unwrap().enabled_extensions.is_empty());
}

#[test]
fn test_second_init_is_rejected_without_new_objects() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    let live = program.backend().live_objects();

    let err = program.init().unwrap_err();
    assert!(matches!(err, BootError::AlreadyInitialized));
    assert_eq!(program.backend().call_count("create_instance"), 1);
    assert_eq!(program.backend().call_count("create_session"), 1);
    assert_eq!(program.backend().live_objects(), live);
    assert!(program.is_initialized());

    program.shutdown();
    assert_eq!(program.backend().live_objects(), 0);
}

#[test]
fn test_first_advertised_blend_mode_is_used() {
    let mut backend = DummyBackend::new();
    backend.blend_modes = vec![EnvironmentBlendMode::ADDITIVE, EnvironmentBlendMode::OPAQUE];
    let mut program = Program::new(backend, config());
    program.init().unwrap();
    assert_eq!(
        program.swapchains().unwrap().blend_mode,
        EnvironmentBlendMode::ADDITIVE
    );
}

#[test]
fn test_reference_spaces_are_distinct_and_fourth_type_is_an_error() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    let spaces = program.reference_spaces();

    let view = spaces.get(ReferenceSpaceType::View).unwrap();
    let stage = spaces.get(ReferenceSpaceType::Stage).unwrap();
    let floor = spaces.get(ReferenceSpaceType::LocalFloor).unwrap();
    assert_ne!(view, stage);
    assert_ne!(stage, floor);
    assert_ne!(view, floor);
    assert_eq!(spaces.len(), 3);
    assert!(!spaces.contains(ReferenceSpaceType::Local));

    let err = spaces.get(ReferenceSpaceType::Local).unwrap_err();
    assert!(matches!(
        err,
        BootError::MissingReferenceSpace(ReferenceSpaceType::Local)
    ));
}

#[test]
fn test_multiview_swapchains_cover_both_eyes() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    let set = program.swapchains().unwrap();

    assert_eq!(set.view_type, ViewConfigurationType::PRIMARY_STEREO);
    assert_eq!(set.eye_count(), 2);
    assert_eq!(set.color.format, SwapchainFormat::R8G8B8A8_SRGB);
    assert_eq!(set.depth.format, SwapchainFormat::D32_SFLOAT);
    assert_eq!(set.color.role, SwapchainRole::Color);

    let backend = program.backend();
    assert_eq!(backend.swapchain_descs.len(), 2);
    for desc in &backend.swapchain_descs {
        assert_eq!(desc.array_size, 2);
        assert_eq!((desc.width, desc.height), (1832, 1920));
        assert_eq!(desc.face_count, 1);
        assert_eq!(desc.mip_count, 1);
    }
    for desc in &backend.image_view_descs {
        assert_eq!(desc.layer_count, 2);
        assert_eq!(desc.base_array_layer, 0);
        assert_eq!(desc.level_count, 1);
    }
    let depth_views = backend
        .image_view_descs
        .iter()
        .filter(|desc| desc.aspect == ImageAspect::Depth)
        .count();
    assert_eq!(depth_views, set.depth.image_count());
}

#[test]
fn test_image_view_count_matches_image_count() {
    for images in [1, 3, 5] {
        let mut backend = DummyBackend::new();
        backend.images_per_swapchain = images;
        let mut program = Program::new(backend, config());
        program.init().unwrap();
        let set = program.swapchains().unwrap();
        for info in [&set.color, &set.depth] {
            assert_eq!(info.image_count(), images);
            assert_eq!(info.views.len(), info.images.len());
        }
    }
}

#[test]
fn test_missing_stereo_configuration_fails_bootstrap() {
    let mut backend = DummyBackend::new();
    backend.view_configurations = vec![ViewConfigurationType::PRIMARY_MONO];
    let mut program = Program::new(backend, config());

    let err = program.init().unwrap_err();
    assert!(matches!(err, BootError::Unsupported(_)));
    assert!(!program.is_initialized());
    assert!(!program.backend().called("create_swapchain"));
    assert_eq!(program.backend().live_objects(), 0);
}

#[test]
fn test_missing_depth_format_fails_bootstrap() {
    let mut backend = DummyBackend::new();
    backend.formats = vec![SwapchainFormat::B8G8R8A8_SRGB];
    let mut program = Program::new(backend, config());
    assert!(matches!(program.init(), Err(BootError::Unsupported(_))));
    assert!(!program.backend().called("create_swapchain"));
}

#[test]
fn test_runtime_rejecting_vulkan_1_1_fails_bootstrap() {
    let mut backend = DummyBackend::new();
    backend.requirements.min_api_version = xrboot::types::ApiVersion::new(1, 2, 0);
    let mut program = Program::new(backend, config());
    assert!(matches!(program.init(), Err(BootError::Unsupported(_))));
    assert!(!program.backend().called("create_vk_instance"));
}

#[test]
fn test_failed_step_tears_down_partial_objects() {
    let mut backend = DummyBackend::new();
    backend.fail_on("create_session");
    let mut program = Program::new(backend, config());

    let err = program.init().unwrap_err();
    assert_eq!(err.domain(), Some(xrboot::Domain::Xr));
    assert!(matches!(
        err,
        BootError::Call {
            operation: "create_session",
            ..
        }
    ));
    let backend = program.backend();
    assert_eq!(backend.live_objects(), 0);
    assert!(backend.called("destroy_device"));
    assert!(backend.called("destroy_instance"));
    assert!(!backend.called("destroy_session"));
}

#[test]
fn test_teardown_runs_in_reverse_dependency_order() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    let created = program.backend().calls.len();
    program.shutdown();

    let backend = program.backend();
    let teardown = &backend.calls[created..];
    let last_of = |op: &str| teardown.iter().rposition(|call| *call == op).unwrap();
    let first_of = |op: &str| teardown.iter().position(|call| *call == op).unwrap();

    assert!(last_of("destroy_image_view") < first_of("destroy_swapchain"));
    assert!(last_of("destroy_swapchain") < first_of("destroy_space"));
    assert!(last_of("destroy_space") < first_of("destroy_session"));
    assert!(first_of("destroy_session") < first_of("destroy_vk_debug_messenger"));
    assert!(first_of("destroy_vk_debug_messenger") < first_of("destroy_xr_debug_messenger"));
    assert!(first_of("destroy_xr_debug_messenger") < first_of("destroy_device"));
    assert!(first_of("destroy_device") < first_of("destroy_vk_instance"));
    assert!(first_of("destroy_vk_instance") < first_of("destroy_instance"));
    assert_eq!(backend.call_count("destroy_image_view"), 6);
    assert_eq!(backend.live_objects(), 0);
}

#[test]
fn test_shutdown_is_idempotent() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    program.shutdown();
    let calls = program.backend().calls.len();
    program.shutdown();
    assert_eq!(program.backend().calls.len(), calls);
    assert!(program.init().is_err());
}

#[test]
fn test_teardown_continues_after_destroy_failure() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    program.backend_mut().fail_on("destroy_swapchain");
    program.shutdown();
    let backend = program.backend();
    assert!(backend.called("destroy_instance"));
    assert_eq!(backend.live_objects(), 2);
}

#[test]
fn test_first_tick_begins_session_on_ready() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    program
        .backend_mut()
        .push_session_state(SessionState::Ready);

    let mut app = running_app();
    program.tick(&mut app);

    assert_eq!(program.lifecycle().state(), LifecycleState::Running);
    assert!(program.lifecycle().session_running());
    let backend = program.backend();
    assert_eq!(backend.call_count("begin_session"), 1);
    assert_eq!(backend.call_count("wait_frame"), 1);
    assert_eq!(backend.call_count("end_frame"), 1);
    assert!(program.frame_state().unwrap().should_render);
}

#[test]
fn test_no_frame_wait_before_session_runs() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    let mut app = running_app();
    program.tick(&mut app);
    assert!(!program.backend().called("wait_frame"));
    assert!(program.frame_state().is_none());
}

#[test]
fn test_frame_wait_failure_keeps_session_running() {
    let mut program = Program::new(DummyBackend::new(), config());
    program.init().unwrap();
    program
        .backend_mut()
        .push_session_state(SessionState::Ready);
    program.backend_mut().fail_on("wait_frame");

    let mut app = running_app();
    program.tick(&mut app);
    assert!(program.lifecycle().session_running());
    assert!(!program.backend().called("begin_frame"));
}

#[test]
fn test_empty_frame_submission_can_be_disabled() {
    let config = BootConfig {
        submit_empty_frames: false,
        ..config()
    };
    let mut program = Program::new(DummyBackend::new(), config);
    program.init().unwrap();
    program
        .backend_mut()
        .push_session_state(SessionState::Ready);
    let mut app = running_app();
    program.tick(&mut app);
    assert!(program.backend().called("wait_frame"));
    assert!(!program.backend().called("begin_frame"));
}

#[test]
fn test_uninitialized_program_ticks_are_noops() {
    let mut program = Program::new(DummyBackend::new(), config());
    let mut app = running_app();
    program.tick(&mut app);
    assert!(program.backend().calls.is_empty());
}
