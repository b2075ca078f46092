//! Debug-utils callbacks for both domains.
//!
//! The runtime and the Vulkan loader call these from whatever thread raised
//! the message; they only format and forward to the log.

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;

use ash::vk;
use openxr as xr;
use xrboot::debug::{self, DebugSeverity, DebugSource};

type XrSeverityFlags = xr::sys::DebugUtilsMessageSeverityFlagsEXT;
type XrTypeFlags = xr::sys::DebugUtilsMessageTypeFlagsEXT;

pub(crate) fn xr_severity_flags(severities: &[DebugSeverity]) -> XrSeverityFlags {
    severities
        .iter()
        .fold(XrSeverityFlags::EMPTY, |flags, severity| {
            flags
                | match severity {
                    DebugSeverity::Verbose => XrSeverityFlags::VERBOSE,
                    DebugSeverity::Info => XrSeverityFlags::INFO,
                    DebugSeverity::Warning => XrSeverityFlags::WARNING,
                    DebugSeverity::Error => XrSeverityFlags::ERROR,
                }
        })
}

pub(crate) fn xr_message_types() -> XrTypeFlags {
    XrTypeFlags::GENERAL
        | XrTypeFlags::VALIDATION
        | XrTypeFlags::PERFORMANCE
        | XrTypeFlags::CONFORMANCE
}

pub(crate) fn vk_severity_flags(
    severities: &[DebugSeverity],
) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    severities.iter().fold(
        vk::DebugUtilsMessageSeverityFlagsEXT::empty(),
        |flags, severity| {
            flags
                | match severity {
                    DebugSeverity::Verbose => vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
                    DebugSeverity::Info => vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
                    DebugSeverity::Warning => vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                    DebugSeverity::Error => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                }
        },
    )
}

pub(crate) fn vk_message_types() -> vk::DebugUtilsMessageTypeFlagsEXT {
    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
}

/// Most severe bit set in a runtime severity mask.
fn from_xr(flags: XrSeverityFlags) -> DebugSeverity {
    if flags.contains(XrSeverityFlags::ERROR) {
        DebugSeverity::Error
    } else if flags.contains(XrSeverityFlags::WARNING) {
        DebugSeverity::Warning
    } else if flags.contains(XrSeverityFlags::INFO) {
        DebugSeverity::Info
    } else {
        DebugSeverity::Verbose
    }
}

fn from_vk(flags: vk::DebugUtilsMessageSeverityFlagsEXT) -> DebugSeverity {
    if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        DebugSeverity::Error
    } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        DebugSeverity::Warning
    } else if flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        DebugSeverity::Info
    } else {
        DebugSeverity::Verbose
    }
}

/// # Safety
///
/// `ptr` is null or a NUL-terminated string valid for the call.
unsafe fn message_text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

pub(crate) unsafe extern "system" fn xr_debug_callback(
    severity: XrSeverityFlags,
    _types: XrTypeFlags,
    data: *const xr::sys::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut c_void,
) -> xr::sys::Bool32 {
    let message = match data.as_ref() {
        Some(data) => message_text(data.message),
        None => String::new(),
    };
    debug::forward(DebugSource::Xr, from_xr(severity), &message);
    xr::sys::FALSE
}

pub(crate) unsafe extern "system" fn vk_debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _types: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let message = match data.as_ref() {
        Some(data) => message_text(data.p_message),
        None => String::new(),
    };
    debug::forward(DebugSource::Vulkan, from_vk(severity), &message);
    vk::FALSE
}
