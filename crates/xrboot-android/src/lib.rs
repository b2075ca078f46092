//! Android native-activity host.
//!
//! `android_main` is the activity entry point; everything else in the
//! bootstrap is platform independent and lives in `xrboot`.

#[cfg(target_os = "android")]
mod android;
