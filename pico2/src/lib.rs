//! Solar dashboard firmware library - the host-testable parts of the firmware.
//!
//! The binary (`main.rs`) adds the embedded-specific code: Wi-Fi, sockets,
//! flash, the display driver and the tasks.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p solar-dash-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p solar-dash-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod credentials;
pub mod http;
pub mod screens;

pub use credentials::{Credentials, CredentialsError, Endpoint};
pub use http::HttpError;
