//! Native asset synchronization for Expo-style projects.
//!
//! Copies declared bitmaps, app icons and font families into the native
//! iOS and Android projects and keeps the Xcode project manifest, the
//! `Info.plist` font list and the Android entry point in step with them.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load and validate `native-assets.toml`
//! - **[`assets`]**: resolve descriptors against the filesystem and render
//!   catalog and font documents
//! - **[`xcode`]**: the `project.pbxproj` object graph and its codec
//! - **[`resources`]**: idempotent `check + apply` primitives (file copies,
//!   generated documents, font registries)
//! - **[`tasks`]**: one synchronization pass per native platform
//! - **[`commands`]**: top-level subcommand orchestration (`sync`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod assets;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tasks;
pub mod xcode;
