//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`inspect`] - List the layers produced by inputs
//! - [`decode`] - Render a numeric grid as grayscale
//! - [`composite`] - Flatten layers into one image
//! - [`compare`] - Render a swipe, spyglass, blink or single frame
//! - [`edit`] - Flood or lasso select, fill, undo
//! - [`config`] - Configuration management (init, get, set, list, path)

pub mod common;
pub mod compare;
pub mod composite;
pub mod config;
pub mod decode;
pub mod edit;
pub mod inspect;
