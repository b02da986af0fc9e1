//! stereo-demos library crate.
//!
//! Shared pieces of the depth sensing, playback, SVO doctor and video
//! capture tools. Each tool resolves its flags with [`options`], opens a
//! camera through [`camera`] and runs one of the grab loops below.

pub mod camera;
pub mod capture;
pub mod config;
pub mod depth;
pub mod display;
pub mod doctor;
pub mod logging;
pub mod options;
pub mod playback;
pub mod shutdown;
