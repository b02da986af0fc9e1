//! Camera types and data structures.

use std::path::PathBuf;

use thiserror::Error;

use crate::options::{DepthMode, Resolution, SensingMode, Unit};

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Live,
    SvoFile(PathBuf),
}

/// Settings applied when a camera is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitParameters {
    pub input: InputSource,
    pub resolution: Resolution,
    pub fps: u32,
    pub depth_mode: DepthMode,
    pub unit: Unit,
}

impl Default for InitParameters {
    fn default() -> Self {
        Self {
            input: InputSource::Live,
            resolution: Resolution::default(),
            fps: 30,
            depth_mode: DepthMode::default(),
            unit: Unit::default(),
        }
    }
}

impl InitParameters {
    pub fn svo(path: impl Into<PathBuf>) -> Self {
        Self {
            input: InputSource::SvoFile(path.into()),
            ..Self::default()
        }
    }
}

/// Settings applied to each grab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeParameters {
    pub sensing_mode: SensingMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SvoCompression {
    #[default]
    H264,
    Lossless,
}

/// Settings for SVO recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingParameters {
    pub filename: PathBuf,
    pub compression: SvoCompression,
}

/// Which image to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Left,
    SideBySide,
    /// Grayscale rendering of the depth map
    Depth,
}

/// An 8-bit interleaved image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Image {
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width as usize * height as usize * channels as usize],
        }
    }
}

/// Per-pixel depth, row major. Invalid pixels are NaN or infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthMap {
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }
}

/// IMU, barometer and magnetometer readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorsData {
    pub imu_translation: [f32; 3],
    /// hPa
    pub pressure: f32,
    /// Calibrated field, microtesla
    pub magnetic_field: [f32; 3],
}

fn norm(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

impl SensorsData {
    pub fn imu_translation_norm(&self) -> f32 {
        norm(self.imu_translation)
    }

    pub fn magnetic_field_norm(&self) -> f32 {
        norm(self.magnetic_field)
    }
}

/// Errors reported by a camera backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("CAMERA NOT DETECTED: {0}")]
    OpenFailed(String),
    #[error("INVALID SVO FILE: {0}")]
    InvalidSvoFile(String),
    #[error("END OF SVOFILE REACHED")]
    EndOfSvoFile,
    #[error("CAMERA FAILED TO GRAB: {0}")]
    GrabFailed(String),
    #[error("FAILURE: no frame grabbed yet")]
    NothingGrabbed,
    #[error("SENSORS NOT AVAILABLE")]
    SensorsUnavailable,
    #[error("SVO RECORDING FAILED: {0}")]
    RecordingFailed(String),
    #[error("Could not open video writer: {0}")]
    WriterFailed(String),
}
