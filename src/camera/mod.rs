//! Stereo camera capabilities used by the tools.
//!
//! The vendor SDK stays behind two traits: [`CameraBackend`] opens a live
//! camera or a recorded SVO session, and [`StereoCamera`] is the handle the
//! grab loops drive. [`sim`] provides a synthetic implementation so every
//! tool runs without hardware.

pub mod sim;
mod types;

pub use types::{
    CameraError, DepthMap, Image, InitParameters, InputSource, RecordingParameters,
    RuntimeParameters, SensorsData, SvoCompression, View,
};

/// An open camera or SVO session.
pub trait StereoCamera {
    /// Capture the next frame pair and run depth estimation on it.
    ///
    /// Returns [`CameraError::EndOfSvoFile`] once a recorded session is
    /// exhausted.
    fn grab(&mut self, params: &RuntimeParameters) -> Result<(), CameraError>;

    /// Image of the last grabbed frame.
    fn retrieve_image(&mut self, view: View) -> Result<Image, CameraError>;

    /// Per-pixel depth of the last grabbed frame, in the unit the camera was
    /// opened with.
    fn retrieve_depth(&mut self) -> Result<DepthMap, CameraError>;

    /// Sensor readings aligned with the last grabbed image.
    fn sensors_data(&mut self) -> Result<SensorsData, CameraError>;

    /// Start writing every grabbed frame to an SVO file.
    fn enable_recording(&mut self, params: &RecordingParameters) -> Result<(), CameraError>;
}

/// Opens camera handles.
pub trait CameraBackend {
    type Camera: StereoCamera;

    fn open(&self, params: &InitParameters) -> Result<Self::Camera, CameraError>;
}
