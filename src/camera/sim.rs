//! Synthetic camera backend.
//!
//! Produces a tilted wall in front of the camera whose distance drifts
//! slowly over time, plus plausible sensor readings. SVO sessions are
//! finite: the file must exist, and the session ends after a fixed number
//! of frames.

use std::f32::consts::TAU;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread;
use std::time::Duration;

use super::{
    CameraBackend, CameraError, DepthMap, Image, InitParameters, InputSource,
    RecordingParameters, RuntimeParameters, SensorsData, StereoCamera, View,
};
use crate::options::SensingMode;

/// Frames in a simulated SVO session unless configured otherwise.
pub const DEFAULT_SVO_FRAMES: u64 = 900;

/// Opens [`SimCamera`] handles.
#[derive(Debug, Clone)]
pub struct SimBackend {
    svo_frames: u64,
    /// Pace live grabs at the requested frame rate
    realtime: bool,
}

impl Default for SimBackend {
    fn default() -> Self {
        Self {
            svo_frames: DEFAULT_SVO_FRAMES,
            realtime: true,
        }
    }
}

impl SimBackend {
    pub fn with_svo_frames(mut self, frames: u64) -> Self {
        self.svo_frames = frames;
        self
    }

    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }
}

impl CameraBackend for SimBackend {
    type Camera = SimCamera;

    fn open(&self, params: &InitParameters) -> Result<SimCamera, CameraError> {
        let remaining = match &params.input {
            InputSource::Live => None,
            InputSource::SvoFile(path) => {
                let is_file = std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
                if !is_file {
                    return Err(CameraError::InvalidSvoFile(path.display().to_string()));
                }
                Some(self.svo_frames)
            }
        };

        if params.fps == 0 {
            return Err(CameraError::OpenFailed("frame rate must be positive".to_string()));
        }

        log::info!(
            "Opened simulated camera ({:?}, {}@{}fps, {:?}, {:?})",
            params.input,
            params.resolution,
            params.fps,
            params.depth_mode,
            params.unit
        );

        Ok(SimCamera {
            params: params.clone(),
            realtime: self.realtime && remaining.is_none(),
            remaining,
            frame_index: 0,
            grabbed: false,
            sensing_mode: SensingMode::default(),
            recording: None,
        })
    }
}

/// A synthetic camera handle.
pub struct SimCamera {
    params: InitParameters,
    realtime: bool,
    remaining: Option<u64>,
    frame_index: u64,
    grabbed: bool,
    sensing_mode: SensingMode,
    recording: Option<BufWriter<File>>,
}

impl SimCamera {
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn require_grab(&self) -> Result<(), CameraError> {
        if self.grabbed {
            Ok(())
        } else {
            Err(CameraError::NothingGrabbed)
        }
    }

    fn dimensions(&self) -> (usize, usize) {
        let (w, h) = self.params.resolution.frame_size();
        (w as usize, h as usize)
    }

    /// Distance to the wall center for the current frame.
    fn wall_distance_mm(&self) -> f32 {
        let phase = (self.frame_index % 600) as f32 / 600.0 * TAU;
        1500.0 + 300.0 * phase.sin()
    }

    fn depth_mm(&self) -> DepthMap {
        let (width, height) = self.dimensions();
        let center = self.wall_distance_mm();
        let mut map = DepthMap::filled(width, height, 0.0);

        for y in 0..height {
            for x in 0..width {
                // Wall tilts away to the right
                let tilt = (x as f32 / width as f32 - 0.5) * 200.0;
                let hole = self.sensing_mode == SensingMode::Standard && (x * 7 + y * 13) % 29 == 0;
                let value = if hole { f32::NAN } else { center + tilt };
                map.set(x, y, value);
            }
        }
        map
    }

    fn record_frame(&mut self) -> Result<(), CameraError> {
        if let Some(writer) = self.recording.as_mut() {
            writer
                .write_all(&self.frame_index.to_le_bytes())
                .map_err(|e| CameraError::RecordingFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl StereoCamera for SimCamera {
    fn grab(&mut self, params: &RuntimeParameters) -> Result<(), CameraError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(CameraError::EndOfSvoFile);
            }
            *remaining -= 1;
        }

        if self.realtime {
            thread::sleep(Duration::from_secs_f64(1.0 / self.params.fps as f64));
        }

        self.sensing_mode = params.sensing_mode;
        self.frame_index += 1;
        self.grabbed = true;
        self.record_frame()
    }

    fn retrieve_image(&mut self, view: View) -> Result<Image, CameraError> {
        self.require_grab()?;
        let (width, height) = self.dimensions();

        let image = match view {
            View::Left | View::SideBySide => {
                let eyes = if view == View::SideBySide { 2 } else { 1 };
                let shade = (self.frame_index % 256) as u8;
                Image::filled((width * eyes) as u32, height as u32, 4, shade)
            }
            View::Depth => {
                let depth = self.depth_mm();
                let data = depth
                    .data
                    .iter()
                    .flat_map(|&d| {
                        let v = if d.is_finite() {
                            (255.0 - (d / 3000.0 * 255.0).clamp(0.0, 255.0)) as u8
                        } else {
                            0
                        };
                        [v, v, v, 255]
                    })
                    .collect();
                Image {
                    width: width as u32,
                    height: height as u32,
                    channels: 4,
                    data,
                }
            }
        };
        Ok(image)
    }

    fn retrieve_depth(&mut self) -> Result<DepthMap, CameraError> {
        self.require_grab()?;
        let mut depth = self.depth_mm();
        let unit = self.params.unit;
        for d in depth.data.iter_mut() {
            *d = unit.convert_millimeters(*d);
        }
        Ok(depth)
    }

    fn sensors_data(&mut self) -> Result<SensorsData, CameraError> {
        self.require_grab()?;
        let t = self.frame_index as f32 / self.params.fps as f32;
        Ok(SensorsData {
            imu_translation: [0.1 * t.sin(), 0.02, 0.1 * t.cos()],
            pressure: 1013.25,
            magnetic_field: [21.0, -4.5, 39.0],
        })
    }

    fn enable_recording(&mut self, params: &RecordingParameters) -> Result<(), CameraError> {
        if matches!(self.params.input, InputSource::SvoFile(_)) {
            return Err(CameraError::RecordingFailed(
                "cannot record while replaying an SVO file".to_string(),
            ));
        }
        let file = File::create(&params.filename).map_err(|e| {
            CameraError::RecordingFailed(format!("{}: {}", params.filename.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "SIMSVO {} {} {:?}",
            self.params.resolution, self.params.fps, params.compression
        )
        .map_err(|e| CameraError::RecordingFailed(e.to_string()))?;

        log::info!("Recording to {}", params.filename.display());
        self.recording = Some(writer);
        Ok(())
    }
}

impl Drop for SimCamera {
    fn drop(&mut self) {
        if let Some(mut writer) = self.recording.take() {
            if let Err(e) = writer.flush() {
                log::warn!("Failed to flush recording: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::SvoCompression;
    use crate::options::{Resolution, Unit};

    fn fast() -> SimBackend {
        SimBackend::default().with_realtime(false)
    }

    fn small_live() -> InitParameters {
        InitParameters {
            resolution: Resolution::Wvga,
            ..InitParameters::default()
        }
    }

    #[test]
    fn test_missing_svo_file_fails_to_open() {
        let result = fast().open(&InitParameters::svo("/nonexistent/session.svo"));
        assert!(matches!(result, Err(CameraError::InvalidSvoFile(_))));
    }

    #[test]
    fn test_svo_session_ends() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cam = fast()
            .with_svo_frames(3)
            .open(&InitParameters::svo(file.path()))
            .unwrap();
        let rt = RuntimeParameters::default();
        for _ in 0..3 {
            assert!(cam.grab(&rt).is_ok());
        }
        assert_eq!(cam.grab(&rt), Err(CameraError::EndOfSvoFile));
        assert_eq!(cam.frame_index(), 3);
    }

    #[test]
    fn test_retrieve_before_grab_fails() {
        let mut cam = fast().open(&small_live()).unwrap();
        assert_eq!(cam.retrieve_depth(), Err(CameraError::NothingGrabbed));
        assert_eq!(cam.sensors_data(), Err(CameraError::NothingGrabbed));
    }

    #[test]
    fn test_fill_mode_has_no_holes() {
        let mut cam = fast().open(&small_live()).unwrap();
        cam.grab(&RuntimeParameters {
            sensing_mode: SensingMode::Fill,
        })
        .unwrap();
        let depth = cam.retrieve_depth().unwrap();
        assert_eq!((depth.width, depth.height), (800, 480));
        assert!(depth.data.iter().all(|d| d.is_finite()));

        cam.grab(&RuntimeParameters::default()).unwrap();
        let depth = cam.retrieve_depth().unwrap();
        assert!(depth.data.iter().any(|d| d.is_nan()));
    }

    #[test]
    fn test_depth_is_in_requested_unit() {
        let params = InitParameters {
            unit: Unit::Meter,
            ..small_live()
        };
        let mut cam = fast().open(&params).unwrap();
        cam.grab(&RuntimeParameters::default()).unwrap();
        let depth = cam.retrieve_depth().unwrap();
        let center = depth.at(400, 240);
        assert!(center > 1.0 && center < 2.0, "center was {}", center);
    }

    #[test]
    fn test_side_by_side_is_double_width() {
        let mut cam = fast().open(&small_live()).unwrap();
        cam.grab(&RuntimeParameters::default()).unwrap();
        let img = cam.retrieve_image(View::SideBySide).unwrap();
        assert_eq!((img.width, img.height, img.channels), (1600, 480, 4));
    }

    #[test]
    fn test_recording_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.svo");
        {
            let mut cam = fast().open(&small_live()).unwrap();
            cam.enable_recording(&RecordingParameters {
                filename: path.clone(),
                compression: SvoCompression::H264,
            })
            .unwrap();
            cam.grab(&RuntimeParameters::default()).unwrap();
        }
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"SIMSVO wvga 30 H264\n"));
        assert_eq!(bytes.len(), "SIMSVO wvga 30 H264\n".len() + 8);
    }
}
