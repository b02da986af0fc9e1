//! SVO file diagnostics.
//!
//! Replays a recorded session for a fixed time budget and counts how many
//! frames, sensor samples and depth computations came back healthy.

use std::fmt;
use std::time::{Duration, Instant};

use crate::camera::{CameraError, RuntimeParameters, StereoCamera, View};
use crate::shutdown::ExitSignal;

/// How long a diagnostic run lasts unless the file ends first.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(15);

/// Sensor magnitudes at or below this count as empty samples.
pub const NONZERO_THRESHOLD: f32 = 0.05;

/// Counters collected during a diagnostic run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorReport {
    pub frames: u64,
    pub dropped_frames: u64,
    /// False once any sensor read has failed
    pub sensors_ok: bool,
    pub imu_nonzero: u64,
    pub barometer_nonzero: u64,
    pub magnetometer_nonzero: u64,
    pub depth_ok: u64,
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.frames;
        writeln!(f, "Frames processed: {}", n)?;
        if self.sensors_ok {
            writeln!(f, "Sensor status: OK")?;
            writeln!(f, "Invalid frame count: {}", self.dropped_frames)?;
            writeln!(f, "IMU non zero measurements: {}/{}", self.imu_nonzero, n)?;
            writeln!(f, "Barometer non zero measurements: {}/{}", self.barometer_nonzero, n)?;
            writeln!(f, "Magnetometer non zero measurements: {}/{}", self.magnetometer_nonzero, n)?;
        } else {
            writeln!(f, "Sensor status: Unavailable")?;
        }
        write!(f, "Depth successful computations: {}/{}", self.depth_ok, n)
    }
}

/// Replay `camera` until `budget` has elapsed, the file ends or exit is
/// requested.
pub fn diagnose<C: StereoCamera>(camera: &mut C, budget: Duration, exit: &ExitSignal) -> DoctorReport {
    let mut report = DoctorReport {
        sensors_ok: true,
        ..DoctorReport::default()
    };
    let runtime = RuntimeParameters::default();
    let start = Instant::now();

    while start.elapsed() < budget && !exit.is_requested() {
        match camera.grab(&runtime) {
            Ok(()) => inspect_frame(camera, &mut report),
            Err(CameraError::EndOfSvoFile) => break,
            Err(e) => {
                log::debug!("frame {} dropped: {}", report.frames, e);
                report.dropped_frames += 1;
            }
        }
        report.frames += 1;
    }

    log::info!("Diagnostic finished after {:?}", start.elapsed());
    report
}

fn inspect_frame<C: StereoCamera>(camera: &mut C, report: &mut DoctorReport) {
    if camera.retrieve_image(View::SideBySide).is_err() {
        report.dropped_frames += 1;
    }

    if report.sensors_ok {
        match camera.sensors_data() {
            Ok(data) => {
                if data.imu_translation_norm() > NONZERO_THRESHOLD {
                    report.imu_nonzero += 1;
                }
                if data.pressure > NONZERO_THRESHOLD {
                    report.barometer_nonzero += 1;
                }
                if data.magnetic_field_norm() > NONZERO_THRESHOLD {
                    report.magnetometer_nonzero += 1;
                }
            }
            Err(e) => {
                log::warn!("Sensor data unavailable: {}", e);
                report.sensors_ok = false;
            }
        }
    }

    if camera.retrieve_depth().is_ok() {
        report.depth_ok += 1;
    }
}
