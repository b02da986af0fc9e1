//! SVO playback.

use crate::camera::{CameraError, RuntimeParameters, StereoCamera, View};
use crate::display::FrameSink;
use crate::shutdown::ExitSignal;

pub const WINDOW_NAME: &str = "Record";

/// Show side-by-side frames until the recording ends, a grab fails or exit
/// is requested. Returns the number of frames shown.
pub fn play<C: StereoCamera>(
    camera: &mut C,
    sink: &mut dyn FrameSink,
    exit: &ExitSignal,
) -> Result<u64, CameraError> {
    let runtime = RuntimeParameters::default();
    let mut shown = 0;

    while !exit.is_requested() {
        match camera.grab(&runtime) {
            Ok(()) => {
                let image = camera.retrieve_image(View::SideBySide)?;
                sink.show(WINDOW_NAME, &image, None, None);
                shown += 1;
            }
            Err(CameraError::EndOfSvoFile) => break,
            Err(e) => {
                log::warn!("Playback stopped: {}", e);
                break;
            }
        }
    }
    Ok(shown)
}
