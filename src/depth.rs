//! Depth sensing: distance to whatever sits in the middle of the view.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::camera::{CameraError, DepthMap, RuntimeParameters, StereoCamera, View};
use crate::display::FrameSink;
use crate::options::{DepthSensingOptions, Unit};
use crate::shutdown::ExitSignal;

/// Side of the averaging box, in pixels.
pub const BOX_SIZE: usize = 70;

pub const WINDOW_NAME: &str = "Depth Map";

/// Pixel rectangle, `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// A `width`×`height` box centered on a `map_width`×`map_height` map,
/// shrunk to fit when the map is smaller than the box.
pub fn centered_region(map_width: usize, map_height: usize, width: usize, height: usize) -> Region {
    let width = width.min(map_width);
    let height = height.min(map_height);
    Region {
        x: map_width / 2 - width / 2,
        y: map_height / 2 - height / 2,
        width,
        height,
    }
}

/// Mean of the finite depth values inside a centered box.
///
/// NaN and infinite samples are skipped. Returns NaN when the box holds no
/// valid sample.
pub fn center_distance(map: &DepthMap, box_width: usize, box_height: usize) -> f32 {
    let region = centered_region(map.width, map.height, box_width, box_height);

    let mut sum = 0.0f64;
    let mut valid = 0usize;
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            let value = map.at(x, y);
            if value.is_finite() {
                sum += value as f64;
                valid += 1;
            }
        }
    }

    if valid == 0 {
        f32::NAN
    } else {
        (sum / valid as f64) as f32
    }
}

/// Latest measured distance, shared with the console reporter.
#[derive(Debug, Clone)]
pub struct SharedDistance(Arc<AtomicU32>);

impl Default for SharedDistance {
    fn default() -> Self {
        Self(Arc::new(AtomicU32::new(f32::NAN.to_bits())))
    }
}

impl SharedDistance {
    pub fn store(&self, distance: f32) {
        self.0.store(distance.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// One console status line.
pub fn format_distance_line(distance: f32, unit: Unit) -> String {
    format!(
        "Distance {}: {:>5.1} -> (Q to exit): ",
        unit.shorthand(),
        distance
    )
}

/// Text drawn over the depth view.
pub fn overlay_text(distance: f32, unit: Unit) -> String {
    format!("Distance: {:.2} {}", distance, unit.shorthand())
}

/// Shortest console refresh period the reporter accepts.
pub const MIN_REPORT_INTERVAL: Duration = Duration::from_millis(10);

/// Rewrite the distance line on `out` every `interval` (at least
/// [`MIN_REPORT_INTERVAL`]) until exit is requested, then end the line.
pub fn report_distance<W: Write>(
    out: &mut W,
    distance: &SharedDistance,
    unit: Unit,
    interval: Duration,
    exit: &ExitSignal,
) -> io::Result<()> {
    let interval = interval.max(MIN_REPORT_INTERVAL);
    while !exit.is_requested() {
        thread::sleep(interval);
        write!(out, "\r{}", format_distance_line(distance.load(), unit))?;
        out.flush()?;
    }
    writeln!(out)
}

/// Run [`report_distance`] on stdout in a background thread.
pub fn spawn_distance_reporter(
    distance: SharedDistance,
    unit: Unit,
    interval: Duration,
    exit: ExitSignal,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stdout = io::stdout();
        if let Err(e) = report_distance(&mut stdout, &distance, unit, interval, &exit) {
            log::warn!("Distance reporter stopped: {}", e);
        }
    })
}

/// Drives the grab loop of the depth sensing tool.
pub struct DepthSession<'a, C: StereoCamera> {
    camera: &'a mut C,
    options: DepthSensingOptions,
    box_size: usize,
}

impl<'a, C: StereoCamera> DepthSession<'a, C> {
    pub fn new(camera: &'a mut C, options: DepthSensingOptions) -> Self {
        Self {
            camera,
            options,
            box_size: BOX_SIZE,
        }
    }

    pub fn with_box_size(mut self, box_size: usize) -> Self {
        self.box_size = box_size;
        self
    }

    /// Grab one frame and measure it. Returns `None` when the grab failed.
    pub fn step(&mut self, sink: &mut dyn FrameSink) -> Result<Option<f32>, CameraError> {
        let runtime = RuntimeParameters {
            sensing_mode: self.options.sensing_mode,
        };
        if let Err(e) = self.camera.grab(&runtime) {
            log::debug!("grab failed: {}", e);
            return Ok(None);
        }

        let depth = self.camera.retrieve_depth()?;
        let distance = center_distance(&depth, self.box_size, self.box_size);

        if self.options.gui {
            let view = self.camera.retrieve_image(View::Depth)?;
            let region = centered_region(
                view.width as usize,
                view.height as usize,
                self.box_size,
                self.box_size,
            );
            sink.show(
                WINDOW_NAME,
                &view,
                Some(region),
                Some(&overlay_text(distance, self.options.unit)),
            );
        }
        Ok(Some(distance))
    }

    /// Loop until exit is requested, publishing every measurement.
    pub fn run(
        &mut self,
        sink: &mut dyn FrameSink,
        latest: &SharedDistance,
        exit: &ExitSignal,
    ) -> Result<(), CameraError> {
        while !exit.is_requested() {
            if let Some(distance) = self.step(sink)? {
                latest.store(distance);
            }
        }
        Ok(())
    }
}
