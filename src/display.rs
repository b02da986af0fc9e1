//! On-screen display of frames.
//!
//! Rendering windows is left to whatever implements [`FrameSink`]. The
//! built-in [`HeadlessDisplay`] only keeps count of what it was asked to
//! show, which is enough to run the tools on a machine without a display.

use std::collections::BTreeMap;

use crate::camera::Image;
use crate::depth::Region;

pub trait FrameSink {
    /// Show `image` in the window called `window`, optionally outlining
    /// `highlight` and drawing `caption` over it.
    fn show(&mut self, window: &str, image: &Image, highlight: Option<Region>, caption: Option<&str>);
}

/// Accepts frames without drawing them.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    shown: BTreeMap<String, u64>,
    last_caption: Option<String>,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames shown in `window` so far.
    pub fn frames_shown(&self, window: &str) -> u64 {
        self.shown.get(window).copied().unwrap_or(0)
    }

    pub fn last_caption(&self) -> Option<&str> {
        self.last_caption.as_deref()
    }
}

impl FrameSink for HeadlessDisplay {
    fn show(&mut self, window: &str, image: &Image, highlight: Option<Region>, caption: Option<&str>) {
        let count = self.shown.entry(window.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            log::info!(
                "{}: first frame {}x{} (no display attached)",
                window,
                image.width,
                image.height
            );
        }
        if let Some(region) = highlight {
            log::trace!("{}: highlight {:?}", window, region);
        }
        if let Some(caption) = caption {
            self.last_caption = Some(caption.to_string());
        }
    }
}
