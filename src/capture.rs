//! Video capture: record the live camera to an SVO session or a frame log.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::camera::{
    CameraError, Image, RecordingParameters, RuntimeParameters, StereoCamera, SvoCompression, View,
};
use crate::display::FrameSink;
use crate::options::VideoCaptureOptions;
use crate::shutdown::ExitSignal;

pub const WINDOW_NAME: &str = "Record";

/// First line of a frame log.
pub const FRAME_LOG_MAGIC: &str = "FRAMELOG";

/// Upper bound on the bytes one frame record takes in a frame log.
pub const MAX_FRAME_RECORD_BYTES: usize = 64;

/// Sink for captured frames.
pub trait VideoWriter {
    fn write_frame(&mut self, frame: &Image) -> Result<(), CameraError>;

    /// Flush whatever is buffered. Called once after the last frame.
    fn finish(&mut self) -> Result<(), CameraError>;
}

/// Logs one fixed-size record per frame instead of the pixels: frame
/// index, frame size and a digest of the pixel data.
///
/// The file starts with `FRAMELOG <fps> <width>x<height>`.
pub struct FrameLogWriter<W: Write> {
    out: W,
    width: u32,
    height: u32,
    frames: u64,
}

impl FrameLogWriter<BufWriter<File>> {
    pub fn create(path: &Path, fps: u32, size: (u32, u32)) -> Result<Self, CameraError> {
        let file = File::create(path)
            .map_err(|e| CameraError::WriterFailed(format!("{}: {}", path.display(), e)))?;
        Self::new(BufWriter::new(file), fps, size)
    }
}

impl<W: Write> FrameLogWriter<W> {
    pub fn new(mut out: W, fps: u32, size: (u32, u32)) -> Result<Self, CameraError> {
        writeln!(out, "{} {} {}x{}", FRAME_LOG_MAGIC, fps, size.0, size.1)
            .map_err(|e| CameraError::WriterFailed(e.to_string()))?;
        Ok(Self {
            out,
            width: size.0,
            height: size.1,
            frames: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(mut self) -> Result<W, CameraError> {
        self.finish()?;
        Ok(self.out)
    }
}

/// First 16 bytes of the SHA256 of the pixel data, hex encoded.
pub fn frame_digest(frame: &Image) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&frame.data);
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

impl<W: Write> VideoWriter for FrameLogWriter<W> {
    fn write_frame(&mut self, frame: &Image) -> Result<(), CameraError> {
        if frame.width != self.width || frame.height != self.height {
            return Err(CameraError::WriterFailed(format!(
                "frame is {}x{}, writer expects {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        writeln!(
            self.out,
            "{:08} {}x{} {}",
            self.frames,
            frame.width,
            frame.height,
            frame_digest(frame)
        )
        .map_err(|e| CameraError::WriterFailed(e.to_string()))?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CameraError> {
        self.out
            .flush()
            .map_err(|e| CameraError::WriterFailed(e.to_string()))
    }
}

/// Where a capture session writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutput {
    /// The camera records itself, H.264 compressed
    Svo(PathBuf),
    /// Frames are pulled and handed to a video writer
    Video(PathBuf),
}

impl CaptureOutput {
    pub fn select(options: &VideoCaptureOptions, svo_path: &Path, video_path: &Path) -> Self {
        if options.record_svo {
            CaptureOutput::Svo(svo_path.to_path_buf())
        } else {
            CaptureOutput::Video(video_path.to_path_buf())
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            CaptureOutput::Svo(path) | CaptureOutput::Video(path) => path,
        }
    }
}

/// Per-iteration work of a capture session.
pub struct CaptureSession<'a, C: StereoCamera> {
    camera: &'a mut C,
    writer: Option<Box<dyn VideoWriter + 'a>>,
    gui: bool,
    frames: u64,
}

impl<'a, C: StereoCamera> CaptureSession<'a, C> {
    /// Session recording to SVO through the camera itself.
    pub fn svo(camera: &'a mut C, path: &Path, gui: bool) -> Result<Self, CameraError> {
        camera.enable_recording(&RecordingParameters {
            filename: path.to_path_buf(),
            compression: SvoCompression::H264,
        })?;
        Ok(Self {
            camera,
            writer: None,
            gui,
            frames: 0,
        })
    }

    /// Session feeding every frame into `writer`.
    pub fn video(camera: &'a mut C, writer: Box<dyn VideoWriter + 'a>, gui: bool) -> Self {
        Self {
            camera,
            writer: Some(writer),
            gui,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn retrieve_frame(&mut self) -> Result<Option<Image>, CameraError> {
        if let Err(e) = self.camera.grab(&RuntimeParameters::default()) {
            log::debug!("grab failed: {}", e);
            return Ok(None);
        }
        self.camera.retrieve_image(View::Left).map(Some)
    }

    /// Grab one frame and record it, showing it when the GUI is on.
    pub fn step(&mut self, sink: &mut dyn FrameSink) -> Result<(), CameraError> {
        // SVO without preview only needs the grab; the camera records it
        if self.writer.is_none() && !self.gui {
            if self.camera.grab(&RuntimeParameters::default()).is_ok() {
                self.frames += 1;
            }
            return Ok(());
        }

        let Some(frame) = self.retrieve_frame()? else {
            return Ok(());
        };
        if let Some(writer) = self.writer.as_mut() {
            writer.write_frame(&frame)?;
        }
        if self.gui {
            sink.show(WINDOW_NAME, &frame, None, None);
        }
        self.frames += 1;
        Ok(())
    }

    pub fn run(&mut self, sink: &mut dyn FrameSink, exit: &ExitSignal) -> Result<(), CameraError> {
        while !exit.is_requested() {
            self.step(sink)?;
        }
        log::info!("Captured {} frames", self.frames);
        Ok(())
    }

    /// Flush the video writer, if any. SVO sessions are closed by the camera.
    pub fn finish(&mut self) -> Result<(), CameraError> {
        match self.writer.as_mut() {
            Some(writer) => writer.finish(),
            None => Ok(()),
        }
    }
}
