//! Record the live camera to a video file or an SVO session.
//!
//! Usage: video-capture [-r wvga|720p|1080p|2.2k] [-f <fps>] [-g] [-s]
//!
//! `-g` shows frames while recording, `-s` records SVO instead of video.

use std::io::Write;
use std::process;

use stereo_demos::camera::sim::SimBackend;
use stereo_demos::camera::{CameraBackend, CameraError, InitParameters};
use stereo_demos::capture::{CaptureOutput, CaptureSession, FrameLogWriter};
use stereo_demos::config::Config;
use stereo_demos::display::HeadlessDisplay;
use stereo_demos::logging;
use stereo_demos::options::VideoCaptureOptions;
use stereo_demos::shutdown::{install_ctrlc_handler, ExitSignal, QuitListener};

fn main() {
    logging::init();

    let options = match VideoCaptureOptions::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Could not parse arguments: {}", e);
            process::exit(1);
        }
    };

    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    println!("With GUI: {}", options.gui);
    println!("With SVO: {}", options.record_svo);
    println!("Resolution: {}", options.resolution);
    println!("Framerate: {}", options.fps_text);

    let backend = SimBackend::default().with_svo_frames(config.sim.svo_frames);
    let params = InitParameters {
        resolution: options.resolution,
        fps: options.fps,
        ..InitParameters::default()
    };
    let mut camera = match backend.open(&params) {
        Ok(camera) => camera,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            process::exit(1);
        }
    };

    let exit = ExitSignal::new();
    if let Err(e) = install_ctrlc_handler(exit.clone()) {
        log::warn!("Could not set up Ctrl+C handler: {}", e);
    }

    let output = CaptureOutput::select(&options, &config.capture.svo_path, &config.capture.video_path);
    let session = match &output {
        CaptureOutput::Svo(path) => CaptureSession::svo(&mut camera, path, options.gui),
        CaptureOutput::Video(path) => {
            FrameLogWriter::create(path, options.fps, options.resolution.frame_size())
                .map(|writer| CaptureSession::video(&mut camera, Box::new(writer), options.gui))
        }
    };
    let mut session = match session {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            process::exit(1);
        }
    };

    print!("Recording to {}. Press Q to stop: ", output.path().display());
    let _ = std::io::stdout().flush();
    let listener = QuitListener::stdin(exit.clone());

    let mut display = HeadlessDisplay::new();
    let result: Result<(), CameraError> = session.run(&mut display, &exit);
    // Flush even after a failed run
    let result = result.and(session.finish());
    println!("\nCaptured {} frames", session.frames());
    drop(session);
    listener.finish();

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}
