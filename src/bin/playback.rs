//! Replay a recorded SVO session.
//!
//! Usage: playback -f <filename>

use std::process;

use stereo_demos::camera::sim::SimBackend;
use stereo_demos::camera::{CameraBackend, InitParameters};
use stereo_demos::config::Config;
use stereo_demos::display::HeadlessDisplay;
use stereo_demos::logging;
use stereo_demos::options::PlaybackOptions;
use stereo_demos::playback::play;
use stereo_demos::shutdown::{install_ctrlc_handler, ExitSignal};

fn main() {
    logging::init();

    let options = match PlaybackOptions::from_args(std::env::args().skip(1)) {
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

    let backend = SimBackend::default().with_svo_frames(config.sim.svo_frames);
    let mut camera = match backend.open(&InitParameters::svo(&options.filename)) {
        Ok(camera) => camera,
        Err(e) => {
            eprintln!("Could not open svo file: {}", e);
            process::exit(1);
        }
    };

    let exit = ExitSignal::new();
    if let Err(e) = install_ctrlc_handler(exit.clone()) {
        log::warn!("Could not set up Ctrl+C handler: {}", e);
    }

    let mut display = HeadlessDisplay::new();
    match play(&mut camera, &mut display, &exit) {
        Ok(frames) => log::info!("Played {} frames", frames),
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            process::exit(1);
        }
    }
}
