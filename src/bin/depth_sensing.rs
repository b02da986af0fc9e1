//! Live distance to the center of the view.
//!
//! Usage: depth-sensing [-u milli|centi|meter|inch|foot]
//!                      [-d ultra|quality|performance] [-s standard|fill] [-g on|off]

use std::io::Write;
use std::process;

use stereo_demos::camera::sim::SimBackend;
use stereo_demos::camera::{CameraBackend, InitParameters};
use stereo_demos::config::Config;
use stereo_demos::depth::{spawn_distance_reporter, DepthSession, SharedDistance};
use stereo_demos::display::HeadlessDisplay;
use stereo_demos::logging;
use stereo_demos::options::{value_name, DepthSensingOptions};
use stereo_demos::shutdown::{install_ctrlc_handler, ExitSignal, QuitListener};

fn main() {
    logging::init();

    let options = match DepthSensingOptions::from_args(std::env::args().skip(1)) {
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

    println!("Measurement unit: {}", value_name(&options.unit));
    println!("Sensing mode: {}", value_name(&options.sensing_mode));
    println!("Depth mode: {}", value_name(&options.depth_mode));
    println!("GUI Enable: {}\n", if options.gui { "on" } else { "off" });
    println!("Initializing resources...");

    let backend = SimBackend::default().with_svo_frames(config.sim.svo_frames);
    let params = InitParameters {
        depth_mode: options.depth_mode,
        unit: options.unit,
        ..InitParameters::default()
    };
    let mut camera = match backend.open(&params) {
        Ok(camera) => camera,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            process::exit(1);
        }
    };

    println!("Starting depth measurement.");

    let exit = ExitSignal::new();
    if let Err(e) = install_ctrlc_handler(exit.clone()) {
        log::warn!("Could not set up Ctrl+C handler: {}", e);
    }

    print!("Press Q to exit application: ");
    let _ = std::io::stdout().flush();
    let listener = QuitListener::stdin(exit.clone());

    let latest = SharedDistance::default();
    let reporter = (!options.gui).then(|| {
        spawn_distance_reporter(
            latest.clone(),
            options.unit,
            config.depth.report_interval(),
            exit.clone(),
        )
    });

    let mut display = HeadlessDisplay::new();
    let result = DepthSession::new(&mut camera, options)
        .with_box_size(config.depth.box_size)
        .run(&mut display, &latest, &exit);

    // Stop the reporter even when the loop ended on an error
    exit.request();
    if let Some(reporter) = reporter {
        let _ = reporter.join();
    }
    listener.finish();

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}
