//! Argument resolution behaviour of every tool.

use stereo_demos::options::tools::{
    depth_sensing_spec, playback_spec, svo_doctor_spec, video_capture_spec,
};
use stereo_demos::options::{OptionError, OptionKind, OptionValue, ToolSpec};

fn none() -> Vec<&'static str> {
    Vec::new()
}

fn invalid(key: &str, value: &str) -> OptionError {
    OptionError::InvalidKeywordValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn unknown(token: &str) -> OptionError {
    OptionError::UnknownOption {
        token: token.to_string(),
    }
}

fn infeasible(res: &str) -> OptionError {
    OptionError::InfeasibleCombination {
        detail: format!("Invalid framerate for resolution {}", res),
    }
}

fn all_specs() -> Vec<ToolSpec> {
    vec![
        depth_sensing_spec(),
        playback_spec(),
        svo_doctor_spec(),
        video_capture_spec(),
    ]
}

// ==================== Empty argument lists ====================

#[test]
fn test_depth_sensing_empty_args_gives_defaults() {
    let parsed = depth_sensing_spec().resolve(none()).unwrap();
    assert_eq!(parsed.text("-u"), Some("milli"));
    assert_eq!(parsed.text("-d"), Some("ultra"));
    assert_eq!(parsed.text("-s"), Some("standard"));
    assert_eq!(parsed.text("-g"), Some("off"));
    assert_eq!(parsed, depth_sensing_spec().defaults());
}

#[test]
fn test_video_capture_empty_args_gives_defaults() {
    let parsed = video_capture_spec().resolve(none()).unwrap();
    assert_eq!(parsed.text("-r"), Some("1080p"));
    assert_eq!(parsed.text("-f"), Some("30"));
    assert_eq!(parsed.flag("-g"), Some(false));
    assert_eq!(parsed.flag("-s"), Some(false));
}

#[test]
fn test_filename_tools_require_arguments() {
    let err = playback_spec().resolve(none()).unwrap_err();
    assert!(matches!(err, OptionError::MissingRequiredOption { .. }));
    assert_eq!(err.to_string(), "Usage -> playback -f <filename>");

    let err = svo_doctor_spec().resolve(none()).unwrap_err();
    assert!(matches!(err, OptionError::MissingRequiredOption { .. }));
}

// ==================== Value validation ====================

#[test]
fn test_every_allowed_value_resolves_exactly() {
    for spec in all_specs() {
        for option in &spec.options {
            let OptionKind::Value(rule) = &option.kind else {
                continue;
            };
            for value in rule.allowed_values() {
                let mut args = vec![option.key, value.as_str()];
                // Keep video capture's fps feasible for every resolution
                if spec.name == "video-capture" && option.key == "-r" {
                    args.extend(["-f", "15"]);
                }
                let parsed = spec.resolve(&args).unwrap();
                assert_eq!(parsed.text(option.key), Some(value.as_str()));
            }
        }
    }
}

#[test]
fn test_disallowed_value_fails() {
    for (key, value) in [("-u", "yard"), ("-d", "best"), ("-s", "FILL"), ("-g", "yes")] {
        let err = depth_sensing_spec().resolve([key, value]).unwrap_err();
        assert_eq!(err, invalid(key, value));
    }
    let err = video_capture_spec().resolve(["-r", "4k"]).unwrap_err();
    assert_eq!(err, invalid("-r", "4k"));
}

#[test]
fn test_idempotent_repeat() {
    let once = depth_sensing_spec().resolve(["-d", "quality"]).unwrap();
    let twice = depth_sensing_spec().resolve(["-d", "quality", "-d", "quality"]).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_last_write_wins() {
    let parsed = depth_sensing_spec().resolve(["-d", "ultra", "-d", "quality"]).unwrap();
    assert_eq!(parsed.text("-d"), Some("quality"));

    let parsed = playback_spec().resolve(["-f", "a.svo", "-f", "b.svo"]).unwrap();
    assert_eq!(parsed.text("-f"), Some("b.svo"));
}

#[test]
fn test_unknown_token_anywhere_fails() {
    let spec = depth_sensing_spec();
    assert_eq!(spec.resolve(["-x"]).unwrap_err(), unknown("-x"));
    assert_eq!(
        spec.resolve(["-u", "meter", "-d", "quality", "extra"]).unwrap_err(),
        unknown("extra")
    );
    assert_eq!(
        playback_spec().resolve(["-f", "a.svo", "-g"]).unwrap_err(),
        unknown("-g")
    );
}

#[test]
fn test_trailing_value_flag_without_value() {
    assert_eq!(
        depth_sensing_spec().resolve(["-u", "inch", "-s"]).unwrap_err(),
        invalid("-s", "")
    );
    assert_eq!(
        svo_doctor_spec().resolve(["-f"]).unwrap_err(),
        invalid("-f", "")
    );
    assert_eq!(
        video_capture_spec().resolve(["-g", "-r"]).unwrap_err(),
        invalid("-r", "")
    );
}

#[test]
fn test_diagnostic_text() {
    assert_eq!(unknown("-z").to_string(), "Invalid option: -z");
    assert_eq!(
        invalid("-u", "yard").to_string(),
        "Invalid keyword value pair: (-u, yard)."
    );
    assert_eq!(
        infeasible("2.2k").to_string(),
        "Invalid framerate for resolution 2.2k"
    );
}

// ==================== Video capture ====================

#[test]
fn test_framerate_must_fit_resolution() {
    let spec = video_capture_spec();
    assert_eq!(spec.resolve(["-r", "2.2k", "-f", "30"]).unwrap_err(), infeasible("2.2k"));
    assert!(spec.resolve(["-r", "2.2k", "-f", "15"]).is_ok());
    assert!(spec.resolve(["-r", "wvga", "-f", "100"]).is_ok());
    assert_eq!(spec.resolve(["-r", "wvga", "-f", "12"]).unwrap_err(), infeasible("wvga"));
    assert_eq!(spec.resolve(["-r", "720p", "-f", "100"]).unwrap_err(), infeasible("720p"));
    // Default 30 fps does not fit 2.2k
    assert_eq!(spec.resolve(["-r", "2.2k"]).unwrap_err(), infeasible("2.2k"));
}

#[test]
fn test_fps_table() {
    let spec = video_capture_spec();
    let table = [
        ("wvga", vec![15, 30, 60, 100]),
        ("720p", vec![15, 30, 60]),
        ("1080p", vec![15, 30]),
        ("2.2k", vec![15]),
    ];
    for (res, allowed) in table {
        for fps in [15, 30, 60, 100] {
            let fps_text = fps.to_string();
            let result = spec.resolve(["-r", res, "-f", fps_text.as_str()]);
            assert_eq!(result.is_ok(), allowed.contains(&fps), "{} @ {}", res, fps);
        }
    }
}

#[test]
fn test_fps_must_be_digits() {
    let spec = video_capture_spec();
    assert_eq!(spec.resolve(["-f", "3o"]).unwrap_err(), invalid("-f", "3o"));
    assert_eq!(spec.resolve(["-f", "-30"]).unwrap_err(), invalid("-f", "-30"));
    assert_eq!(spec.resolve(["-f", ""]).unwrap_err(), invalid("-f", ""));
}

#[test]
fn test_fps_kept_verbatim() {
    let parsed = video_capture_spec().resolve(["-f", "030"]).unwrap();
    assert_eq!(parsed.text("-f"), Some("030"));
    assert_eq!(parsed.get("-f"), Some(&OptionValue::Text("030".to_string())));
}

#[test]
fn test_switches_consume_no_value() {
    let parsed = video_capture_spec().resolve(["-g", "-s"]).unwrap();
    assert_eq!(parsed.flag("-g"), Some(true));
    assert_eq!(parsed.flag("-s"), Some(true));

    let parsed = video_capture_spec()
        .resolve(["-g", "-s", "-r", "720p", "-f", "60"])
        .unwrap();
    assert_eq!(parsed.flag("-g"), Some(true));
    assert_eq!(parsed.flag("-s"), Some(true));
    assert_eq!(parsed.text("-r"), Some("720p"));
    assert_eq!(parsed.text("-f"), Some("60"));
}

#[test]
fn test_resolution_is_atomic() {
    // A later error hides every earlier, valid value
    let spec = depth_sensing_spec();
    let result = spec.resolve(["-u", "foot", "-d", "fast"]);
    assert_eq!(result.unwrap_err(), invalid("-d", "fast"));
    // The table itself is untouched and still resolves to defaults
    assert_eq!(spec.resolve(none()).unwrap().text("-u"), Some("milli"));
}

#[test]
fn test_every_key_resolved_once() {
    for spec in all_specs() {
        let parsed = spec.defaults();
        assert_eq!(parsed.len(), spec.options.len());
        for option in &spec.options {
            assert_eq!(parsed.get(option.key), Some(&option.default));
        }
    }
}
