//! Flag tables and typed settings for each tool.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use super::{
    value_name, EmptyArgs, OptionError, OptionSpec, ParsedOptions, ToolSpec, ValueRule,
};

/// Measurement unit for depth values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Unit {
    #[default]
    Milli,
    Centi,
    Meter,
    Inch,
    Foot,
}

impl Unit {
    /// Bracketed abbreviation shown next to distances.
    pub fn shorthand(self) -> &'static str {
        match self {
            Unit::Milli => "[mm]",
            Unit::Centi => "[cm]",
            Unit::Meter => "[m]",
            Unit::Inch => "[in]",
            Unit::Foot => "[ft]",
        }
    }

    /// Convert a length in millimeters to this unit.
    pub fn convert_millimeters(self, mm: f32) -> f32 {
        match self {
            Unit::Milli => mm,
            Unit::Centi => mm / 10.0,
            Unit::Meter => mm / 1000.0,
            Unit::Inch => mm / 25.4,
            Unit::Foot => mm / 304.8,
        }
    }
}

/// Depth computation quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DepthMode {
    #[default]
    Ultra,
    Quality,
    Performance,
}

/// Whether holes in the depth map are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SensingMode {
    #[default]
    Standard,
    Fill,
}

/// Camera capture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Resolution {
    #[value(name = "wvga")]
    Wvga,
    #[value(name = "720p")]
    Hd720,
    #[default]
    #[value(name = "1080p")]
    Hd1080,
    #[value(name = "2.2k")]
    Hd2k,
}

impl Resolution {
    /// Frame rates the camera supports at this resolution.
    pub fn allowed_fps(self) -> &'static [u32] {
        match self {
            Resolution::Wvga => &[15, 30, 60, 100],
            Resolution::Hd720 => &[15, 30, 60],
            Resolution::Hd1080 => &[15, 30],
            Resolution::Hd2k => &[15],
        }
    }

    /// Width and height of a single-eye frame.
    pub fn frame_size(self) -> (u32, u32) {
        match self {
            Resolution::Hd2k => (2208, 1242),
            Resolution::Hd1080 => (1920, 1080),
            Resolution::Hd720 => (1280, 720),
            Resolution::Wvga => (800, 480),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_name(self))
    }
}

// ==================== Flag tables ====================

pub const PLAYBACK_USAGE: &str = "playback -f <filename>";
pub const SVO_DOCTOR_USAGE: &str = "svo-doctor -f <filename>";

pub fn depth_sensing_spec() -> ToolSpec {
    ToolSpec {
        name: "depth-sensing",
        options: vec![
            OptionSpec::value("-u", ValueRule::one_of::<Unit>(), "milli"),
            OptionSpec::value("-d", ValueRule::one_of::<DepthMode>(), "ultra"),
            OptionSpec::value("-s", ValueRule::one_of::<SensingMode>(), "standard"),
            OptionSpec::value(
                "-g",
                ValueRule::OneOf(vec!["on".to_string(), "off".to_string()]),
                "off",
            ),
        ],
        cross_validator: None,
        empty_args: EmptyArgs::Defaults,
    }
}

pub fn playback_spec() -> ToolSpec {
    filename_spec("playback", PLAYBACK_USAGE)
}

pub fn svo_doctor_spec() -> ToolSpec {
    filename_spec("svo-doctor", SVO_DOCTOR_USAGE)
}

fn filename_spec(name: &'static str, usage: &'static str) -> ToolSpec {
    ToolSpec {
        name,
        options: vec![OptionSpec::value("-f", ValueRule::NonEmpty, "")],
        cross_validator: None,
        empty_args: EmptyArgs::Usage(usage),
    }
}

pub fn video_capture_spec() -> ToolSpec {
    ToolSpec {
        name: "video-capture",
        options: vec![
            OptionSpec::value("-r", ValueRule::one_of::<Resolution>(), "1080p"),
            OptionSpec::value("-f", ValueRule::Digits, "30"),
            OptionSpec::switch("-g"),
            OptionSpec::switch("-s"),
        ],
        cross_validator: Some(framerate_fits_resolution),
        empty_args: EmptyArgs::Defaults,
    }
}

/// The chosen fps must be one the chosen resolution supports.
fn framerate_fits_resolution(parsed: &ParsedOptions) -> Result<(), String> {
    let res_name = parsed.text("-r").unwrap_or_default();
    let infeasible = || format!("Invalid framerate for resolution {}", res_name);

    let resolution = Resolution::from_str(res_name, false).map_err(|_| infeasible())?;
    let fps: u32 = parsed
        .text("-f")
        .and_then(|f| f.parse().ok())
        .ok_or_else(infeasible)?;

    if resolution.allowed_fps().contains(&fps) {
        Ok(())
    } else {
        Err(infeasible())
    }
}

// ==================== Typed settings ====================

fn text<'a>(parsed: &'a ParsedOptions, key: &str) -> Result<&'a str, OptionError> {
    parsed
        .text(key)
        .ok_or_else(|| OptionError::invalid_value(key, ""))
}

fn choice<T: ValueEnum>(parsed: &ParsedOptions, key: &str) -> Result<T, OptionError> {
    let value = text(parsed, key)?;
    T::from_str(value, false).map_err(|_| OptionError::invalid_value(key, value))
}

/// Settings for the depth sensing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSensingOptions {
    pub unit: Unit,
    pub depth_mode: DepthMode,
    pub sensing_mode: SensingMode,
    pub gui: bool,
}

impl DepthSensingOptions {
    pub fn from_args<I, S>(args: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_parsed(&depth_sensing_spec().resolve(args)?)
    }

    pub fn from_parsed(parsed: &ParsedOptions) -> Result<Self, OptionError> {
        Ok(Self {
            unit: choice(parsed, "-u")?,
            depth_mode: choice(parsed, "-d")?,
            sensing_mode: choice(parsed, "-s")?,
            gui: text(parsed, "-g")? == "on",
        })
    }
}

/// Settings for the playback tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub filename: PathBuf,
}

impl PlaybackOptions {
    pub fn from_args<I, S>(args: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = playback_spec().resolve(args)?;
        Ok(Self {
            filename: PathBuf::from(text(&parsed, "-f")?),
        })
    }
}

/// Settings for the SVO diagnostic tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvoDoctorOptions {
    pub filename: PathBuf,
}

impl SvoDoctorOptions {
    pub fn from_args<I, S>(args: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = svo_doctor_spec().resolve(args)?;
        Ok(Self {
            filename: PathBuf::from(text(&parsed, "-f")?),
        })
    }
}

/// Settings for the video capture tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCaptureOptions {
    pub resolution: Resolution,
    /// Frame rate exactly as typed, e.g. `"030"`
    pub fps_text: String,
    pub fps: u32,
    pub gui: bool,
    /// Record to an SVO file instead of a video file
    pub record_svo: bool,
}

impl VideoCaptureOptions {
    pub fn from_args<I, S>(args: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_parsed(&video_capture_spec().resolve(args)?)
    }

    pub fn from_parsed(parsed: &ParsedOptions) -> Result<Self, OptionError> {
        let fps_text = text(parsed, "-f")?;
        let fps = fps_text
            .parse()
            .map_err(|_| OptionError::invalid_value("-f", fps_text))?;
        Ok(Self {
            resolution: choice(parsed, "-r")?,
            fps_text: fps_text.to_string(),
            fps,
            gui: parsed.flag("-g").unwrap_or(false),
            record_svo: parsed.flag("-s").unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_shorthand() {
        assert_eq!(Unit::Milli.shorthand(), "[mm]");
        assert_eq!(Unit::Centi.shorthand(), "[cm]");
        assert_eq!(Unit::Meter.shorthand(), "[m]");
        assert_eq!(Unit::Inch.shorthand(), "[in]");
        assert_eq!(Unit::Foot.shorthand(), "[ft]");
    }

    #[test]
    fn test_resolution_names_match_flag_values() {
        assert_eq!(
            super::super::value_names::<Resolution>(),
            vec!["wvga", "720p", "1080p", "2.2k"]
        );
        for res in Resolution::value_variants() {
            assert_eq!(Resolution::from_str(&res.to_string(), false).unwrap(), *res);
        }
        assert_eq!(Resolution::Hd2k.to_string(), "2.2k");
        assert_eq!(Resolution::Hd720.to_string(), "720p");
    }

    #[test]
    fn test_resolution_frame_size() {
        assert_eq!(Resolution::Hd2k.frame_size(), (2208, 1242));
        assert_eq!(Resolution::Hd1080.frame_size(), (1920, 1080));
        assert_eq!(Resolution::Hd720.frame_size(), (1280, 720));
        assert_eq!(Resolution::Wvga.frame_size(), (800, 480));
    }

    #[test]
    fn test_depth_sensing_allowed_values() {
        let spec = depth_sensing_spec();
        let allowed: Vec<Vec<String>> = spec
            .options
            .iter()
            .map(|o| match &o.kind {
                super::super::OptionKind::Value(rule) => rule.allowed_values().to_vec(),
                super::super::OptionKind::Switch => vec![],
            })
            .collect();
        assert_eq!(allowed[0], vec!["milli", "centi", "meter", "inch", "foot"]);
        assert_eq!(allowed[1], vec!["ultra", "quality", "performance"]);
        assert_eq!(allowed[2], vec!["standard", "fill"]);
        assert_eq!(allowed[3], vec!["on", "off"]);
    }

    #[test]
    fn test_depth_sensing_typed_defaults() {
        let opts = DepthSensingOptions::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(opts.unit, Unit::Milli);
        assert_eq!(opts.depth_mode, DepthMode::Ultra);
        assert_eq!(opts.sensing_mode, SensingMode::Standard);
        assert!(!opts.gui);
    }

    #[test]
    fn test_depth_sensing_typed_values() {
        let opts =
            DepthSensingOptions::from_args(["-u", "foot", "-d", "performance", "-s", "fill", "-g", "on"])
                .unwrap();
        assert_eq!(opts.unit, Unit::Foot);
        assert_eq!(opts.depth_mode, DepthMode::Performance);
        assert_eq!(opts.sensing_mode, SensingMode::Fill);
        assert!(opts.gui);
    }

    #[test]
    fn test_video_capture_typed_keeps_fps_text() {
        let opts = VideoCaptureOptions::from_args(["-r", "wvga", "-f", "030"]).unwrap();
        assert_eq!(opts.resolution, Resolution::Wvga);
        assert_eq!(opts.fps_text, "030");
        assert_eq!(opts.fps, 30);
        assert!(!opts.gui);
        assert!(!opts.record_svo);
    }

    #[test]
    fn test_video_capture_huge_fps_is_infeasible() {
        let err = VideoCaptureOptions::from_args(["-f", "99999999999999"]).unwrap_err();
        assert!(matches!(err, OptionError::InfeasibleCombination { .. }));
    }

    #[test]
    fn test_playback_filename() {
        let opts = PlaybackOptions::from_args(["-f", "walk.svo"]).unwrap();
        assert_eq!(opts.filename, PathBuf::from("walk.svo"));
    }

    #[test]
    fn test_svo_doctor_rejects_empty_filename() {
        let err = SvoDoctorOptions::from_args(["-f", ""]).unwrap_err();
        assert_eq!(err, OptionError::invalid_value("-f", ""));
    }
}
