// Input probing using ffprobe

use crate::engine::error::ConvertError;
use crate::engine::planner::FrameTimestamp;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// Source animation metadata from the first video stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: Option<u64>,
}

/// Timing and geometry source for a conversion job.
///
/// One implementation shells out to ffprobe; tests substitute fakes so the
/// planner and pipeline run without any tools installed.
pub trait Prober {
    /// Dimensions and nominal frame rate of the source.
    fn input_info(&self, path: &Path) -> Result<InputInfo, ConvertError>;

    /// Per-frame presentation times and duration hints, in decode order.
    /// An empty result is a fatal probe error.
    fn frame_timestamps(&self, path: &Path) -> Result<Vec<FrameTimestamp>, ConvertError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStreams {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFrame {
    pts_time: Option<String>,
    duration_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFrames {
    #[serde(default)]
    frames: Vec<FfprobeFrame>,
}

/// Prober backed by the real ffprobe binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeProber;

impl FfprobeProber {
    fn run(&self, path: &Path, extra_args: &[&str]) -> Result<String, ConvertError> {
        let output = Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-select_streams", "v:0"])
            .args(extra_args)
            .arg(path)
            .output()
            .map_err(|e| probe_err(path, format!("failed to execute ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(probe_err(
                path,
                format!("ffprobe failed: {}", String::from_utf8_lossy(&output.stderr)),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Prober for FfprobeProber {
    fn input_info(&self, path: &Path) -> Result<InputInfo, ConvertError> {
        let json = self.run(path, &["-show_streams"])?;
        parse_input_info(&json).map_err(|reason| probe_err(path, reason))
    }

    fn frame_timestamps(&self, path: &Path) -> Result<Vec<FrameTimestamp>, ConvertError> {
        let json = self.run(path, &["-show_frames"])?;
        parse_frame_timestamps(&json).map_err(|reason| probe_err(path, reason))
    }
}

fn probe_err(path: &Path, reason: String) -> ConvertError {
    ConvertError::Probe {
        path: path.to_path_buf(),
        reason,
    }
}

/// Parse ffprobe `-show_streams` JSON into [`InputInfo`].
pub fn parse_input_info(json: &str) -> Result<InputInfo, String> {
    let probe: FfprobeStreams =
        serde_json::from_str(json).map_err(|e| format!("unparseable ffprobe JSON: {e}"))?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| "no video stream found".to_string())?;

    let width = stream.width.ok_or_else(|| "missing stream width".to_string())?;
    let height = stream.height.ok_or_else(|| "missing stream height".to_string())?;

    // r_frame_rate first, avg_frame_rate as a fallback
    let fps_str = stream
        .r_frame_rate
        .as_deref()
        .or(stream.avg_frame_rate.as_deref())
        .ok_or_else(|| "missing stream frame rate".to_string())?;
    let fps = parse_fraction(fps_str).ok_or_else(|| format!("invalid frame rate: {fps_str}"))?;

    let frame_count = stream.nb_frames.as_deref().and_then(|s| s.parse().ok());

    Ok(InputInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// Parse ffprobe `-show_frames` JSON into decode-order frame timestamps.
pub fn parse_frame_timestamps(json: &str) -> Result<Vec<FrameTimestamp>, String> {
    let probe: FfprobeFrames =
        serde_json::from_str(json).map_err(|e| format!("unparseable ffprobe JSON: {e}"))?;

    if probe.frames.is_empty() {
        return Err("no frames in ffprobe output".to_string());
    }

    let mut timestamps = Vec::with_capacity(probe.frames.len());
    for (i, frame) in probe.frames.iter().enumerate() {
        let pts = frame
            .pts_time
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| format!("frame {i} has no parseable pts_time"))?;
        let hint = frame
            .duration_time
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok());
        timestamps.push(FrameTimestamp {
            presentation_s: pts,
            duration_hint_s: hint,
        });
    }

    Ok(timestamps)
}

/// Parse a fraction string like "30000/1001" to f64
fn parse_fraction(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let numerator: f64 = num.parse().ok()?;
    let denominator: f64 = den.parse().ok()?;

    if denominator == 0.0 {
        return None;
    }

    Some(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("30/1"), Some(30.0));

        let ntsc = parse_fraction("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01, "expected ~29.97, got {}", ntsc);

        assert_eq!(parse_fraction("invalid"), None);
        assert_eq!(parse_fraction("30/0"), None);
        assert_eq!(parse_fraction("30"), None);
    }

    #[test]
    fn test_parse_input_info() {
        let json = r#"{
            "streams": [{
                "width": 136,
                "height": 128,
                "r_frame_rate": "25/1",
                "avg_frame_rate": "25/1",
                "nb_frames": "61"
            }]
        }"#;

        let info = parse_input_info(json).unwrap();
        assert_eq!(info.width, 136);
        assert_eq!(info.height, 128);
        assert_eq!(info.fps, 25.0);
        assert_eq!(info.frame_count, Some(61));
    }

    #[test]
    fn test_parse_input_info_no_streams() {
        let err = parse_input_info(r#"{"streams": []}"#).unwrap_err();
        assert!(err.contains("no video stream"));
    }

    #[test]
    fn test_parse_frame_timestamps() {
        let json = r#"{
            "frames": [
                {"pts_time": "0.000000", "duration_time": "0.040000"},
                {"pts_time": "0.040000"}
            ]
        }"#;

        let frames = parse_frame_timestamps(json).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].presentation_s, 0.0);
        assert_eq!(frames[0].duration_hint_s, Some(0.04));
        assert_eq!(frames[1].presentation_s, 0.04);
        assert_eq!(frames[1].duration_hint_s, None);
    }

    #[test]
    fn test_parse_frame_timestamps_empty_is_error() {
        let err = parse_frame_timestamps(r#"{"frames": []}"#).unwrap_err();
        assert!(err.contains("no frames"));
    }
}
