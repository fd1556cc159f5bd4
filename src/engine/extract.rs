// Frame extraction using ffmpeg

use crate::engine::error::ConvertError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Decodes a source animation into still images on disk, one per frame,
/// decode order preserved in filename sort order.
pub trait FrameExtractor {
    fn extract(
        &self,
        input: &Path,
        size: Option<(u32, u32)>,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConvertError>;
}

/// Extractor backed by the real ffmpeg binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegExtractor;

/// Scale/pad filter for the decode step.
///
/// A requested size fits the frame inside WxH and pads to center; otherwise
/// dimensions are just forced even, which the WebP encoder requires.
pub fn video_filter(size: Option<(u32, u32)>) -> String {
    match size {
        Some((w, h)) => format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"
        ),
        None => "scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string(),
    }
}

/// Build the ffmpeg invocation that dumps numbered PNG stills into `work_dir`.
pub fn build_extract_cmd(input: &Path, size: Option<(u32, u32)>, work_dir: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-f", "apng", "-i"])
        .arg(input)
        .args(["-vf", &video_filter(size)])
        // One output image per decoded frame, no rate conversion
        .args(["-fps_mode", "passthrough"])
        .arg(work_dir.join("frame_%05d.png"));
    cmd
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(
        &self,
        input: &Path,
        size: Option<(u32, u32)>,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConvertError> {
        let output = build_extract_cmd(input, size, work_dir)
            .output()
            .map_err(|e| ConvertError::Extraction(format!("failed to execute ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(ConvertError::Extraction(format!(
                "ffmpeg failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let frames = collect_frames(work_dir)?;
        if frames.is_empty() {
            return Err(ConvertError::Extraction(format!(
                "ffmpeg produced no frames for {}",
                input.display()
            )));
        }

        Ok(frames)
    }
}

/// Gather extracted stills from the work dir in decode (filename) order.
pub fn collect_frames(work_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(work_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".png"))
        })
        .collect();
    frames.sort();
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_filter_with_size() {
        assert_eq!(
            video_filter(Some((128, 96))),
            "scale=128:96:force_original_aspect_ratio=decrease,pad=128:96:(ow-iw)/2:(oh-ih)/2"
        );
    }

    #[test]
    fn test_video_filter_default_forces_even() {
        assert_eq!(video_filter(None), "scale=trunc(iw/2)*2:trunc(ih/2)*2");
    }

    #[test]
    fn test_collect_frames_sorted_and_filtered() {
        let tmp = tempfile::TempDir::new().unwrap();
        for name in ["frame_00002.png", "frame_00001.png", "frame_00010.png"] {
            std::fs::write(tmp.path().join(name), b"png").unwrap();
        }
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let frames = collect_frames(tmp.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["frame_00001.png", "frame_00002.png", "frame_00010.png"]);
    }
}
