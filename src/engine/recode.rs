// Per-frame recoding using cwebp

use crate::engine::error::ConvertError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Recodes one extracted still into the target still codec.
pub trait FrameRecoder {
    /// `index` is the frame's position in decode order, used for error
    /// reporting only. Returns the path of the recoded file.
    fn recode(&self, frame: &Path, index: usize, quality: u8) -> Result<PathBuf, ConvertError>;
}

/// Recoder backed by the real cwebp binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CwebpRecoder;

/// Build the cwebp invocation for one still.
pub fn build_recode_cmd(frame: &Path, output: &Path, quality: u8) -> Command {
    let mut cmd = Command::new("cwebp");
    cmd.args(["-quiet", "-q", &quality.to_string()])
        .arg(frame)
        .arg("-o")
        .arg(output);
    cmd
}

impl FrameRecoder for CwebpRecoder {
    fn recode(&self, frame: &Path, index: usize, quality: u8) -> Result<PathBuf, ConvertError> {
        let output_path = frame.with_extension("webp");

        let output = build_recode_cmd(frame, &output_path, quality)
            .output()
            .map_err(|e| ConvertError::Recode {
                index,
                reason: format!("failed to execute cwebp: {e}"),
            })?;

        if !output.status.success() {
            return Err(ConvertError::Recode {
                index,
                reason: format!(
                    "cwebp failed: {}",
                    String::from_utf8_lossy(&output.stderr)
                ),
            });
        }

        Ok(output_path)
    }
}
