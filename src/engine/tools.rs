// External tool availability checks

use anyhow::{Context, Result};
use std::process::Command;

fn version_line(binary: &str, arg: &str) -> Result<String> {
    let output = Command::new(binary)
        .arg(arg)
        .output()
        .with_context(|| format!("Failed to execute {binary}. Is it installed and in PATH?"))?;

    if !output.status.success() {
        anyhow::bail!("{} command failed with status: {}", binary, output.status);
    }

    // cwebp and webpmux print the version on stdout as a bare number
    let text = String::from_utf8_lossy(&output.stdout);
    let first_line = text.lines().next().unwrap_or("Unknown version");

    Ok(first_line.to_string())
}

/// Check if ffmpeg is available and return its version line
pub fn ffmpeg_version() -> Result<String> {
    version_line("ffmpeg", "-version")
}

/// Check if ffprobe is available and return its version line
pub fn ffprobe_version() -> Result<String> {
    version_line("ffprobe", "-version")
}

/// Check if cwebp is available and return its version
pub fn cwebp_version() -> Result<String> {
    version_line("cwebp", "-version")
}

/// Check if webpmux is available and return its version
pub fn webpmux_version() -> Result<String> {
    version_line("webpmux", "-version")
}
