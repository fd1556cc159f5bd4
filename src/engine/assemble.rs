// Animated WebP assembly using webpmux

use crate::engine::error::ConvertError;
use crate::engine::planner::{AnimationPlan, FramePlanEntry};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Muxes recoded stills into one animated image per the plan.
pub trait Assembler {
    fn assemble(
        &self,
        frames: &[PathBuf],
        plan: &AnimationPlan,
        output: &Path,
    ) -> Result<(), ConvertError>;
}

/// Assembler backed by the real webpmux binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebpmuxAssembler;

/// webpmux frame descriptor: `+duration+x+y+dispose(+b|-b)`.
pub fn frame_descriptor(entry: &FramePlanEntry) -> String {
    format!(
        "+{}+{}+{}+{}{}",
        entry.delay_ms,
        entry.x_offset,
        entry.y_offset,
        if entry.dispose { 1 } else { 0 },
        if entry.blend { "+b" } else { "-b" },
    )
}

/// Build the webpmux invocation for the whole animation.
pub fn build_assemble_cmd(
    frames: &[PathBuf],
    plan: &AnimationPlan,
    output: &Path,
) -> Command {
    let mut cmd = Command::new("webpmux");
    for (frame, entry) in frames.iter().zip(&plan.frames) {
        cmd.arg("-frame").arg(frame).arg(frame_descriptor(entry));
    }
    cmd.args(["-loop", &plan.loop_count.to_string()])
        .arg("-o")
        .arg(output);
    cmd
}

impl Assembler for WebpmuxAssembler {
    fn assemble(
        &self,
        frames: &[PathBuf],
        plan: &AnimationPlan,
        output: &Path,
    ) -> Result<(), ConvertError> {
        if frames.len() != plan.frames.len() {
            return Err(ConvertError::Assembly(format!(
                "plan has {} entries for {} frames",
                plan.frames.len(),
                frames.len()
            )));
        }

        let result = build_assemble_cmd(frames, plan, output)
            .output()
            .map_err(|e| ConvertError::Assembly(format!("failed to execute webpmux: {e}")))?;

        if !result.status.success() {
            return Err(ConvertError::Assembly(format!(
                "webpmux failed: {}",
                String::from_utf8_lossy(&result.stderr)
            )));
        }

        Ok(())
    }
}
