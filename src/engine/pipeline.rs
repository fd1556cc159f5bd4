// Conversion pipeline: probe -> extract -> plan -> recode -> assemble

use crate::config::JobConfig;
use crate::engine::assemble::{Assembler, WebpmuxAssembler};
use crate::engine::error::ConvertError;
use crate::engine::extract::{FfmpegExtractor, FrameExtractor};
use crate::engine::planner::{AnimationPlan, build_plan, compute_delays, reconcile};
use crate::engine::probe::{FfprobeProber, InputInfo, Prober};
use crate::engine::recode::{CwebpRecoder, FrameRecoder};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub frame_count: usize,
    pub output: PathBuf,
}

/// One conversion pipeline with its four external-tool seams.
///
/// Stages run strictly in sequence; the first failure kills the job. All
/// intermediate files live in a per-job temp dir that is removed on every
/// exit path, and the output file only appears once the mux succeeded.
pub struct Converter {
    prober: Box<dyn Prober>,
    extractor: Box<dyn FrameExtractor>,
    recoder: Box<dyn FrameRecoder>,
    assembler: Box<dyn Assembler>,
}

impl Converter {
    pub fn new(
        prober: Box<dyn Prober>,
        extractor: Box<dyn FrameExtractor>,
        recoder: Box<dyn FrameRecoder>,
        assembler: Box<dyn Assembler>,
    ) -> Self {
        Self {
            prober,
            extractor,
            recoder,
            assembler,
        }
    }

    /// Converter wired to the real ffprobe/ffmpeg/cwebp/webpmux binaries.
    pub fn with_system_tools() -> Self {
        Self::new(
            Box::new(FfprobeProber),
            Box::new(FfmpegExtractor),
            Box::new(CwebpRecoder),
            Box::new(WebpmuxAssembler),
        )
    }

    pub fn probe(&self, input: &Path) -> Result<InputInfo, ConvertError> {
        self.prober.input_info(input)
    }

    /// Probe and plan without touching any frames; the dry-run view of the
    /// timing logic.
    pub fn plan(
        &self,
        input: &Path,
        loop_count: u32,
    ) -> Result<(InputInfo, AnimationPlan), ConvertError> {
        let info = self.prober.input_info(input)?;
        let timestamps = self.prober.frame_timestamps(input)?;
        if timestamps.is_empty() {
            return Err(ConvertError::Probe {
                path: input.to_path_buf(),
                reason: "no frames in probe output".to_string(),
            });
        }
        let delays = compute_delays(&timestamps);
        Ok((info, build_plan(&delays, loop_count)))
    }

    /// Run one conversion job end to end.
    pub fn run(&self, job: &JobConfig) -> Result<ConvertOutcome, ConvertError> {
        let info = self.prober.input_info(&job.input)?;
        info!(
            "source: {}x{} @ {:.2} fps",
            info.width, info.height, info.fps
        );

        let timestamps = self.prober.frame_timestamps(&job.input)?;
        if timestamps.is_empty() {
            return Err(ConvertError::Probe {
                path: job.input.clone(),
                reason: "no frames in probe output".to_string(),
            });
        }

        // Removed on drop, including every error return below
        let work_dir = TempDir::new()?;

        let frames = self
            .extractor
            .extract(&job.input, job.size, work_dir.path())?;
        debug!("extracted {} frames", frames.len());

        let delays = compute_delays(&timestamps);
        if job.strict && delays.len() != frames.len() {
            return Err(ConvertError::Extraction(format!(
                "strict mode: {} computed delays for {} extracted frames",
                delays.len(),
                frames.len()
            )));
        }
        let delays = reconcile(delays, frames.len());

        let mut recoded = Vec::with_capacity(frames.len());
        for (index, frame) in frames.iter().enumerate() {
            recoded.push(self.recoder.recode(frame, index, job.quality)?);
        }

        let plan = build_plan(&delays, job.loop_count);
        let staged = work_dir.path().join("animation.webp");
        self.assembler.assemble(&recoded, &plan, &staged)?;

        publish(&staged, &job.output)?;

        Ok(ConvertOutcome {
            frame_count: frames.len(),
            output: job.output.clone(),
        })
    }
}

/// Move the finished animation from the temp dir to its destination.
fn publish(staged: &Path, output: &Path) -> Result<(), ConvertError> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    // rename fails across filesystems; fall back to copy and make sure a
    // failed copy never leaves a partial file behind
    if fs::rename(staged, output).is_err() {
        if let Err(e) = fs::copy(staged, output) {
            let _ = fs::remove_file(output);
            return Err(e.into());
        }
    }
    Ok(())
}
