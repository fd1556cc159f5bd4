//! APNG to animated WebP conversion.
//!
//! The engine probes a source animation with ffprobe, extracts stills with
//! ffmpeg, recodes them with cwebp, and muxes the result with webpmux. The
//! frame-timing planner in [`engine::planner`] is the only in-crate logic;
//! each external tool sits behind a trait so the pipeline is testable
//! without the binaries installed.

pub mod config;
pub mod engine;
