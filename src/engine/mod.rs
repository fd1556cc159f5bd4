// Conversion engine - independent of the CLI surface

pub mod assemble;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod planner;
pub mod probe;
pub mod recode;
pub mod scan;
pub mod tools;

pub use error::ConvertError;
pub use pipeline::{ConvertOutcome, Converter};
pub use planner::{AnimationPlan, FramePlanEntry, FrameTimestamp};
pub use probe::InputInfo;
pub use scan::{ConvertJob, JobStatus};

/// Shell-quoted rendering of an external command, for dry-run display.
pub fn format_command(cmd: &std::process::Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let s = arg.to_string_lossy();
            shlex::try_quote(&s)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| s.into_owned())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
