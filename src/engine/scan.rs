// Batch scanning and job queue construction

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;

/// Source extensions picked up by the batch scan
const APNG_EXTENSIONS: &[&str] = &["png", "apng"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

/// One queued batch conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertJob {
    pub id: Uuid,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub status: JobStatus,
    pub last_error: Option<String>,
}

impl ConvertJob {
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            input_path,
            output_path,
            status: JobStatus::Pending,
            last_error: None,
        }
    }
}

/// Check if a path looks like an animated PNG source
pub fn is_apng_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| APNG_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Output path next to the input, same stem, .webp extension
pub fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("webp")
}

/// Scan a directory recursively for APNG sources and invoke a callback for
/// each file found
pub fn scan_streaming<F>(root: &Path, mut on_file: F)
where
    F: FnMut(PathBuf),
{
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_apng_file(path) {
            on_file(path.to_path_buf());
        }
    }
}

/// Scan a directory recursively for APNG sources
pub fn scan(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    scan_streaming(root, |path| files.push(path));
    files
}

/// Build one job, marked Skipped when the output already exists and
/// overwrite is disabled
pub fn build_job_from_path(input_path: PathBuf, overwrite: bool) -> ConvertJob {
    let output_path = derive_output_path(&input_path);
    let mut job = ConvertJob::new(input_path, output_path);

    if !overwrite && job.output_path.exists() {
        job.status = JobStatus::Skipped;
    }

    job
}

pub fn build_job_queue(files: Vec<PathBuf>, overwrite: bool) -> Vec<ConvertJob> {
    files
        .into_iter()
        .map(|input_path| build_job_from_path(input_path, overwrite))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_apng_file() {
        assert!(is_apng_file(Path::new("blink.png")));
        assert!(is_apng_file(Path::new("blink.PNG")));
        assert!(is_apng_file(Path::new("blink.apng")));

        assert!(!is_apng_file(Path::new("blink.webp")));
        assert!(!is_apng_file(Path::new("blink.gif")));
        assert!(!is_apng_file(Path::new("blink")));
    }

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("/a/wave.png")),
            PathBuf::from("/a/wave.webp")
        );
        assert_eq!(
            derive_output_path(Path::new("wave.apng")),
            PathBuf::from("wave.webp")
        );
    }

    #[test]
    fn test_scan_finds_sources_in_subdirs() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();
        fs::create_dir(dir_path.join("nested")).unwrap();
        fs::write(dir_path.join("a.png"), b"fake apng").unwrap();
        fs::write(dir_path.join("nested").join("b.apng"), b"fake apng").unwrap();
        fs::write(dir_path.join("c.txt"), b"not an image").unwrap();

        let files = scan(dir_path);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_build_job_queue_skips_existing_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = temp_dir.path();

        let input_files: Vec<PathBuf> = (1..=3)
            .map(|i| {
                let path = dir_path.join(format!("anim{}.png", i));
                fs::write(&path, b"fake apng").unwrap();
                path
            })
            .collect();

        // Existing output for the first input only
        fs::write(dir_path.join("anim1.webp"), b"fake webp").unwrap();

        let jobs = build_job_queue(input_files.clone(), false);
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].status, JobStatus::Skipped);
        assert_eq!(jobs[1].status, JobStatus::Pending);
        assert_eq!(jobs[2].status, JobStatus::Pending);

        let jobs_overwrite = build_job_queue(input_files, true);
        assert!(
            jobs_overwrite
                .iter()
                .all(|j| j.status == JobStatus::Pending)
        );
    }
}
