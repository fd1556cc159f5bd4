use crate::cli::{Cli, Commands};
use apng2webp::config::{self, JobConfig};
use apng2webp::engine::{self, Converter, scan};
use std::path::PathBuf;
use std::process;

pub fn run(mut cli: Cli) {
    if let Some(command) = cli.command.take() {
        match command {
            Commands::CheckTools => handle_check_tools(),
            Commands::Probe { file } => handle_probe(file),
            Commands::Plan { file } => handle_plan(file, cli.loop_count.unwrap_or(0)),
            Commands::Batch {
                directory,
                overwrite,
                dry_run,
            } => handle_batch(&cli, directory, overwrite, dry_run),
            Commands::InitConfig => handle_init_config(),
        }
        return;
    }

    // Default mode: single conversion, requires input and output
    let (Some(input), Some(output)) = (cli.input.clone(), cli.output.clone()) else {
        eprintln!("Error: Input and output files are required.");
        process::exit(1);
    };

    let job = match resolve_job(&cli, input, output) {
        Ok(job) => job,
        Err(msg) => {
            eprintln!("Error: {msg}");
            process::exit(1);
        }
    };

    match Converter::with_system_tools().run(&job) {
        Ok(outcome) => {
            println!(
                "Conversion complete: {} ({} frames)",
                outcome.output.display(),
                outcome.frame_count
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Resolve CLI flags against user-config defaults into one immutable job.
fn resolve_job(cli: &Cli, input: PathBuf, output: PathBuf) -> Result<JobConfig, String> {
    let defaults = config::Config::load().unwrap_or_default().defaults;

    let quality = cli.quality.unwrap_or(defaults.quality);
    if quality > 100 {
        return Err(format!("quality must be 0-100, got {quality}"));
    }

    let size = match cli.size.as_deref() {
        Some(s) => Some(config::parse_size(s)?),
        None => None,
    };

    Ok(JobConfig {
        input,
        output,
        quality,
        size,
        loop_count: cli.loop_count.unwrap_or(defaults.loop_count),
        strict: cli.strict,
    })
}

fn handle_check_tools() {
    let checks = [
        ("ffmpeg", engine::tools::ffmpeg_version()),
        ("ffprobe", engine::tools::ffprobe_version()),
        ("cwebp", engine::tools::cwebp_version()),
        ("webpmux", engine::tools::webpmux_version()),
    ];

    let mut missing = false;
    for (name, result) in checks {
        match result {
            Ok(version) => println!("{} found: {}", name, version),
            Err(e) => {
                eprintln!("{} missing: {:#}", name, e);
                missing = true;
            }
        }
    }

    process::exit(if missing { 1 } else { 0 });
}

fn handle_probe(file: PathBuf) {
    match Converter::with_system_tools().probe(&file) {
        Ok(info) => {
            println!("Dimensions: {}x{}", info.width, info.height);
            println!("Frame rate: {:.2} fps", info.fps);
            if let Some(frames) = info.frame_count {
                println!("Frames: {}", frames);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn handle_plan(file: PathBuf, loop_count: u32) {
    match Converter::with_system_tools().plan(&file, loop_count) {
        Ok((info, plan)) => {
            println!(
                "Source: {}x{} @ {:.2} fps, {} frames planned",
                info.width,
                info.height,
                info.fps,
                plan.frames.len()
            );
            for (i, entry) in plan.frames.iter().enumerate() {
                println!("frame {:4}: {} ms", i, entry.delay_ms);
            }
            let total_ms: u64 = plan.frames.iter().map(|f| u64::from(f.delay_ms)).sum();
            println!("Total: {} ms, loop count {}", total_ms, plan.loop_count);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn handle_batch(cli: &Cli, directory: Option<PathBuf>, overwrite: bool, dry_run: bool) {
    let dir = directory
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    println!("Scanning directory: {}", dir.display());

    let files = scan::scan(&dir);
    if files.is_empty() {
        println!("No APNG files found in {}", dir.display());
        return;
    }

    let overwrite = overwrite || config::Config::load().unwrap_or_default().defaults.overwrite;
    let mut jobs = scan::build_job_queue(files, overwrite);

    if dry_run {
        for job in &jobs {
            println!(
                "- {} -> {} [{:?}]",
                job.input_path.display(),
                job.output_path.display(),
                job.status
            );
            if job.status == scan::JobStatus::Pending {
                let cmd = engine::extract::build_extract_cmd(
                    &job.input_path,
                    None,
                    std::path::Path::new("<workdir>"),
                );
                println!("    {}", engine::format_command(&cmd));
            }
        }
        println!("Total jobs: {}", jobs.len());
        return;
    }

    let converter = Converter::with_system_tools();
    let (mut done, mut failed, mut skipped) = (0u32, 0u32, 0u32);

    for job in &mut jobs {
        if job.status == scan::JobStatus::Skipped {
            skipped += 1;
            continue;
        }

        job.status = scan::JobStatus::Running;
        let job_config = match resolve_job(cli, job.input_path.clone(), job.output_path.clone()) {
            Ok(cfg) => cfg,
            Err(msg) => {
                eprintln!("Error: {msg}");
                process::exit(1);
            }
        };

        match converter.run(&job_config) {
            Ok(outcome) => {
                job.status = scan::JobStatus::Done;
                done += 1;
                println!(
                    "Converted: {} ({} frames)",
                    outcome.output.display(),
                    outcome.frame_count
                );
            }
            Err(e) => {
                job.status = scan::JobStatus::Failed;
                job.last_error = Some(e.to_string());
                failed += 1;
                eprintln!("Failed: {}: {}", job.input_path.display(), e);
            }
        }
    }

    println!("Batch complete: {done} converted, {failed} failed, {skipped} skipped");
    if failed > 0 {
        process::exit(1);
    }
}

fn handle_init_config() {
    match config::Config::load() {
        Ok(cfg) => {
            match config::Config::config_path() {
                Ok(path) => println!("Config loaded successfully from {}", path.display()),
                Err(e) => println!("Config loaded, but config path unknown: {:#}", e),
            }
            println!("{:#?}", cfg);
        }
        Err(e) => {
            println!("Config missing or invalid: {:#}", e);
            println!("Creating default config...");

            let cfg = config::Config::default();
            if let Err(err) = cfg.save() {
                eprintln!("Failed to save default config: {:#}", err);
                process::exit(1);
            }
            match config::Config::config_path() {
                Ok(path) => println!("Default config saved to {}", path.display()),
                Err(e) => println!("Default config saved (path unknown): {:#}", e),
            }
        }
    }
}
