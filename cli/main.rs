use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use shredder::{shred_with_progress, Progress, ShredOptions, ShredRequest};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Shredder - Overwrite files with random data to hide their contents
#[derive(Parser, Debug)]
#[command(name = "shredder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Number of overwrite passes
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    iterations: Option<u32>,

    /// Keep files after overwriting instead of removing them
    #[arg(short, long)]
    keep: bool,

    /// Do not round file sizes up to the next full block
    #[arg(short = 'x', long)]
    exact: bool,

    /// Number of files shredded at the same time
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    jobs: u32,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Do not show progress bars
    #[arg(long)]
    no_progress: bool,

    /// Files or devices to shred
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging
    // Use RUST_LOG environment variable to control log level (e.g., RUST_LOG=info,shredder=debug)
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    info!(targets = cli.paths.len(), "shredder starting");

    let opts = resolve_options(&cli)?;

    if opts.delete && !cli.yes && !confirm(&cli.paths)? {
        println!("Cancelled.");
        return Ok(());
    }

    cmd_shred(cli.paths, opts, cli.jobs as usize, !cli.no_progress).await
}

/// Merge config file, environment and command line flags
/// Priority: flags > ENV vars > config file > defaults
fn resolve_options(cli: &Cli) -> Result<ShredOptions> {
    let opts = ShredOptions::load_with_env(cli.config.as_deref())?
        .with_overrides(cli.iterations, cli.keep, cli.exact);
    opts.validate()?;
    Ok(opts)
}

fn confirm(paths: &[PathBuf]) -> Result<bool> {
    for path in paths {
        println!("  {}", path.display());
    }
    print!(
        "Shred and remove {} target(s)? This cannot be undone. [y/N]: ",
        paths.len()
    );
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("reading confirmation")?;

    Ok(response.trim().eq_ignore_ascii_case("y"))
}

/// Create a styled progress bar for one target
fn create_progress_bar(multi: &MultiProgress, path: &Path) -> ProgressBar {
    let pb = multi.add(ProgressBar::new(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {bytes}/{total_bytes} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(path.display().to_string());
    pb
}

/// Shred every target, at most `jobs` at a time
async fn cmd_shred(
    paths: Vec<PathBuf>,
    opts: ShredOptions,
    jobs: usize,
    progress: bool,
) -> Result<()> {
    let multi = if progress {
        MultiProgress::new()
    } else {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    };
    let limit = Arc::new(Semaphore::new(jobs));
    let total = paths.len();
    let mut tasks = JoinSet::new();

    for path in paths {
        let permit = limit
            .clone()
            .acquire_owned()
            .await
            .context("job limiter closed")?;
        let pb = create_progress_bar(&multi, &path);

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let request = ShredRequest::new(&path, opts);
            let name = path.display().to_string();
            let mut current_pass = 0;

            let result = shred_with_progress(&request, |p: Progress| {
                if p.pass != current_pass {
                    current_pass = p.pass;
                    pb.set_length(p.total * u64::from(p.passes));
                    pb.set_message(format!("{} (pass {}/{})", name, p.pass, p.passes));
                }
                pb.set_position(u64::from(p.pass - 1) * p.total + p.written);
            });

            match &result {
                Ok(()) if request.delete => {
                    pb.finish_with_message(format!("{} shredded and removed", name))
                }
                Ok(()) => pb.finish_with_message(format!("{} shredded", name)),
                Err(e) => pb.abandon_with_message(format!("{} failed: {}", name, e)),
            }
            (path, result)
        });
    }

    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (path, result) = joined.context("shred task panicked")?;
        if let Err(e) = result {
            failed += 1;
            error!(path = %path.display(), error = %e, "shred failed");
            eprintln!("shredder: {}", e);
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} target(s) could not be shredded", failed, total);
    }

    info!(targets = total, "all targets shredded");
    Ok(())
}
