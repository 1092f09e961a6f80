use crate::cli::CommonArgs;
use crate::config::Config;
use crate::error::{Result, StockError};
use crate::git::GitRepo;
use crate::progress::{CancelFlag, Progress};
use crate::report::JsonLinesReport;
use crate::snapshot::TreeSnapshot;
use crate::timeline::CommitTimeline;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

pub fn exec(
    common: CommonArgs,
    threads: usize,
    output: Option<PathBuf>,
    quiet: bool,
    rev: Option<String>,
) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let config =
        Config::from_args(&common, repo.path()).context("Failed to load configuration")?;

    let head = repo
        .resolve_commit(rev.as_deref())
        .context("Failed to resolve revision")?;
    let commits = repo
        .walk_commits(head.id)
        .context("Failed to walk commit graph")?;
    let timeline = CommitTimeline::new(commits);

    let out: Box<dyn Write + Send> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("Failed to create output file")?,
        )),
        None => Box::new(std::io::stdout()),
    };
    let report = JsonLinesReport::new(out);
    let progress = Progress::new(timeline.days() as u64, quiet);
    let cancel = CancelFlag::new();

    run_pipeline(
        repo.path(),
        &timeline,
        &config,
        &report,
        &progress,
        &cancel,
        threads,
    )
    .context("History pipeline failed")?;

    report.flush()?;
    progress.finish();
    Ok(())
}

/// Drive a fixed pool of worker threads over the timeline. Each worker
/// opens its own repository handle, then loops: claim a day, snapshot the
/// day's newest commit, report, tick, release. Failure to spawn a worker is
/// fatal; per-day backend failures only reduce coverage.
pub fn run_pipeline(
    repo_path: &Path,
    timeline: &CommitTimeline,
    config: &Config,
    report: &JsonLinesReport,
    progress: &Progress,
    cancel: &CancelFlag,
    threads: usize,
) -> Result<()> {
    let threads = threads.max(1);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        for index in 0..threads {
            let builder = thread::Builder::new().name(format!("stockline-worker-{index}"));
            let handle = builder.spawn_scoped(scope, move || {
                worker_loop(repo_path, timeline, config, report, progress, cancel)
            })?;
            handles.push(handle);
        }

        let mut result = Ok(());
        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
                Err(_) => {
                    if result.is_ok() {
                        result = Err(StockError::WorkerPanic);
                    }
                }
            }
        }
        result
    })
}

fn worker_loop(
    repo_path: &Path,
    timeline: &CommitTimeline,
    config: &Config,
    report: &JsonLinesReport,
    progress: &Progress,
    cancel: &CancelFlag,
) -> Result<()> {
    // One backend handle per worker; libgit2 handles are not shareable
    // across threads without external locking.
    let repo = GitRepo::open(Some(repo_path))?;

    let mut write_result = Ok(());
    while write_result.is_ok() && !cancel.is_cancelled() {
        let Some(claimed) = timeline.claim() else {
            break;
        };

        if let Some(tip) = claimed.day().newest() {
            // A day whose objects cannot be read is skipped, not fatal.
            if let Ok(snapshot) = TreeSnapshot::collect(&repo, config, tip.id) {
                write_result = report.report_day(claimed.day(), &snapshot, config);
            }
        }

        progress.tick();
        // Always hand the day back, even on cancellation or a failed
        // write; reclamation stalls otherwise.
        timeline.release(claimed);
    }

    write_result
}
