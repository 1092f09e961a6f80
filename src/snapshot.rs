use crate::cli::CommonArgs;
use crate::config::Config;
use crate::error::Result;
use crate::git::GitRepo;
use crate::ledger::StockLedger;
use crate::model::{SnapshotOutput, SCHEMA_VERSION};
use crate::report::{file_record, tree_record, JsonLinesReport};
use crate::stats::LineAgeStats;
use crate::util::{format_duration, format_percent};
use anyhow::Context;
use chrono::Utc;
use console::style;
use git2::Oid;

/// Per-file line age statistics plus the file's own author ledger.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub path: String,
    pub stats: LineAgeStats,
    pub stocks: StockLedger,
}

impl FileSnapshot {
    fn new(path: String) -> Self {
        Self {
            path,
            stats: LineAgeStats::new(),
            stocks: StockLedger::new(),
        }
    }
}

/// Aggregated view of one tree snapshot: tree-wide statistics, the
/// snapshot-wide author ledger, and one record per tracked text file.
/// Built once, read-only afterward.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    pub name: String,
    pub stats: LineAgeStats,
    pub stocks: StockLedger,
    pub files: Vec<FileSnapshot>,
}

impl TreeSnapshot {
    /// Walk the tree of commit `at` and fold every blame hunk of every
    /// tracked text file into the per-file and tree-wide aggregates.
    ///
    /// Files the backend cannot blame are skipped and their lines appear
    /// nowhere; historical objects can be legitimately missing in shallow
    /// or pruned histories.
    pub fn collect(repo: &GitRepo, config: &Config, at: Oid) -> Result<TreeSnapshot> {
        let mut tree = TreeSnapshot {
            name: repo.name(),
            stats: LineAgeStats::new(),
            stocks: StockLedger::new(),
            files: Vec::new(),
        };

        for path in repo.tree_files(at)? {
            if config.should_skip(&path) {
                continue;
            }

            let hunks = match repo.blame_file(&path, at) {
                Ok(hunks) => hunks,
                Err(_) => continue,
            };

            let mut file = FileSnapshot::new(path);
            for hunk in hunks {
                let who = config.resolve(&hunk.author_email, &hunk.author_name);

                file.stats.add_lines(hunk.timestamp, hunk.lines);
                file.stocks
                    .find_or_create(who.clone())
                    .stats
                    .add_lines(hunk.timestamp, hunk.lines);

                tree.stats.add_lines(hunk.timestamp, hunk.lines);
                tree.stocks
                    .find_or_create(who)
                    .stats
                    .add_lines(hunk.timestamp, hunk.lines);
            }

            let file_total = file.stats.count_u64();
            file.stocks.compute_ownership(file_total);
            file.stocks.sort_by_contribution();
            tree.files.push(file);
        }

        tree.stocks.compute_ownership(tree.stats.count_u64());
        tree.stocks.sort_by_contribution();
        Ok(tree)
    }
}

pub fn exec(
    common: CommonArgs,
    json: bool,
    ndjson: bool,
    rev: Option<String>,
) -> anyhow::Result<()> {
    let repo = GitRepo::open(common.repo.as_ref()).context("Failed to open git repository")?;
    let config =
        Config::from_args(&common, repo.path()).context("Failed to load configuration")?;

    let head = repo
        .resolve_commit(rev.as_deref())
        .context("Failed to resolve revision")?;
    let snapshot = TreeSnapshot::collect(&repo, &config, head.id)
        .context("Failed to collect snapshot statistics")?;

    if json {
        output_json(&snapshot, &repo, &config, rev.as_deref())?;
    } else if ndjson {
        let report = JsonLinesReport::stdout();
        report.report_snapshot(&snapshot, &config)?;
        report.flush()?;
    } else {
        output_report(&snapshot, &config);
    }

    Ok(())
}

fn output_json(
    snapshot: &TreeSnapshot,
    repo: &GitRepo,
    config: &Config,
    rev: Option<&str>,
) -> anyhow::Result<()> {
    let offset = config.offset_for(snapshot.stats.last_commit_timestamp());
    let output = SnapshotOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: repo.path().to_string_lossy().to_string(),
        reference: rev.unwrap_or("HEAD").to_string(),
        offset_timestamp: offset,
        tree: tree_record(snapshot, config, None),
        files: snapshot
            .files
            .iter()
            .map(|file| file_record(file, config, None))
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_report(snapshot: &TreeSnapshot, config: &Config) {
    let offset = config.offset_for(snapshot.stats.last_commit_timestamp());
    let oldest = snapshot
        .stats
        .first_commit_timestamp()
        .map(|first| num_bigint::BigInt::from(offset - first))
        .unwrap_or_default();

    println!("{}", style(&snapshot.name).bold());
    println!("{}", "═".repeat(56));
    println!("Total lines:                 {}", snapshot.stats.line_count());
    println!("Files:                       {}", snapshot.files.len());
    println!(
        "Average line age:            {}",
        format_duration(&snapshot.stats.mean_age(offset))
    );
    println!("Oldest line age:             {}", format_duration(&oldest));
    println!(
        "Line age standard deviation: {}",
        format_duration(&snapshot.stats.stddev_age(offset))
    );

    println!("\n{}", style("Stocks").bold());
    println!("{}", "═".repeat(56));
    for stock in &snapshot.stocks {
        println!("\n{}", style(&stock.identity).cyan());
        println!("{}", "─".repeat(56));
        println!("Total lines:                 {}", stock.stats.line_count());
        println!("Ownership:                   {}", format_percent(stock.share));
        println!(
            "Average line age:            {}",
            format_duration(&stock.stats.mean_age(offset))
        );
        println!(
            "Line age standard deviation: {}",
            format_duration(&stock.stats.stddev_age(offset))
        );
    }

    println!("\n{}", style("Files").bold());
    println!("{}", "═".repeat(56));
    for file in &snapshot.files {
        if file.stats.is_empty() {
            continue;
        }
        let file_offset = config.offset_for(file.stats.last_commit_timestamp());

        println!("\n{}", style(&file.path).green());
        println!("{}", "─".repeat(56));
        println!("Total lines:                 {}", file.stats.line_count());
        println!(
            "Average line age:            {}",
            format_duration(&file.stats.mean_age(file_offset))
        );
        println!(
            "Line age standard deviation: {}",
            format_duration(&file.stats.stddev_age(file_offset))
        );
        println!("Top contributors:");
        for stock in file.stocks.iter().take(5) {
            println!(
                "  [{}] {}",
                format_percent(stock.share),
                stock.identity
            );
        }
    }
}
