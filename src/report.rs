use crate::config::Config;
use crate::error::Result;
use crate::ledger::Stock;
use crate::model::{CommitInfo, CommitRecord, DayRecord, FileRecord, StockRecord, TreeRecord};
use crate::snapshot::{FileSnapshot, TreeSnapshot};
use crate::timeline::CommitDay;
use crate::util::{hour_of_day, weekday_name};
use num_traits::ToPrimitive;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

pub fn stock_record(stock: &Stock, offset: i64) -> StockRecord {
    StockRecord {
        author_name: stock.identity.name.clone(),
        author_email: stock.identity.email.clone(),
        lines: stock.stats.count_u64(),
        share: stock.share,
        mean_age_seconds: stock.stats.mean_age(offset).to_u64().unwrap_or_default(),
        stddev_age_seconds: stock.stats.stddev_age(offset).to_u64().unwrap_or_default(),
        first_commit_timestamp: stock.stats.first_commit_timestamp(),
        last_commit_timestamp: stock.stats.last_commit_timestamp(),
    }
}

pub fn tree_record(
    snapshot: &TreeSnapshot,
    config: &Config,
    day_timestamp: Option<i64>,
) -> TreeRecord {
    let offset = config.offset_for(snapshot.stats.last_commit_timestamp());
    TreeRecord {
        record_type: "tree",
        day_timestamp,
        lines: snapshot.stats.count_u64(),
        files: snapshot.files.len(),
        mean_age_seconds: snapshot.stats.mean_age(offset).to_u64().unwrap_or_default(),
        stddev_age_seconds: snapshot
            .stats
            .stddev_age(offset)
            .to_u64()
            .unwrap_or_default(),
        first_commit_timestamp: snapshot.stats.first_commit_timestamp(),
        last_commit_timestamp: snapshot.stats.last_commit_timestamp(),
        stocks: snapshot
            .stocks
            .iter()
            .map(|stock| stock_record(stock, offset))
            .collect(),
    }
}

pub fn file_record(
    file: &FileSnapshot,
    config: &Config,
    day_timestamp: Option<i64>,
) -> FileRecord {
    let offset = config.offset_for(file.stats.last_commit_timestamp());
    FileRecord {
        record_type: "file",
        day_timestamp,
        path: file.path.clone(),
        lines: file.stats.count_u64(),
        mean_age_seconds: file.stats.mean_age(offset).to_u64().unwrap_or_default(),
        stddev_age_seconds: file.stats.stddev_age(offset).to_u64().unwrap_or_default(),
        first_commit_timestamp: file.stats.first_commit_timestamp(),
        last_commit_timestamp: file.stats.last_commit_timestamp(),
        stocks: file
            .stocks
            .iter()
            .map(|stock| stock_record(stock, offset))
            .collect(),
    }
}

pub fn day_record(day: &CommitDay) -> DayRecord {
    DayRecord {
        record_type: "day",
        day_timestamp: day.timestamp(),
        date: day.short_day(),
        commit_count: day.commits().len(),
    }
}

pub fn commit_record(commit: &CommitInfo, config: &Config) -> CommitRecord {
    let who = config.resolve(&commit.author_email, &commit.author_name);
    CommitRecord {
        record_type: "commit",
        id: commit.id.to_string(),
        timestamp: commit.timestamp,
        day_of_week: weekday_name(commit.timestamp),
        hour_of_day: hour_of_day(commit.timestamp),
        author_name: who.name,
        author_email: who.email,
        message: commit.summary.clone(),
    }
}

/// JSON-lines report writer shared by concurrent workers. Everything
/// belonging to one day (or one snapshot) is written under a single lock so
/// records from different days never interleave; no ordering across days is
/// promised.
pub struct JsonLinesReport {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesReport {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn report_snapshot(&self, snapshot: &TreeSnapshot, config: &Config) -> Result<()> {
        let mut out = self.lock();
        write_line(&mut **out, &tree_record(snapshot, config, None))?;
        for file in &snapshot.files {
            write_line(&mut **out, &file_record(file, config, None))?;
        }
        Ok(())
    }

    /// Emit one history day: the day header, its commits, then the
    /// snapshot taken at the day's newest commit.
    pub fn report_day(
        &self,
        day: &CommitDay,
        snapshot: &TreeSnapshot,
        config: &Config,
    ) -> Result<()> {
        let day_timestamp = Some(day.timestamp());
        let mut out = self.lock();

        write_line(&mut **out, &day_record(day))?;
        for commit in day.commits() {
            write_line(&mut **out, &commit_record(commit, config))?;
        }
        write_line(&mut **out, &tree_record(snapshot, config, day_timestamp))?;
        for file in &snapshot.files {
            write_line(&mut **out, &file_record(file, config, day_timestamp))?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.lock().flush()?;
        Ok(())
    }
}

fn write_line<T: serde::Serialize>(out: &mut dyn Write, record: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    Ok(())
}
