use crate::model::CommitInfo;
use crate::util::{day_bucket, long_date, short_day};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// All commits whose timestamps fall on one UTC calendar day, ascending by
/// commit time. Immutable once the timeline is built.
#[derive(Debug)]
pub struct CommitDay {
    timestamp: i64,
    commits: Vec<CommitInfo>,
}

impl CommitDay {
    fn new(timestamp: i64, mut commits: Vec<CommitInfo>) -> Self {
        commits.sort_by_key(|commit| commit.timestamp);
        Self { timestamp, commits }
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn commits(&self) -> &[CommitInfo] {
        &self.commits
    }

    /// Chronologically last commit of the day; the day's snapshot is taken
    /// against this commit's tree.
    pub fn newest(&self) -> Option<&CommitInfo> {
        self.commits.last()
    }

    pub fn date(&self) -> String {
        long_date(self.timestamp)
    }

    pub fn short_day(&self) -> String {
        short_day(self.timestamp)
    }
}

/// A day handed out by `claim`. Returning it through `release` is what lets
/// the timeline reclaim memory; each claimed day must be released exactly
/// once, even on cancellation.
pub struct ClaimedDay {
    index: usize,
    day: Arc<CommitDay>,
}

impl ClaimedDay {
    pub fn day(&self) -> &CommitDay {
        &self.day
    }
}

struct TimelineState {
    days: Vec<Option<Arc<CommitDay>>>,
    released: Vec<bool>,
    claim: usize,
    reclaim: usize,
}

/// Ordered sequence of commit days with a claim/release protocol for
/// concurrent consumption.
///
/// Claims are granted in ascending day order (oldest first), each day to
/// exactly one caller. Releases may arrive in any order; storage is only
/// reclaimed for the contiguous released prefix, so memory stays bounded by
/// the number of in-flight days rather than the whole history.
pub struct CommitTimeline {
    state: Mutex<TimelineState>,
    day_count: usize,
    commit_count: usize,
}

impl CommitTimeline {
    /// Bucket an already-deduplicated commit set into calendar days.
    pub fn new(commits: Vec<CommitInfo>) -> Self {
        let commit_count = commits.len();

        let mut buckets: BTreeMap<i64, Vec<CommitInfo>> = BTreeMap::new();
        for commit in commits {
            buckets
                .entry(day_bucket(commit.timestamp))
                .or_default()
                .push(commit);
        }

        let days: Vec<Option<Arc<CommitDay>>> = buckets
            .into_iter()
            .map(|(timestamp, commits)| Some(Arc::new(CommitDay::new(timestamp, commits))))
            .collect();
        let day_count = days.len();

        Self {
            state: Mutex::new(TimelineState {
                released: vec![false; day_count],
                days,
                claim: 0,
                reclaim: 0,
            }),
            day_count,
            commit_count,
        }
    }

    pub fn days(&self) -> usize {
        self.day_count
    }

    pub fn commits(&self) -> usize {
        self.commit_count
    }

    fn lock(&self) -> MutexGuard<'_, TimelineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Hand out the next unclaimed day, or `None` once the sequence is
    /// exhausted. Safe to call from any number of threads.
    pub fn claim(&self) -> Option<ClaimedDay> {
        let mut state = self.lock();
        if state.claim >= state.days.len() {
            return None;
        }
        let index = state.claim;
        state.claim += 1;
        state.days[index]
            .clone()
            .map(|day| ClaimedDay { index, day })
    }

    /// Mark a claimed day finished and reclaim every day in the contiguous
    /// released prefix. A day released out of order stays resident until
    /// all earlier days are released too.
    pub fn release(&self, claimed: ClaimedDay) {
        let ClaimedDay { index, day } = claimed;
        drop(day);

        let mut state = self.lock();
        state.released[index] = true;
        while state.reclaim < state.days.len() && state.released[state.reclaim] {
            let tombstone = state.reclaim;
            state.days[tombstone] = None;
            state.reclaim += 1;
        }
    }

    /// Number of days already reclaimed; always a contiguous prefix.
    pub fn reclaimed_days(&self) -> usize {
        self.lock().reclaim
    }

    pub fn is_drained(&self) -> bool {
        let state = self.lock();
        state.claim >= state.days.len() && state.reclaim >= state.days.len()
    }
}
