use git2::Oid;
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use std::thread;
use stockline::model::CommitInfo;
use stockline::timeline::CommitTimeline;
use stockline::util::SECONDS_PER_DAY;

fn commit(serial: u32, timestamp: i64) -> CommitInfo {
    CommitInfo {
        id: Oid::from_str(&format!("{serial:040x}")).unwrap(),
        timestamp,
        author_name: "Tester".to_string(),
        author_email: "tester@example.com".to_string(),
        summary: format!("commit {serial}"),
    }
}

#[test]
fn buckets_commits_into_ascending_utc_days() {
    let day0 = SECONDS_PER_DAY * 18_000;
    let day1 = day0 + SECONDS_PER_DAY;

    // Deliberately out of order within and across days.
    let timeline = CommitTimeline::new(vec![
        commit(1, day1 + 30),
        commit(2, day0 + 5_000),
        commit(3, day0 + 10),
        commit(4, day0 + 86_399),
    ]);

    assert_eq!(2, timeline.days());
    assert_eq!(4, timeline.commits());

    let first = timeline.claim().expect("first day");
    assert_eq!(day0, first.day().timestamp());
    let times: Vec<i64> = first.day().commits().iter().map(|c| c.timestamp).collect();
    assert_eq!(vec![day0 + 10, day0 + 5_000, day0 + 86_399], times);
    assert_eq!(day0 + 86_399, first.day().newest().unwrap().timestamp);

    let second = timeline.claim().expect("second day");
    assert_eq!(day1, second.day().timestamp());
    assert!(timeline.claim().is_none());

    timeline.release(second);
    timeline.release(first);
    assert!(timeline.is_drained());
}

#[test]
fn concurrent_claims_are_exhaustive_and_exactly_once() {
    let day0 = SECONDS_PER_DAY * 18_000;
    let commits: Vec<CommitInfo> = (0..40)
        .map(|i| commit(i, day0 + i as i64 * SECONDS_PER_DAY))
        .collect();
    let timeline = CommitTimeline::new(commits);
    assert_eq!(40, timeline.days());

    let claimed = Mutex::new(Vec::new());
    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                while let Some(day) = timeline.claim() {
                    claimed.lock().unwrap().push(day.day().timestamp());
                    timeline.release(day);
                }
            });
        }
    });

    let mut seen = claimed.into_inner().unwrap();
    seen.sort_unstable();
    let expected: Vec<i64> = (0..40).map(|i| day0 + i * SECONDS_PER_DAY).collect();
    assert_eq!(expected, seen);
    assert!(timeline.is_drained());
}

#[test]
fn out_of_order_release_frees_only_contiguous_prefix() {
    let day0 = SECONDS_PER_DAY * 18_000;
    let commits: Vec<CommitInfo> = (0..5)
        .map(|i| commit(i, day0 + i as i64 * SECONDS_PER_DAY))
        .collect();
    let timeline = CommitTimeline::new(commits);

    let mut claims = Vec::new();
    while let Some(day) = timeline.claim() {
        claims.push(day);
    }
    assert_eq!(5, claims.len());

    // Release days 4, 2, 0, 1, 3 and watch the reclaim cursor only ever
    // sweep over a contiguous prefix.
    let order = [4usize, 2, 0, 1, 3];
    let expected_reclaimed = [0usize, 0, 1, 3, 5];
    let mut by_index: Vec<Option<_>> = claims.into_iter().map(Some).collect();
    for (release_index, expected) in order.into_iter().zip(expected_reclaimed) {
        let day = by_index[release_index].take().expect("claimed once");
        timeline.release(day);
        assert_eq!(expected, timeline.reclaimed_days());
    }
    assert!(timeline.is_drained());
}

#[test]
fn same_day_commits_share_one_bucket() {
    let day0 = SECONDS_PER_DAY * 18_000;
    let timeline = CommitTimeline::new(vec![
        commit(1, day0),
        commit(2, day0 + 1),
        commit(3, day0 + 2),
    ]);
    assert_eq!(1, timeline.days());
    assert_eq!(3, timeline.commits());
}

#[test]
fn empty_timeline_is_drained_immediately() {
    let timeline = CommitTimeline::new(Vec::new());
    assert_eq!(0, timeline.days());
    assert!(timeline.claim().is_none());
    assert!(timeline.is_drained());
}
