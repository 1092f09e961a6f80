use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{Signed, ToPrimitive, Zero};

/// Running aggregate of line ages: line count, time-weighted sum and
/// sum-of-squares, and the first/last commit timestamps seen.
///
/// Three scalars are enough to recompute mean and variance of line age
/// against any reference instant in O(1), which keeps per-author and
/// per-file bookkeeping constant-size no matter how many lines or days are
/// folded in. Sums are kept as big integers; timestamps multiplied by line
/// counts and squared overflow 64 bits on large repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineAgeStats {
    count: BigInt,
    sum: BigInt,
    sqsum: BigInt,
    first: Option<i64>,
    last: Option<i64>,
}

impl LineAgeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in `lines` lines last touched at `timestamp`.
    pub fn add_lines(&mut self, timestamp: i64, lines: u64) {
        if lines == 0 {
            return;
        }
        let ts = BigInt::from(timestamp);
        let n = BigInt::from(lines);

        self.count += &n;
        self.sum += &ts * &n;
        self.sqsum += &ts * &ts * &n;

        self.first = Some(match self.first {
            Some(first) => first.min(timestamp),
            None => timestamp,
        });
        self.last = Some(match self.last {
            Some(last) => last.max(timestamp),
            None => timestamp,
        });
    }

    /// Combine two aggregates. Commutative and associative, so partitioned
    /// accumulators can be merged in any order.
    pub fn merge(&mut self, other: &LineAgeStats) {
        self.count += &other.count;
        self.sum += &other.sum;
        self.sqsum += &other.sqsum;

        self.first = match (self.first, other.first) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.last = match (self.last, other.last) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    pub fn line_count(&self) -> &BigInt {
        &self.count
    }

    pub fn count_u64(&self) -> u64 {
        self.count.to_u64().unwrap_or(u64::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_zero()
    }

    pub fn first_commit_timestamp(&self) -> Option<i64> {
        self.first
    }

    pub fn last_commit_timestamp(&self) -> Option<i64> {
        self.last
    }

    // With offset x over ages (x - a), (x - b), (x - c):
    //   sum'   = n*x - (a + b + c)
    //   sqsum' = (a2 + b2 + c2) - 2x(a + b + c) + n*x2
    // An offset of zero means the raw moments are wanted.
    fn shifted_sum(&self, offset: i64) -> BigInt {
        if offset != 0 {
            &self.count * BigInt::from(offset) - &self.sum
        } else {
            self.sum.clone()
        }
    }

    fn shifted_sqsum(&self, offset: i64) -> BigInt {
        if offset != 0 {
            let x = BigInt::from(offset);
            &self.sqsum - BigInt::from(2) * &x * &self.sum + &self.count * &x * &x
        } else {
            self.sqsum.clone()
        }
    }

    /// Mean line age in seconds relative to `offset` (floor division).
    pub fn mean_age(&self, offset: i64) -> BigInt {
        if self.count.is_zero() {
            BigInt::zero()
        } else {
            self.shifted_sum(offset) / &self.count
        }
    }

    /// Sample variance of line age in seconds squared relative to `offset`.
    pub fn variance_age(&self, offset: i64) -> BigInt {
        if self.count <= BigInt::from(1) {
            return BigInt::zero();
        }
        let sum = self.shifted_sum(offset);
        let sqsum = self.shifted_sqsum(offset);
        (sqsum - (&sum * &sum) / &self.count) / (&self.count - BigInt::from(1))
    }

    pub fn stddev_age(&self, offset: i64) -> BigInt {
        let variance = self.variance_age(offset);
        if variance.is_positive() {
            variance.sqrt()
        } else {
            BigInt::zero()
        }
    }
}
