use crate::model::Identity;
use crate::stats::LineAgeStats;

/// One author's aggregated ownership record.
#[derive(Debug, Clone)]
pub struct Stock {
    pub identity: Identity,
    pub stats: LineAgeStats,
    /// Fraction of total lines owned. Stale until `compute_ownership` runs.
    pub share: f64,
}

impl Stock {
    fn new(identity: Identity) -> Self {
        Self {
            identity,
            stats: LineAgeStats::new(),
            share: 0.0,
        }
    }
}

/// Insertion-ordered collection of stocks, at most one per resolved email.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    entries: Vec<Stock>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the stock for an already-resolved identity, creating it on
    /// first sight. Matching is by email only; the cardinality here is
    /// authors, so a linear scan is fine.
    pub fn find_or_create(&mut self, identity: Identity) -> &mut Stock {
        let index = self
            .entries
            .iter()
            .position(|stock| stock.identity.email == identity.email);

        match index {
            Some(i) => &mut self.entries[i],
            None => {
                self.entries.push(Stock::new(identity));
                let last = self.entries.len() - 1;
                &mut self.entries[last]
            }
        }
    }

    pub fn merge(&mut self, other: &StockLedger) {
        for stock in &other.entries {
            self.find_or_create(stock.identity.clone())
                .stats
                .merge(&stock.stats);
        }
    }

    /// Recompute every entry's ownership share against `total_lines`.
    pub fn compute_ownership(&mut self, total_lines: u64) {
        for stock in &mut self.entries {
            stock.share = if total_lines == 0 {
                0.0
            } else {
                stock.stats.count_u64() as f64 / total_lines as f64
            };
        }
    }

    /// Descending by line count. The sort is stable so that equal
    /// contributors keep insertion order and reports stay reproducible.
    pub fn sort_by_contribution(&mut self) {
        self.entries
            .sort_by(|a, b| b.stats.line_count().cmp(a.stats.line_count()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stock> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a StockLedger {
    type Item = &'a Stock;
    type IntoIter = std::slice::Iter<'a, Stock>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
