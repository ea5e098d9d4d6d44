/// Expansions granted per atom of the two graphs, per unit of weight.
pub const COVERAGE: usize = 250;

/// Cooperative iteration budget for the exhaustive searches.
///
/// Searches call [`increment`](Self::increment) on every recursive entry and
/// stop once [`is_max_iteration`](Self::is_max_iteration) reports the budget
/// is spent. The result they return is then best-effort: possibly not
/// maximal, never wrong.
#[derive(Debug, Clone)]
pub struct IterationManager {
    counter: usize,
    limit: usize,
}

impl IterationManager {
    pub fn new(limit: usize) -> Self {
        Self { counter: 0, limit }
    }

    /// Budget of `COVERAGE * weight * (source_count + target_count)`.
    pub fn for_graphs(source_count: usize, target_count: usize, weight: usize) -> Self {
        let limit = COVERAGE
            .saturating_mul(weight)
            .saturating_mul(source_count + target_count);
        Self::new(limit)
    }

    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn increment(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }

    pub fn is_max_iteration(&self) -> bool {
        self.counter > self.limit
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
