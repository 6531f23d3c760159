/// Limits applied while cleaning a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningOptions {
    /// Largest number of nullable positions a single body may have during epsilon
    /// elimination. A body with `k` nullable positions expands into up to `2^k` variants.
    pub max_nullable_positions: usize,
}

impl CleaningOptions {
    pub const DEFAULT_MAX_NULLABLE_POSITIONS: usize = 16;

    pub fn with_max_nullable_positions(mut self, limit: usize) -> Self {
        self.max_nullable_positions = limit;
        self
    }
}

impl Default for CleaningOptions {
    fn default() -> Self {
        CleaningOptions {
            max_nullable_positions: Self::DEFAULT_MAX_NULLABLE_POSITIONS,
        }
    }
}

/// Limits applied to the derivation search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of frontier entries popped before the search gives up.
    pub max_iterations: usize,
}

impl SearchOptions {
    pub const DEFAULT_MAX_ITERATIONS: usize = 5000;

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}
