/// Tunables for one induction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairConfig {
    /// Upper bound on the number of rules created. `None` runs to convergence.
    pub max_iterations: Option<usize>,
}

impl RepairConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops induction after `max` rules, leaving the rest of R0 uncompressed.
    ///
    /// The resulting grammar is still lossless.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub(crate) fn allows(&self, iterations: usize) -> bool {
        self.max_iterations.map_or(true, |max| iterations < max)
    }
}
