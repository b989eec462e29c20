/// `Solver`'s parameters.
#[derive(Clone, Debug)]
pub struct Config {
    /// SIMPLEX
    /// Hard cap on pivot iterations; hitting it reports failure.
    pub simplex_iteration_max: usize,
    /// Length of the pivot history window used for cycle detection.
    pub simplex_cycle_depth: usize,
    /// Seed of the pivot tie-breaking RNG, for reproducible runs.
    pub simplex_seed: u64,
    /// GENERATION
    /// Stop resolving when a resolvent would grow beyond this many literals.
    pub resolvent_literal_limit: usize,
    /// Skip subsumption checks between clauses larger than this.
    pub subsume_literal_limit: usize,
    /// Hard cap on main-loop iterations of one generation pass.
    pub generate_loop_limit: usize,
    /// GROWING
    /// Hard cap on outer fixpoint iterations.
    pub grow_iteration_max: usize,
    /// MISC
    /// Cost assigned to flipping a concrete (unweighted) mutable cell.
    pub concrete_flip_cost: f64,
    pub progress_log: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            simplex_iteration_max: 10_000,
            simplex_cycle_depth: 12,
            simplex_seed: 42,
            resolvent_literal_limit: 30,
            subsume_literal_limit: 100,
            generate_loop_limit: 1_000_000,
            grow_iteration_max: 64,
            concrete_flip_cost: 1.0,
            progress_log: false,
        }
    }
}
