//! The growing fixpoint: phase-step bodies run by `Solver::solve`. Each
//! outer pass extracts base rules against the grown base model, solves
//! the resulting cover exactly, and feeds the chosen links back.
//!
//! The loop reaches *a* fixpoint of the rule set; it is not claimed to
//! reach a globally optimal one.

use {
    super::{Certificate, Repair, Solver},
    crate::{
        processor::Generator,
        solver::branch::Brancher,
        state::Stat,
        types::*,
    },
};

impl Solver {
    /// saturate a copy of the data into the complete graph.
    pub(super) fn step_completing(&mut self) -> MaybeInconsistent {
        self.complete = self.model.clone();
        self.sat
            .saturate(&mut self.complete, &self.rules, &mut self.state)
    }

    /// shrink the complete graph, then seed the growing base.
    pub(super) fn step_reducing(&mut self) -> MaybeInconsistent {
        if self.state.is_canceled() {
            return Err(SolverError::Canceled);
        }
        let unit = self.state.config.concrete_flip_cost;
        self.sat
            .reduce_graph(&mut self.complete, &self.model, unit);
        self.base = self.model.concrete_copy();
        self.grow_round = 0;
        Ok(())
    }

    /// one generation pass against the current base model.
    pub(super) fn step_building(&mut self) -> MaybeInconsistent {
        let conf = self.state.config.clone();
        let desc = self.state.target.clone();
        let mut gen = Generator::instantiate(&conf, &desc);
        gen.generate(
            &self.model,
            &self.base,
            &self.rules,
            &self.sat,
            &mut self.state,
        )?;
        self.matrix = gen.build_matrix(&self.model);
        Ok(())
    }

    /// Solve the current matrix exactly and grow the base by the chosen
    /// links. `Ok(true)` means the base changed and another pass is due.
    pub(super) fn step_solving(&mut self) -> Result<bool, SolverError> {
        let conf = self.state.config.clone();
        let desc = self.state.target.clone();
        let mut brancher = Brancher::instantiate(&conf, &desc);
        let (cost, rows) = brancher.solve(&mut self.matrix, &mut self.state);
        if cost.is_infinite() {
            self.certificate = Some(Certificate::NoSolution);
            return Ok(false);
        }
        let flips: Vec<LinkId> = rows.into_iter().map(LinkId).collect();
        self.grow_round += 1;
        self.state[Stat::GrowPass] += 1;
        self.state
            .set_progress(self.grow_round as f64 / conf.grow_iteration_max as f64);
        let changed = self.base.add_all(&flips);
        self.certificate = Some(Certificate::Repaired(Repair { flips, cost }));
        Ok(changed && self.grow_round < conf.grow_iteration_max)
    }
}
