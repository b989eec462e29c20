//! Module `solver` ties everything together: the phase machine running
//! completion, reduction, generation and the exact cover search, the
//! growing outer loop, and the pause/resume control surface.

/// branch-and-bound over the transactional matrix
pub mod branch;
/// script-to-solver assembly
pub mod build;
/// the growing fixpoint phase steps
mod grow;

pub use self::{branch::Brancher, build::assemble};

use {
    crate::{
        clause::Clause,
        matrix::SparseMatrix,
        model::Model,
        processor::Saturator,
        state::{CannotPause, Phase, State},
        types::*,
    },
    std::{fmt, path::Path},
};

/// A repair: the links to flip, and what flipping them costs.
#[derive(Clone, Debug, PartialEq)]
pub struct Repair {
    pub flips: Vec<LinkId>,
    pub cost: f64,
}

/// The outcome of a completed solve.
#[derive(Clone, Debug, PartialEq)]
pub enum Certificate {
    Repaired(Repair),
    NoSolution,
}

/// The return type of `Solver::{start, resume}`.
pub type SolverResult = Result<Certificate, SolverError>;

/// The solver aggregate. Owns the data model, the rules and every
/// working structure of one solve.
#[derive(Debug)]
pub struct Solver {
    /// the weighted data under repair
    pub model: Model,
    /// the resolved rule set
    pub rules: Vec<Clause>,
    pub state: State,
    sat: Saturator,
    /// saturation output, valid from `Phase::Reducing` on
    complete: Model,
    /// the growing base, valid from `Phase::BuildingBase` on
    base: Model,
    matrix: SparseMatrix,
    grow_round: usize,
    certificate: Option<Certificate>,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Solver[{}]({})", self.state.state_message(), self.model)
    }
}

impl TryFrom<(&Config, &Path, &[&str])> for Solver {
    type Error = SolverError;
    /// `(config, script path, domain element names)`.
    fn try_from(
        (conf, path, elements): (&Config, &Path, &[&str]),
    ) -> Result<Solver, SolverError> {
        let script = Script::try_from(path)?;
        let (model, rules) = assemble(&script, elements)?;
        let name = path.to_string_lossy().to_string();
        Ok(Solver::new(model, rules, conf, &name))
    }
}

impl Solver {
    pub fn new(model: Model, rules: Vec<Clause>, conf: &Config, name: &str) -> Solver {
        let desc = model.describe(rules.len(), name);
        Solver {
            state: State::instantiate(conf, &desc),
            sat: Saturator::instantiate(conf, &desc),
            complete: Model::default(),
            base: Model::default(),
            matrix: SparseMatrix::default(),
            grow_round: 0,
            certificate: None,
            model,
            rules,
        }
    }

    /// run a solve from scratch, discarding any earlier progress.
    pub fn start(&mut self) -> SolverResult {
        self.state.phase = Phase::Idle;
        self.certificate = None;
        self.grow_round = 0;
        self.solve()
    }

    /// Request a cooperative stop. The running solve returns
    /// `Err(SolverError::Canceled)` at the next phase or loop boundary,
    /// with the phase preserved for `resume`.
    pub fn pause(&self) -> Result<(), CannotPause> {
        self.state.request_stop()
    }

    /// continue a paused solve; the interrupted phase restarts from its
    /// beginning.
    pub fn resume(&mut self) -> SolverResult {
        self.state.clear_cancel();
        self.solve()
    }

    /// the phase-machine loop.
    fn solve(&mut self) -> SolverResult {
        loop {
            if self.state.phase != Phase::Done && self.state.is_canceled() {
                return Err(SolverError::Canceled);
            }
            match self.state.phase {
                Phase::Idle => self.state.enter(Phase::Completing),
                Phase::Completing => {
                    self.step_completing()?;
                    self.state.enter(Phase::Reducing);
                }
                Phase::Reducing => {
                    self.step_reducing()?;
                    self.state.enter(Phase::BuildingBase);
                }
                Phase::BuildingBase => {
                    self.step_building()?;
                    self.state.enter(Phase::Solving);
                }
                Phase::Solving => {
                    if self.step_solving()? {
                        self.state.enter(Phase::BuildingBase);
                    } else {
                        self.state.finish();
                        self.state.flush_stats();
                    }
                }
                Phase::Stopping => return Err(SolverError::Canceled),
                Phase::Done => {
                    return self.certificate.clone().ok_or(SolverError::SolverBug);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Graph, Weight};

    fn strong(on: bool) -> Weight {
        if on {
            Weight { log_on: -0.1, log_off: -5.0 }
        } else {
            Weight { log_on: -5.0, log_off: -0.1 }
        }
    }

    const TRANSITIVE: &str = "r = \"related\" -1.0\nr(0,1); r(1,2) -> r(0,2)";

    fn broken_chain() -> Solver {
        let mut solver =
            Solver::try_from((&Config::default(), TRANSITIVE, &["a", "b", "c"] as &[&str]))
                .expect("assemble");
        let g = solver.model.graph_id("r").expect("declared");
        solver.model.set_weight(g, 0, 1, strong(true));
        solver.model.set_weight(g, 1, 2, strong(true));
        solver.model.set_weight(g, 0, 2, strong(false));
        solver
    }

    #[test]
    fn test_end_to_end_cheapest_flip() {
        let mut solver = broken_chain();
        let g = solver.model.graph_id("r").unwrap();
        // make breaking r(1,2) clearly the cheapest repair
        solver
            .model
            .set_weight(g, 1, 2, Weight { log_on: -0.4, log_off: -0.6 });
        let cert = solver.start().expect("solvable");
        let Certificate::Repaired(repair) = cert else {
            panic!("expected a repair");
        };
        assert_eq!(repair.flips, vec![solver.model.link(g, 1, 2)]);
        assert!((repair.cost - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_consistent_data_needs_no_repair() {
        let mut solver = broken_chain();
        let g = solver.model.graph_id("r").unwrap();
        solver.model.set_weight(g, 0, 2, strong(true));
        let cert = solver.start().expect("solvable");
        assert_eq!(
            cert,
            Certificate::Repaired(Repair { flips: Vec::new(), cost: 0.0 })
        );
    }

    #[test]
    fn test_forced_contradiction_is_reported() {
        let mut solver = broken_chain();
        let g = solver.model.graph_id("r").unwrap();
        solver.model.set_forced(g, 0, 1, true);
        solver.model.set_forced(g, 1, 2, true);
        solver.model.set_forced(g, 0, 2, false);
        assert!(matches!(
            solver.start(),
            Err(SolverError::Contradiction(_))
        ));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut solver = broken_chain();
        // raise the stop flag the way a controller thread would
        solver.pause().expect("idle phases pause");
        assert_eq!(solver.start(), Err(SolverError::Canceled));
        assert!(solver.state.pausable());
        let cert = solver.resume().expect("resumable");
        assert!(matches!(cert, Certificate::Repaired(_)));
    }

    #[test]
    fn test_equality_literals_never_become_rows() {
        let text = "r = \"related\" -1.0\nr(0,1) -> eq(0,1)";
        let mut solver =
            Solver::try_from((&Config::default(), text, &["a", "b"] as &[&str])).expect("ok");
        let g = solver.model.graph_id("r").unwrap();
        solver.model.set_weight(g, 0, 1, strong(true));
        let cert = solver.start().expect("solvable");
        // eq(0,1) is impossible, so the only repair is dropping r(0,1)
        let Certificate::Repaired(repair) = cert else {
            panic!("expected a repair");
        };
        assert_eq!(repair.flips, vec![solver.model.link(g, 0, 1)]);
    }
}
