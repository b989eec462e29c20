//! Minimum-cost repair of weighted, inconsistent binary relations
//! against a declared rule set, via saturation, violated-rule column
//! generation, an LP-relaxation-guided branch-and-bound, and a growing
//! outer fixpoint.
//!
//! ```
//! use remend::{config::Config, model::Weight, solver::{Certificate, Solver}};
//!
//! let script = "r = \"related\" -1.0\nr(0,1); r(1,2) -> r(0,2)";
//! let mut solver =
//!     Solver::try_from((&Config::default(), script, &["a", "b", "c"] as &[&str])).unwrap();
//! let g = solver.model.graph_id("r").unwrap();
//! solver.model.set_weight(g, 0, 1, Weight { log_on: -0.1, log_off: -4.0 });
//! solver.model.set_weight(g, 1, 2, Weight { log_on: -0.1, log_off: -4.0 });
//! match solver.start() {
//!     Ok(Certificate::Repaired(repair)) => {
//!         assert!(!repair.flips.is_empty());
//!     }
//!     Ok(Certificate::NoSolution) => panic!("over-constrained"),
//!     Err(e) => panic!("{e}"),
//! }
//! ```
/// Clause
pub mod clause;
/// parameters
pub mod config;
/// transactional sparse matrix
pub mod matrix;
/// relational model
pub mod model;
/// saturation and column generation
pub mod processor;
/// LP relaxation
pub mod simplex;
/// struct Solver
pub mod solver;
/// progress and statistics
pub mod state;
/// plumbing layer
pub mod types;
