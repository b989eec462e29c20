//! End-to-end repair scenarios through the public `Solver` surface.

use remend::{
    config::Config,
    model::Weight,
    solver::{Certificate, Repair, Solver},
    types::SolverError,
};

fn weight(cost: f64, on: bool) -> Weight {
    if on {
        Weight { log_on: 0.0, log_off: -cost }
    } else {
        Weight { log_on: -cost, log_off: 0.0 }
    }
}

const TRANSITIVE: &str = "\
r = \"related\" -1.0
r(0,1); r(1,2) -> r(0,2)
";

fn transitive_solver(costs: [(f64, bool); 3]) -> Solver {
    let mut solver =
        Solver::try_from((&Config::default(), TRANSITIVE, &["a", "b", "c"] as &[&str]))
            .expect("well-formed script");
    let g = solver.model.graph_id("r").expect("declared");
    for ((i, j), (cost, on)) in [(0, 1), (1, 2), (0, 2)].into_iter().zip(costs) {
        solver.model.set_weight(g, i, j, weight(cost, on));
    }
    solver
}

#[test]
fn adds_the_conclusion_when_it_is_cheapest() {
    let mut solver = transitive_solver([(5.0, true), (5.0, true), (1.0, false)]);
    let g = solver.model.graph_id("r").unwrap();
    let cert = solver.start().expect("solvable");
    assert_eq!(
        cert,
        Certificate::Repaired(Repair {
            flips: vec![solver.model.link(g, 0, 2)],
            cost: 1.0,
        })
    );
}

#[test]
fn removes_a_premise_when_that_is_cheapest() {
    let mut solver = transitive_solver([(5.0, true), (0.5, true), (9.0, false)]);
    let g = solver.model.graph_id("r").unwrap();
    let cert = solver.start().expect("solvable");
    let Certificate::Repaired(repair) = cert else {
        panic!("expected a repair");
    };
    assert_eq!(repair.flips, vec![solver.model.link(g, 1, 2)]);
    assert!((repair.cost - 0.5).abs() < 1e-6);
}

#[test]
fn reported_cost_is_the_minimum_over_both_options() {
    // sweep the conclusion price across the premium of the premises
    for concl_cost in [0.5_f64, 2.0, 7.0] {
        let mut solver =
            transitive_solver([(3.0, true), (4.0, true), (concl_cost, false)]);
        let Certificate::Repaired(repair) = solver.start().expect("solvable") else {
            panic!("expected a repair");
        };
        let want = concl_cost.min(3.0);
        assert!(
            (repair.cost - want).abs() < 1e-6,
            "conclusion at {concl_cost}: want {want}, got {}",
            repair.cost
        );
        assert_eq!(repair.flips.len(), 1);
    }
}

#[test]
fn repeated_solves_reach_the_same_fixpoint() {
    let mut solver = transitive_solver([(5.0, true), (5.0, true), (1.0, false)]);
    let first = solver.start().expect("solvable");
    let second = solver.start().expect("still solvable");
    assert_eq!(first, second);
}

#[test]
fn consistent_data_is_left_alone() {
    let mut solver = transitive_solver([(5.0, true), (5.0, true), (1.0, true)]);
    assert_eq!(
        solver.start().expect("solvable"),
        Certificate::Repaired(Repair { flips: Vec::new(), cost: 0.0 })
    );
}

#[test]
fn compulsory_facts_narrow_the_repair() {
    // both premises are compulsory, so only the conclusion can move
    let mut solver = transitive_solver([(5.0, true), (5.0, true), (9.0, false)]);
    let g = solver.model.graph_id("r").unwrap();
    solver.model.set_forced(g, 0, 1, true);
    solver.model.set_forced(g, 1, 2, true);
    let Certificate::Repaired(repair) = solver.start().expect("solvable") else {
        panic!("expected a repair");
    };
    assert_eq!(repair.flips, vec![solver.model.link(g, 0, 2)]);
}

#[test]
fn over_constrained_data_is_a_contradiction() {
    let mut solver = transitive_solver([(5.0, true), (5.0, true), (9.0, false)]);
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
fn membership_literals_guard_rules() {
    // only set members must be self-related; outsiders stay untouched
    let script = "\
r = \"related\" -1.0
small <- \"ant\", \"flea\"
in_small(0) -> r(0,0)
";
    let mut solver = Solver::try_from((
        &Config::default(),
        script,
        &["ant", "flea", "horse"] as &[&str],
    ))
    .expect("well-formed script");
    let g = solver.model.graph_id("r").unwrap();
    let Certificate::Repaired(repair) = solver.start().expect("solvable") else {
        panic!("expected a repair");
    };
    let want = vec![solver.model.link(g, 0, 0), solver.model.link(g, 1, 1)];
    assert_eq!(repair.flips, want);
    assert!((repair.cost - 2.0).abs() < 1e-6);
}

#[test]
fn equality_cells_are_never_optimizable_rows() {
    let script = "r = \"related\" -1.0\nr(0,1) -> eq(0,1)";
    let mut solver =
        Solver::try_from((&Config::default(), script, &["a", "b"] as &[&str])).expect("ok");
    let g = solver.model.graph_id("r").unwrap();
    let e = solver.model.graph_id("eq").unwrap();
    solver.model.set_weight(g, 0, 1, weight(2.0, true));
    let Certificate::Repaired(repair) = solver.start().expect("solvable") else {
        panic!("expected a repair");
    };
    // eq(0,1) can never flip, so the repair must drop r(0,1) instead
    assert_eq!(repair.flips, vec![solver.model.link(g, 0, 1)]);
    assert!(repair
        .flips
        .iter()
        .all(|l| *l != solver.model.link(e, 0, 1)));
}

#[test]
fn functional_conclusions_accept_any_witness() {
    // every connected element must point somewhere; 0 -> 1 exists, so
    // only the 1 -> ? obligation needs repair
    let script = "r = \"related\" -1.0\nr(0,1) -> r(1,2())";
    let mut solver =
        Solver::try_from((&Config::default(), script, &["a", "b", "c"] as &[&str]))
            .expect("well-formed script");
    let g = solver.model.graph_id("r").unwrap();
    solver.model.set_weight(g, 0, 1, weight(5.0, true));
    let Certificate::Repaired(repair) = solver.start().expect("solvable") else {
        panic!("expected a repair");
    };
    // cheapest: connect 1 to any element at the base price, not drop r(0,1)
    assert_eq!(repair.flips.len(), 1);
    let (fg, fi, _) = solver.model.codec().decode(repair.flips[0]);
    assert_eq!((fg, fi), (g, 1));
    assert!((repair.cost - 1.0).abs() < 1e-6);
}
