//! Building a `Solver` from a parsed rule script: graph layout and
//! relation-name resolution.
//!
//! Graph ordering is fixed so link ids are reproducible: the built-in
//! equality graph first, then one weighted graph per relation
//! declaration, then one membership graph (`in_NAME`) per set.

use {
    super::Solver,
    crate::{
        clause::{CLiteral, Clause},
        model::{Graph, Model},
        types::*,
    },
    std::collections::BTreeSet,
};

/// the built-in reflexive-equality relation.
pub const EQ_GRAPH: &str = "eq";

impl TryFrom<(&Config, &str, &[&str])> for Solver {
    type Error = SolverError;
    /// `(config, script text, domain element names)`.
    fn try_from(
        (conf, text, elements): (&Config, &str, &[&str]),
    ) -> Result<Solver, SolverError> {
        let script = Script::try_from(text)?;
        let (model, rules) = assemble(&script, elements)?;
        Ok(Solver::new(model, rules, conf, "script"))
    }
}

/// lay out the model and resolve every rule literal against it.
pub fn assemble(script: &Script, elements: &[&str]) -> Result<(Model, Vec<Clause>), SolverError> {
    let n = elements.len();
    let mut model = Model::new(n);
    model.add_graph(EQ_GRAPH, Graph::equality());
    for r in script.relations.iter() {
        model.add_graph(&r.name, Graph::weighted(n, r.density));
    }
    for s in script.sets.iter() {
        let mut members = BTreeSet::new();
        for m in s.members.iter() {
            match elements.iter().position(|e| *e == m.as_str()) {
                Some(i) => {
                    members.insert(i);
                }
                None => return Err(SolverError::UnknownElement(m.clone())),
            }
        }
        model.add_graph(&format!("in_{}", s.name), Graph::membership(members));
    }
    let mut rules = Vec::with_capacity(script.rules.len());
    for rd in script.rules.iter() {
        rules.push(Clause::new(
            resolve_literals(&model, &rd.premises)?,
            resolve_literals(&model, &rd.conclusions)?,
        ));
    }
    Ok((model, rules))
}

fn resolve_literals(model: &Model, lits: &[LitSpec]) -> Result<Vec<CLiteral>, SolverError> {
    lits.iter()
        .map(|l| {
            let g = model
                .graph_id(&l.relation)
                .ok_or_else(|| SolverError::UnknownRelation(l.relation.clone()))?;
            let term = |a: &ArgSpec| {
                if a.functional {
                    Term::Func(a.index)
                } else {
                    Term::Var(a.index)
                }
            };
            match l.args.as_slice() {
                // membership literals carry the same term on both sides
                [a] => Ok(CLiteral::new(g, term(a), term(a))),
                [a, b] => Ok(CLiteral::new(g, term(a), term(b))),
                _ => Err(SolverError::SolverBug),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "\
r = \"related\" -1.5
small <- \"ant\", \"flea\"
r(0,1); r(1,2) -> r(0,2)
in_small(0) -> r(0,0)
";

    #[test]
    fn test_graph_layout() {
        let script = Script::try_from(SCRIPT).expect("parse");
        let (model, rules) =
            assemble(&script, &["ant", "flea", "horse"]).expect("assemble");
        assert_eq!(model.num_graphs(), 3);
        assert_eq!(model.graph_id(EQ_GRAPH), Some(0));
        assert_eq!(model.graph_id("r"), Some(1));
        assert_eq!(model.graph_id("in_small"), Some(2));
        assert_eq!(rules.len(), 2);
        // membership of ant and flea only
        let g = model.graph_id("in_small").unwrap();
        assert!(model.is_connected(model.link(g, 0, 0)));
        assert!(model.is_connected(model.link(g, 1, 1)));
        assert!(!model.is_connected(model.link(g, 2, 2)));
        // the membership literal resolved to a same-term pair
        assert_eq!(rules[1].premises[0].left, rules[1].premises[0].right);
    }

    #[test]
    fn test_unknown_names_are_fatal() {
        let script = Script::try_from("r = \"x\" -1.0\ns(0,1) -> r(0,1)").expect("parse");
        assert_eq!(
            assemble(&script, &["a", "b"]).unwrap_err(),
            SolverError::UnknownRelation("s".to_string())
        );
        let script = Script::try_from("r = \"x\" -1.0\nsm <- \"zebra\"").expect("parse");
        assert_eq!(
            assemble(&script, &["a", "b"]).unwrap_err(),
            SolverError::UnknownElement("zebra".to_string())
        );
    }
}
