//! Fixpoint forward chaining: compute the complete graph of derivable
//! links and, per link, the unifying premise set used for pruning.

use {
    crate::{
        clause::{AssignFilter, Clause},
        model::Model,
        state::{Stat, State},
        types::*,
    },
    std::collections::{BTreeMap, BTreeSet},
};

/// The minimal set of original weighted links sufficient to derive a
/// link. A link already explainable by immutable facts must hold and
/// leaves the optimization entirely.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Premises {
    MustHold,
    Units(BTreeSet<LinkId>),
}

impl Premises {
    /// intersect two explanations; `MustHold` absorbs.
    fn meet(&self, other: &Premises) -> Premises {
        match (self, other) {
            (Premises::MustHold, _) | (_, Premises::MustHold) => Premises::MustHold,
            (Premises::Units(a), Premises::Units(b)) => {
                let i: BTreeSet<LinkId> = a.intersection(b).copied().collect();
                if i.is_empty() {
                    Premises::MustHold
                } else {
                    Premises::Units(i)
                }
            }
        }
    }
}

/// The saturation engine and its unifying-premise index.
#[derive(Clone, Debug, Default)]
pub struct Saturator {
    /// per derived link, its unifying premise set
    pub derived: BTreeMap<LinkId, Premises>,
    pub num_passes: usize,
}

impl Instantiate for Saturator {
    fn instantiate(_conf: &Config, _desc: &ModelDescription) -> Self {
        Saturator::default()
    }
}

impl Saturator {
    /// Close `model` under forward application of `rules` until a full
    /// pass adds nothing. Derivations targeting impossible cells are
    /// dropped, unless the derivation is itself inescapable, which is a
    /// fatal contradiction.
    pub fn saturate(
        &mut self,
        model: &mut Model,
        rules: &[Clause],
        state: &mut State,
    ) -> MaybeInconsistent {
        loop {
            if state.is_canceled() {
                return Err(SolverError::Canceled);
            }
            self.num_passes += 1;
            state[Stat::SaturationPass] += 1;
            let mut additions: Vec<(LinkId, Premises)> = Vec::new();
            for rule in rules.iter() {
                rule.for_each_assignment(model, AssignFilter::PremisesHold, |ground| {
                    for concl in ground.conclusions.iter() {
                        let Some(l) = concl.link(model) else {
                            // an unresolved functional conclusion never
                            // drives saturation (documented partial
                            // feature)
                            continue;
                        };
                        if model.is_connected(l) {
                            continue;
                        }
                        let just = self.unify(model, &ground.premise_links(model));
                        additions.push((l, just));
                    }
                });
            }
            let mut dirty = false;
            for (l, just) in additions {
                if model.is_impossible(l) {
                    if just == Premises::MustHold {
                        return Err(SolverError::Contradiction(l));
                    }
                    continue;
                }
                let entry = match self.derived.remove(&l) {
                    Some(old) => old.meet(&just),
                    None => just,
                };
                self.derived.insert(l, entry);
                if model.add(l) {
                    model.mark_derived(l);
                    state[Stat::DerivedLink] += 1;
                    dirty = true;
                }
            }
            if !dirty {
                return Ok(());
            }
        }
    }

    /// fold an instance's premise links into one explanation in terms of
    /// original weighted links.
    fn unify(&self, model: &Model, premise_links: &[LinkId]) -> Premises {
        let mut units: BTreeSet<LinkId> = BTreeSet::new();
        for p in premise_links.iter() {
            match self.derived.get(p) {
                Some(Premises::MustHold) => (),
                Some(Premises::Units(s)) => units.extend(s.iter().copied()),
                None => {
                    if !model.is_forced(*p) {
                        units.insert(*p);
                    }
                }
            }
        }
        if units.is_empty() {
            Premises::MustHold
        } else {
            Premises::Units(units)
        }
    }

    /// Drop from the complete graph every derived link whose direct
    /// price beats its cheapest unifying-premise explanation, keeping
    /// the complete graph minimal.
    pub fn reduce_graph(&mut self, model: &mut Model, data: &Model, concrete_unit: f64) {
        let dropped: Vec<LinkId> = self
            .derived
            .iter()
            .filter_map(|(l, just)| match just {
                Premises::MustHold => None,
                Premises::Units(ps) => {
                    let direct = data.flip_cost(*l, concrete_unit);
                    let explain = ps
                        .iter()
                        .map(|p| data.flip_cost(*p, concrete_unit))
                        .fold(f64::INFINITY, f64::min);
                    (direct < explain).then_some(*l)
                }
            })
            .collect();
        for l in dropped {
            model.remove(l);
            self.derived.remove(&l);
        }
    }
}
