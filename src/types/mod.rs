//! Module `types` provides various building blocks, including
//! some common traits.

/// methods on cell flags
pub mod flags;
/// methods on link ids
pub mod link;
/// methods on rule scripts
pub mod script;
/// methods on clause terms
pub mod term;

pub use self::{flags::*, link::*, script::*, term::*};

pub use crate::config::Config;

use std::fmt;

/// API for object instantiation based on `Config` and `ModelDescription`.
/// This is implemented by *all the remend modules* except `Config` and
/// `ModelDescription` themselves.
pub trait Instantiate {
    /// make and return an object from `Config` and `ModelDescription`.
    fn instantiate(conf: &Config, desc: &ModelDescription) -> Self;
}

/// Data storage about a problem.
#[derive(Clone, Debug)]
pub struct ModelDescription {
    pub num_elements: usize,
    pub num_graphs: usize,
    pub num_rules: usize,
    pub name: String,
}

impl Default for ModelDescription {
    fn default() -> ModelDescription {
        ModelDescription {
            num_elements: 0,
            num_graphs: 0,
            num_rules: 0,
            name: "--".to_string(),
        }
    }
}

impl fmt::Display for ModelDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ModelDescription {
            num_elements: ne,
            num_graphs: ng,
            num_rules: nr,
            name,
        } = &self;
        write!(f, "Model({ne} elements, {ng} graphs, {nr} rules, {name})")
    }
}

/// Internal errors.
/// Note: returning `Result<(), a-singleton>` is identical to returning `bool`.
#[derive(Debug, PartialEq)]
pub enum SolverError {
    /// a rule line which the script reader can't digest
    ParseFailure { line: usize, reason: String },
    /// a literal names a relation which was never declared
    UnknownRelation(String),
    /// a set declaration names an element outside the domain
    UnknownElement(String),
    /// an argument is used both as a functional and a plain term
    InvalidTerm(String),
    /// a rule with no premise and no conclusion
    EmptyRule,
    /// a fact is both compulsory and declared impossible
    Contradiction(LinkId),
    /// exceptions caused by file operations
    IOError,
    /// cooperative cancellation took effect at a phase boundary
    Canceled,
    /// a state which never arises unless the solver itself is broken
    SolverBug,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A Return type used by solver functions.
pub type MaybeInconsistent = Result<(), SolverError>;
