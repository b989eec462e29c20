//! Module `processor` turns rules and data into an optimization
//! problem: saturation derives the complete graph, column generation
//! turns violated rule instances into a sparse set-cover matrix.

/// violated-rule column generation
mod generate;
/// cooled row/column reduction
mod reduce;
/// saturation and the unifying-premise index
mod saturate;

pub use self::{
    generate::{ColumnRecord, Generator},
    saturate::{Premises, Saturator},
};
