//! Release-level decision tree.
//!
//! Each simulated day the tree scores the Zone D, C and B branches from
//! tributary, stage, seasonal and multi-seasonal indicators. The branch of
//! the zone the lake is in resolves, through a release-code table, to a
//! release level that then persists through pulse days and is capped by a
//! stage-rise ceiling.
pub mod codes;
pub mod indicators;
pub mod release;

pub use codes::{ReleaseCodeTable, ReleaseCodeTables};
pub use indicators::{branch_codes, composite, BranchCodes, DecisionInputs};
pub use release::{dec_tree_level, pulse_day, release_level, BranchDeltas, ReleaseLevel};
