//! Adaptive protocol for west-estuary baseflow and environmental water supply.
//!
//! A fixed chain of rules decides each day whether the scheduled baseflow
//! passes unchanged, is capped, or is withheld, and how much environmental
//! water supply the estuary receives.
pub mod chain;
pub mod rules;
pub mod salinity;

pub use chain::{evaluate, ProtocolDay, ProtocolInputs};
pub use salinity::SalinityOutlook;
