//! lakeops: daily stage, storage and regulatory-release simulation for a
//! regulated lake and its estuaries.
//!
//! The engine threads a zone classifier, a release-level decision tree and
//! an adaptive protocol for west-estuary flows into a daily water balance.
//! Entry point: [`run::simulate`].
pub mod config;
pub mod dectree;
pub mod error;
pub mod hypsometry;
pub mod inputs;
pub mod metrics;
pub mod outlets;
pub mod outputs;
pub mod precompute;
pub mod protocol;
pub mod run;
pub mod scenario;
pub mod state;
pub mod tables;
pub mod traits;
pub mod zones;

pub use config::SimulationConfig;
pub use error::{SimError, SimResult};
pub use inputs::SimulationInputs;
pub use outputs::{SimulationDay, SimulationDaySeries, SimulationResult};
pub use run::simulate;
pub use tables::ReferenceTables;
