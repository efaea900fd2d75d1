mod engine;
mod tables;
mod types;

pub use engine::{FixedReturns, ReturnSource, project, project_with_returns};
pub use tables::bracket_ceiling;
pub use types::{
    FilingProfile, FilingStatus, OneTimeExpense, RothConversion, SimulationInputs,
    SimulationResult, SpouseProfile, YearRecord,
};
