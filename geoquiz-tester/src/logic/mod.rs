pub mod fetcher;
pub mod policy;
pub mod reports;
pub mod simulation;

pub use fetcher::FileFetcher;
pub use policy::PolicyKind;
pub use reports::RunReport;
pub use simulation::{ModePlan, RunResult, simulate_seeds};
