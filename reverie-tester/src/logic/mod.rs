pub mod policy;
pub mod reports;
pub mod runner;

pub use policy::Strategy;
pub use runner::{RunPlan, Runner, ScenarioResult};
