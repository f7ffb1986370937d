pub mod executor;

pub use executor::{default_output_path, MoshJob, MoshOutcome};
