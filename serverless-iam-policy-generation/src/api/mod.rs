//! Policy generation API
//!
//! Entry points used by the CLI: load a descriptor and a permission table,
//! run detection and synthesis, and persist the resulting document.

mod generate_policy;
pub mod model;
mod output;

pub use generate_policy::{generate_policy, generate_policy_for_descriptor};
pub use output::{write_policy, DEFAULT_OUTPUT_PATH};
