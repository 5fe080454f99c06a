//! Machine definitions and loading

mod data;
mod presets;
pub mod loader;

pub use data::{parse_launch_month, MachineDefinition, MachineParams};
pub use presets::base_case_machines;
pub use loader::{load_default_machines, load_machines, load_machines_from_reader, load_machines_json};
