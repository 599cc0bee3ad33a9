//! IO modules - external inputs to the simulator
//!
//! - `script` - JSON simulation scripts replayed against a lot

pub mod script;

pub use script::{load_script, parse_script, ScriptRunner, Step, StepOutcome};
