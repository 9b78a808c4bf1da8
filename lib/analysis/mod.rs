//! Data-flow analyses implemented over the IR

pub mod fixed_point;

mod bit_set;
mod dataflow_result;
mod dead_code_elimination;
mod def_use;
mod entity_index;
mod faint_variables;
mod live_variables;
mod reaching_definitions;

pub use self::bit_set::BitSet;
pub use self::dataflow_result::DataflowResult;
pub use self::dead_code_elimination::{dead_code_elimination, dead_code_elimination_with, eliminate};
pub use self::def_use::def_use;
pub use self::entity_index::{Entity, EntityIndex};
pub use self::faint_variables::{faint_variables, faint_variables_with};
pub use self::live_variables::{live_variables, live_variables_with};
pub use self::reaching_definitions::{reaching_definitions, reaching_definitions_with};
