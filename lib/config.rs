//! Options shared by every analysis run.

use serde::{Deserialize, Serialize};

/// What a backward analysis does when no block reachable from the entry
/// lacks successors (every path ends in an infinite loop).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum NoExitBlock {
    /// Run anyway. No block receives the boundary condition, so every `OUT`
    /// state starts at top and is only refined through the meet.
    Unconstrained,
    /// Fail with `ErrorKind::NoExitBlock`.
    Reject,
}

impl Default for NoExitBlock {
    fn default() -> NoExitBlock {
        NoExitBlock::Unconstrained
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub no_exit_block: NoExitBlock,
    /// Verify that every commit the engine makes moves in the analysis'
    /// information order.
    pub check_monotonicity: bool,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn with_no_exit_block(mut self, no_exit_block: NoExitBlock) -> Config {
        self.no_exit_block = no_exit_block;
        self
    }

    pub fn with_check_monotonicity(mut self, check_monotonicity: bool) -> Config {
        self.check_monotonicity = check_monotonicity;
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            no_exit_block: NoExitBlock::default(),
            check_monotonicity: true,
        }
    }
}
