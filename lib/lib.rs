//! Whole-function dataflow analysis over a small CFG IR.
//!
//! The crate provides a direction-generic bit-vector dataflow engine, three
//! analyses built on it (reaching definitions, live variables and faint
//! variables), and a dead-code elimination pass driven by faint variables.

extern crate falcon;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate serde;

pub mod analysis;
pub mod config;
pub mod ir;

pub use config::{Config, NoExitBlock};

pub mod error {
    error_chain! {
        types {
            Error, ErrorKind, ResultExt, Result;
        }

        foreign_links {
            Falcon(::falcon::error::Error);
        }

        errors {
            NoEntry {
                description("Function has no entry block")
                display("Function has no entry block")
            }
            NoExitBlock(function: String) {
                description("Backward analysis over a function with no exit block")
                display("Function \"{}\" has no reachable exit block", function)
            }
            NonMonotonic(block: usize) {
                description("A transfer function produced a non-monotonic state")
                display("State for block 0x{:x} moved against the lattice order", block)
            }
            StaleReference(m: String) {
                description("An instruction is still referenced and cannot be removed")
                display("Stale reference: {}", m)
            }
            InvalidInstruction(m: String) {
                description("Invalid instruction handle")
                display("Invalid instruction: {}", m)
            }
            InvalidBlock(index: usize) {
                description("Invalid block index")
                display("No block with index 0x{:x}", index)
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
