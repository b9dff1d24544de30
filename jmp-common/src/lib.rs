//! JMP Macro Processor - Common Types
//! 
//! This crate contains the error taxonomy and the process status codes
//! shared by the processing library and the `jmp` command line driver.

pub mod error;
pub mod status;

pub use error::{JmpError, Result};
pub use status::ExitStatus;
