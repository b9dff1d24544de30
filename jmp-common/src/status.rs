//! Process status codes reported by the `jmp` driver.

use std::fmt;

/// Exit status of a processing run.
///
/// The numeric values are part of the tool's external contract and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitStatus {
    Success = 0,
    /// Malformed command line.
    Params = 1,
    /// The input file could not be opened or read.
    InputOpen = 2,
    /// The output file could not be opened or written.
    OutputOpen = 3,
    Syntax = 55,
    Semantics = 56,
    Redefinition = 57,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitStatus::Success => "success",
            ExitStatus::Params => "parameter error",
            ExitStatus::InputOpen => "input error",
            ExitStatus::OutputOpen => "output error",
            ExitStatus::Syntax => "syntax error",
            ExitStatus::Semantics => "semantic error",
            ExitStatus::Redefinition => "redefinition error",
        };
        write!(f, "{} ({})", name, self.code())
    }
}
