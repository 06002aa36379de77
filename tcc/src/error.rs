use std::fmt;

/// A compile failure. Unlike the assembler, this compiler stops at the
/// first error instead of collecting several — matching the rest of the
/// toolchain, which treats any diagnostic as fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompileError {
    pub line: usize,
    pub message: String,
}

impl CompileError {
    pub fn new(line: usize, message: impl Into<String>) -> CompileError {
        CompileError {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CompileError {}

pub type Result<T> = std::result::Result<T, CompileError>;
