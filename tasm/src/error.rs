use crate::parser::Rule;
use pest::error::Error as PestError;
use std::fmt;

#[derive(Debug)]
pub enum ParseError {
    Grammar(Box<PestError<Rule>>),
    Number(String, usize),
}

impl From<PestError<Rule>> for ParseError {
    fn from(err: PestError<Rule>) -> ParseError {
        ParseError::Grammar(Box::new(err))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Grammar(err) => write!(f, "{}", err),
            ParseError::Number(text, line) => {
                write!(f, "line {}: invalid number literal '{}'", line, text)
            }
        }
    }
}

#[derive(Debug)]
pub enum AssembleError {
    UnknownMnemonic(String, usize),
    UndefinedLabel(String, usize),
    DuplicateLabel(String, usize),
    OperandOutOfRange(i64, usize),
    ProgramTooLarge(usize),
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssembleError::UnknownMnemonic(name, line) => {
                write!(f, "line {}: unknown instruction '{}'", line, name)
            }
            AssembleError::UndefinedLabel(name, line) => {
                write!(f, "line {}: undefined label '{}'", line, name)
            }
            AssembleError::DuplicateLabel(name, line) => {
                write!(f, "line {}: label '{}' already defined", line, name)
            }
            AssembleError::OperandOutOfRange(value, line) => {
                write!(f, "line {}: operand {} out of range", line, value)
            }
            AssembleError::ProgramTooLarge(size) => {
                write!(f, "assembled program of {} bytes exceeds 64 KiB", size)
            }
        }
    }
}

#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Assemble(AssembleError),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<AssembleError> for Error {
    fn from(err: AssembleError) -> Error {
        Error::Assemble(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Assemble(err) => write!(f, "{}", err),
        }
    }
}

impl Error {
    /// True for the one error that still leaves a best-effort image behind:
    /// every patch location is resolved except the ones left unresolved.
    pub fn is_undefined_label(&self) -> bool {
        matches!(self, Error::Assemble(AssembleError::UndefinedLabel(..)))
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
