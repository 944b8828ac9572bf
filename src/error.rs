use thiserror::Error;

use crate::Position;

/// The two ways running a piece of source code can fail. Everything
/// user-facing has been reported by the time one of these reaches the caller;
/// the variants exist so the driver can pick an exit code.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more compilation errors happened
    #[error("Compilation error(s) occured.")]
    Compile,
    /// A runtime error happened
    #[error("Runtime error(s) occured.")]
    Runtime,
}

/// Error while scanning Lox source code
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// A string literal is unterminated
    #[error("{0} error: unterminated string")]
    UnterminatedString(Position),
    /// Invalid character
    #[error("{0} error: unexpected character '{1}'")]
    UnexpectedCharacter(Position, char),
}

impl ScanError {
    /// The position the error was found at.
    pub fn pos(&self) -> Position {
        match self {
            Self::UnterminatedString(pos) | Self::UnexpectedCharacter(pos, _) => *pos,
        }
    }
}

/// Error found while parsing and compiling Lox source code
#[derive(Debug, Error)]
pub enum ParseError {
    /// The token stream ended where more input was required
    #[error("{0} error at end: {1}")]
    UnexpectedEof(Position, String),
    /// A token that does not fit the grammar at this point
    #[error("{pos} error at '{lexeme}': {msg}")]
    UnexpectedToken {
        /// Where the offending token sits
        pos: Position,
        /// The offending token's text
        lexeme: String,
        /// What was expected instead
        msg: String,
    },
    /// The scanner could not produce a token
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Virtual machine errors. Display forms are the messages printed above the
/// stack trace.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The call-frame stack is exhausted
    #[error("stack overflow")]
    StackOverflow,
    /// Calling a value that is neither a function nor a class
    #[error("can only call functions and classes")]
    InvalidCall,
    /// Calling a function with the wrong number of arguments
    #[error("expected {expected} arguments but got {got}")]
    ArityMismatch {
        /// The callee's declared parameter count
        expected: u8,
        /// The number of arguments on the stack
        got: u8,
    },
    /// Reading or writing a global that was never defined
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    /// Reading a property the instance and its class do not have
    #[error("undefined property '{0}'")]
    UndefinedProperty(String),
    /// Reading a property of a value that is not an instance
    #[error("only instances have properties")]
    NonInstanceProperty,
    /// Writing a field of a value that is not an instance
    #[error("only instances have fields")]
    NonInstanceField,
    /// Invoking a method on a value that is not an instance
    #[error("only instances have methods")]
    NonInstanceMethod,
    /// Inheriting from a value that is not a class
    #[error("superclass must be a class")]
    InvalidSuperclass,
    /// A unary numeric operation on a non-number
    #[error("operand must be a number")]
    NonNumericOperand,
    /// A binary numeric operation on non-numbers
    #[error("operands must be numbers")]
    NonNumericOperands,
    /// Operator `+` on operands that are neither two numbers nor two strings
    #[error("operands must be two numbers or two strings")]
    InvalidAddOperands,
}
