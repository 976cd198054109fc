use cellgraph_core::SheetError;
use thiserror::Error;

/// Shell error type
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Short category tag printed in front of the message
    pub fn code(&self) -> &'static str {
        match self {
            ShellError::UnknownCommand(_) | ShellError::Usage(_) => "COMMAND",
            ShellError::Sheet(e) => e.code(),
            ShellError::Io(_) => "IO",
        }
    }

    /// Whether the shell can go on to the next line after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ShellError::Io(_))
    }
}
