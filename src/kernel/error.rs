use std::error::Error;
use std::fmt;

/// Failure codes reported by the PCB manager and the trap dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KernelError {
    NullArgument,
    NotFound,
    InvalidPriority,
    OutOfMemory,
    Unsupported,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelError::NullArgument => write!(f, "null argument"),
            KernelError::NotFound => write!(f, "not found in any queue"),
            KernelError::InvalidPriority => write!(f, "priority outside 0-9"),
            KernelError::OutOfMemory => write!(f, "out of PCB storage"),
            KernelError::Unsupported => write!(f, "unsupported operation"),
        }
    }
}

impl Error for KernelError {}
