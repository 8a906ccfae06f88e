//! Error types for spif configuration

use thiserror::Error;

/// Result type alias for spif operations
pub type Result<T> = std::result::Result<T, SpifError>;

/// Indexed register blocks checked at the configuration boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// spif input router slot
    RouterSlot,
    /// Mapper (input pipe)
    Mapper,
    /// Field within a mapper
    MapperField,
    /// Diagnostic counter
    Counter,
    /// Local core
    Core,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RouterSlot => write!(f, "router slot"),
            Self::Mapper => write!(f, "mapper"),
            Self::MapperField => write!(f, "mapper field"),
            Self::Counter => write!(f, "diagnostic counter"),
            Self::Core => write!(f, "core"),
        }
    }
}

/// Errors that can occur while configuring spif
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpifError {
    /// Routing table pool could not supply contiguous entries
    #[error("Router table allocation of {requested} entries failed")]
    RouterAllocation {
        /// Entries requested
        requested: u32,
    },

    /// Index past the end of its register block
    #[error("{kind} {index} out of range (have {limit})")]
    IndexOutOfRange {
        /// Which block
        kind: IndexKind,
        /// Requested index
        index: u32,
        /// Block size
        limit: u32,
    },

    /// Retry policy gave up before the interface accepted the packet
    #[error("Send of key {key:#010x} aborted after {attempts} attempts")]
    SendAborted {
        /// Packet key
        key: u32,
        /// Attempts made
        attempts: u64,
    },

    /// Protocol configuration is inconsistent
    #[error("Invalid protocol configuration: {reason}")]
    InvalidConfig {
        /// Reason for failure
        reason: String,
    },
}

impl SpifError {
    /// Create an index out of range error
    pub const fn out_of_range(kind: IndexKind, index: u32, limit: u32) -> Self {
        Self::IndexOutOfRange { kind, index, limit }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_block() {
        let err = SpifError::out_of_range(IndexKind::MapperField, 4, 4);
        assert_eq!(err.to_string(), "mapper field 4 out of range (have 4)");

        let err = SpifError::SendAborted { key: 0xffff_fe11, attempts: 3 };
        assert_eq!(err.to_string(), "Send of key 0xfffffe11 aborted after 3 attempts");
    }
}
