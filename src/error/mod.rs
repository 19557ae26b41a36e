//! Error module for Topictree
//!
//! The trie operations themselves never fail: unknown paths are no-ops and
//! non-matching patterns resolve to the empty set. Errors only come from the
//! validated registration boundary and from configuration handling.

use thiserror::Error;
use std::fmt;

/// Numeric error code, grouped by category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Validation errors (0x0001-0x0100)
    ReservedSegment = 0x0001,
    EmptySegment = 0x0002,
    DepthExceeded = 0x0003,

    // System errors (0x0101-0x0200)
    ConfigInvalid = 0x0101,
}

impl ErrorCode {
    /// Get the error code as a u16
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the error code category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            0x0001..=0x0100 => ErrorCategory::Validation,
            0x0101..=0x0200 => ErrorCategory::System,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Try to convert a u16 to an ErrorCode
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::ReservedSegment),
            0x0002 => Some(Self::EmptySegment),
            0x0003 => Some(Self::DepthExceeded),
            0x0101 => Some(Self::ConfigInvalid),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReservedSegment => "RESERVED_SEGMENT",
            Self::EmptySegment => "EMPTY_SEGMENT",
            Self::DepthExceeded => "DEPTH_EXCEEDED",
            Self::ConfigInvalid => "CONFIG_INVALID",
        };
        write!(f, "{} (0x{:04X})", name, self.as_u16())
    }
}

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    System,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "Validation"),
            Self::System => write!(f, "System"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Main error type for Topictree
#[derive(Error, Debug)]
pub enum TopicTreeError {
    #[error("{code}: {message}")]
    Standard {
        code: ErrorCode,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TopicTreeError {
    /// Create a new standard error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Standard {
            code,
            message: message.into(),
        }
    }

    pub fn reserved_segment(segment: &str, position: usize) -> Self {
        Self::new(
            ErrorCode::ReservedSegment,
            format!("segment '{}' at position {} is a wildcard token", segment, position),
        )
    }

    pub fn empty_segment(position: usize) -> Self {
        Self::new(
            ErrorCode::EmptySegment,
            format!("segment at position {} is empty", position),
        )
    }

    pub fn depth_exceeded(depth: usize, max_depth: usize) -> Self {
        Self::new(
            ErrorCode::DepthExceeded,
            format!("path has {} segments, at most {} allowed", depth, max_depth),
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Get the error code if this is a standard error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Standard { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for Topictree operations
pub type Result<T> = std::result::Result<T, TopicTreeError>;
