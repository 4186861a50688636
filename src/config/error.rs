use core::fmt;

use crate::board::StorageError;

/// Reason a hex import was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportError {
    /// The `CONFIG:` tag is missing
    MissingTag,
    /// The hex payload does not have the length of one encoded blob
    WrongLength { expected: usize, actual: usize },
    /// A character outside `[0-9a-fA-F]` was found
    NotHex { position: usize, found: char },
}

/// Errors raised by configuration updates, loading and importing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Numeric value outside its documented range
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    /// Interval ordering violated (blink must stay above update)
    Ordering {
        field: &'static str,
        value: u32,
        requirement: &'static str,
        limit: u32,
    },
    /// Text or digit field with the wrong shape
    Malformed {
        field: &'static str,
        expected: &'static str,
    },
    /// `channels x groups per channel` would exceed the group ceiling
    CapacityExceeded {
        channels: u32,
        groups_per_channel: u32,
        max: usize,
    },
    /// Stored or imported digest does not match the record
    CorruptConfig,
    BadImportFormat(ImportError),
    Storage(StorageError),
}

impl ConfigError {
    /// Whether this is a plain field validation failure
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::Ordering { .. } | Self::Malformed { .. }
        )
    }
}

impl From<StorageError> for ConfigError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<ImportError> for ConfigError {
    fn from(err: ImportError) -> Self {
        Self::BadImportFormat(err)
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTag => write!(f, "expected CONFIG:<hex>"),
            Self::WrongLength { expected, actual } => {
                write!(f, "expected {expected} hex characters, got {actual}")
            }
            Self::NotHex { position, found } => {
                write!(f, "invalid hex character {found:?} at position {position}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} {value} out of range [{min}..{max}]"),
            Self::Ordering {
                field,
                value,
                requirement,
                limit,
            } => write!(f, "{field} {value} must be {requirement} {limit}"),
            Self::Malformed { field, expected } => {
                write!(f, "{field} malformed, expected {expected}")
            }
            Self::CapacityExceeded {
                channels,
                groups_per_channel,
                max,
            } => write!(
                f,
                "{channels} channels x {groups_per_channel} groups exceeds {max} groups"
            ),
            Self::CorruptConfig => write!(f, "configuration digest mismatch"),
            Self::BadImportFormat(err) => write!(f, "bad import format: {err}"),
            Self::Storage(err) => write!(f, "storage: {err}"),
        }
    }
}
