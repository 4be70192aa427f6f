use crate::model::Format;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PensiveError {
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("An identical entry already exists, operation canceled")]
    DuplicateEntry,

    #[error("Name '{0}' is already in use")]
    NameConflict(String),

    #[error("Categories don't share the same format ({from} vs {to})")]
    FormatMismatch { from: Format, to: Format },

    #[error("Entry index {index} out of range ({count} entries)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Tag '{0}' is not defined")]
    TagNotFound(String),

    #[error("Category '{0}' is not defined")]
    CategoryNotFound(String),

    #[error("Entry not found under tag '{0}'")]
    EntryNotFound(String),

    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("Invalid editor buffer: {0}")]
    InvalidBuffer(String),

    #[error("Source and target are the same")]
    SameLocation,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

impl PensiveError {
    /// Conditions a command loop reports and moves past. Everything else
    /// points at the environment (disk, database file, config) rather than
    /// at the request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PensiveError::Io(_) | PensiveError::Database(_) | PensiveError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PensiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_entry_reads_as_cancellation() {
        let msg = PensiveError::DuplicateEntry.to_string();
        assert!(msg.contains("already exists"));
        assert!(msg.contains("canceled"));
    }

    #[test]
    fn infrastructure_errors_are_not_recoverable() {
        let io = PensiveError::Io(std::io::Error::other("disk"));
        assert!(!io.is_recoverable());
        assert!(PensiveError::DuplicateEntry.is_recoverable());
        assert!(PensiveError::FormatMismatch {
            from: Format::Note,
            to: Format::Titled
        }
        .is_recoverable());
    }
}
