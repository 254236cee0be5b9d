use std::fmt;

/// Machine-readable error codes surfaced by the API and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    NotFound,
    DuplicateName,
    EntityInUse,
    InvalidName,
    InvalidColour,
    InvalidValue,
    CsvParseError,
    StorageError,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::NotFound => "E2001",
            Self::DuplicateName => "E2002",
            Self::EntityInUse => "E2003",
            Self::InvalidName => "E2004",
            Self::InvalidColour => "E2005",
            Self::InvalidValue => "E2006",
            Self::CsvParseError => "E3001",
            Self::StorageError => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in cellar.toml and retry."),
            Self::NotFound => None,
            Self::DuplicateName => Some("Pick a different name or reuse the existing entry."),
            Self::EntityInUse => {
                Some("Delete or reassign the dependent rows before removing this entry.")
            }
            Self::InvalidName => Some("Names must be non-empty after trimming whitespace."),
            Self::InvalidColour => {
                Some("Use one of: red, white, rosé, sparkling, other.")
            }
            Self::InvalidValue => None,
            Self::CsvParseError => Some("Check the CSV header and per-row field count."),
            Self::StorageError => Some("Check the database file and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store-level error taxonomy.
///
/// Every variant maps onto an [`ErrorCode`] so that callers (HTTP handlers,
/// CLI renderers) can branch without string matching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} named '{name}' already exists")]
    DuplicateName { entity: &'static str, name: String },

    #[error("{entity} '{id}' is referenced by {dependents}")]
    InUse {
        entity: &'static str,
        id: String,
        dependents: &'static str,
    },

    #[error("{entity} name must not be empty")]
    EmptyName { entity: &'static str },

    #[error("unknown wine colour '{0}': expected one of red, white, rosé, sparkling, other")]
    InvalidColour(String),

    #[error("{0}")]
    InvalidValue(String),

    #[error("config parse error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    /// The machine code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::DuplicateName { .. } => ErrorCode::DuplicateName,
            Self::InUse { .. } => ErrorCode::EntityInUse,
            Self::EmptyName { .. } => ErrorCode::InvalidName,
            Self::InvalidColour(_) => ErrorCode::InvalidColour,
            Self::InvalidValue(_) => ErrorCode::InvalidValue,
            Self::Config(_) => ErrorCode::ConfigParseError,
            Self::Csv(_) => ErrorCode::CsvParseError,
            Self::Sqlite(_) => ErrorCode::StorageError,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::{Error, ErrorCode};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::NotFound,
            ErrorCode::DuplicateName,
            ErrorCode::EntityInUse,
            ErrorCode::InvalidName,
            ErrorCode::InvalidColour,
            ErrorCode::InvalidValue,
            ErrorCode::CsvParseError,
            ErrorCode::StorageError,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::EntityInUse.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn error_maps_to_expected_code() {
        let err = Error::NotFound {
            entity: "bottle",
            id: "abc".into(),
        };
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "bottle 'abc' not found");
    }
}
