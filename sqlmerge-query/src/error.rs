//! Error types for filter composition with actionable messages.
//!
//! Every composition failure is a caller input error: nothing is retried and
//! no partial statement is ever returned. Errors carry:
//! - An error code for programmatic handling
//! - The offending filter, table, and argument counts
//! - Suggestions for fixing the input
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Input errors (no filters, unknown filter, malformed filter)
//! - 2xxx: Join errors (unreachable anchor, conflicting condition)
//! - 3xxx: Argument errors (too few, too many, placeholder mismatch)
//! - 4xxx: Render errors
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use sqlmerge_query::{ComposeError, ErrorCode};
//!
//! let err = ComposeError::unknown_filter("by_country");
//! assert_eq!(err.code, ErrorCode::UnknownFilter);
//! assert!(err.to_string().contains("by_country"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for composition operations.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (1xxx)
    /// No filter names were supplied (S1001).
    NoFilters = 1001,
    /// A filter name has no registry entry (S1002).
    UnknownFilter = 1002,
    /// A filter declares no tables (S1003).
    ZeroTables = 1003,
    /// Join conditions do not line up with joined tables (S1004).
    MalformedFilter = 1004,

    // Join errors (2xxx)
    /// A filter's anchor table is not reachable (S2001).
    JoinImpossible = 2001,
    /// A table was re-joined with a different condition (S2002).
    ConflictingJoin = 2002,

    // Argument errors (3xxx)
    /// A placeholder predicate has no argument group left (S3001).
    NotEnoughArguments = 3001,
    /// Argument groups remain after all predicates were composed (S3002).
    TooManyArguments = 3002,
    /// An argument group bound to a placeholder is empty (S3003).
    EmptyArgumentGroup = 3003,
    /// Placeholder markers and group size disagree (S3004).
    PlaceholderMismatch = 3004,

    // Render errors (4xxx)
    /// A join chain element could not be rendered (S4001).
    RenderType = 4001,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,
    /// Configuration file could not be read (S7002).
    ConfigIo = 7002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NoFilters => "No filters supplied",
            Self::UnknownFilter => "Filter does not exist",
            Self::ZeroTables => "Filter declares zero tables",
            Self::MalformedFilter => "Malformed filter",
            Self::JoinImpossible => "Cannot join tables",
            Self::ConflictingJoin => "Conflicting join condition",
            Self::NotEnoughArguments => "Not enough arguments",
            Self::TooManyArguments => "Too many arguments",
            Self::EmptyArgumentGroup => "Empty argument group",
            Self::PlaceholderMismatch => "Placeholder count mismatch",
            Self::RenderType => "Join chain element is not renderable",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::ConfigIo => "Configuration file error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The filter being composed when the error occurred.
    pub filter: Option<String>,
    /// The table involved.
    pub table: Option<String>,
    /// Tables reachable in the join chain at the time of failure.
    pub available_tables: Vec<String>,
    /// Number of argument groups supplied by the caller.
    pub supplied: Option<usize>,
    /// Number of argument groups (or markers) required.
    pub required: Option<usize>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while composing filters.
#[derive(Error, Debug)]
pub struct ComposeError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.code(), self.code.description(), self.message)
    }
}

impl ComposeError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Set the filter name.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.context.filter = Some(filter.into());
        self
    }

    /// Set the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.context.table = Some(table.into());
        self
    }

    /// Record supplied and required counts.
    pub fn with_counts(mut self, supplied: usize, required: usize) -> Self {
        self.context.supplied = Some(supplied);
        self.context.required = Some(required);
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a no-filters error.
    pub fn no_filters() -> Self {
        Self::new(ErrorCode::NoFilters, "no filters passed to compose")
            .with_suggestion("Pass at least one registered filter name")
    }

    /// Create an unknown-filter error.
    pub fn unknown_filter(filter: impl Into<String>) -> Self {
        let filter = filter.into();
        Self::new(ErrorCode::UnknownFilter, format!("filter {} is not registered", filter))
            .with_filter(&filter)
            .with_suggestion(format!("Register {} before composing it", filter))
    }

    /// Create a zero-tables error.
    pub fn zero_tables(filter: impl Into<String>) -> Self {
        let filter = filter.into();
        Self::new(
            ErrorCode::ZeroTables,
            format!("filter {} contains 0 tables", filter),
        )
        .with_filter(&filter)
        .with_suggestion("Declare an anchor table with from()")
    }

    /// Create a malformed-filter error for mismatched join conditions.
    pub fn malformed_filter(filter: impl Into<String>, tables: usize, conditions: usize) -> Self {
        let filter = filter.into();
        let expected = tables.saturating_sub(1);
        Self::new(
            ErrorCode::MalformedFilter,
            format!(
                "filter {} joins {} tables but declares {} join conditions",
                filter, expected, conditions
            ),
        )
        .with_filter(&filter)
        .with_counts(conditions, expected)
        .with_help("Every table after the anchor needs exactly one join condition")
    }

    /// Create a join-impossible error.
    pub fn join_impossible<I, S>(table: impl Into<String>, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = table.into();
        let available: Vec<String> = available.into_iter().map(Into::into).collect();
        let mut err = Self::new(
            ErrorCode::JoinImpossible,
            format!(
                "cannot join table {} on unknown conditions, have tables [{}]",
                table,
                available.join(", ")
            ),
        )
        .with_table(&table)
        .with_suggestion(format!(
            "Compose a filter that introduces {} before this one",
            table
        ));
        err.context.available_tables = available;
        err
    }

    /// Create a conflicting-join error.
    pub fn conflicting_join(
        table: impl Into<String>,
        existing: impl AsRef<str>,
        incoming: impl AsRef<str>,
    ) -> Self {
        let table = table.into();
        Self::new(
            ErrorCode::ConflictingJoin,
            format!(
                "table {} is already joined on {}, refusing {}",
                table,
                existing.as_ref(),
                incoming.as_ref()
            ),
        )
        .with_table(&table)
        .with_help("Use the same join condition for a table in every filter, or set join_conflict = \"first_wins\"")
    }

    /// Create a not-enough-arguments error.
    pub fn not_enough_arguments(supplied: usize, required: usize) -> Self {
        Self::new(
            ErrorCode::NotEnoughArguments,
            format!("provided {}, needed at least {}", supplied, required),
        )
        .with_counts(supplied, required)
        .with_suggestion("Supply one argument group per placeholder predicate")
    }

    /// Create a too-many-arguments error.
    pub fn too_many_arguments(supplied: usize, consumed: usize) -> Self {
        Self::new(
            ErrorCode::TooManyArguments,
            format!("provided {}, needed {}", supplied, consumed),
        )
        .with_counts(supplied, consumed)
        .with_suggestion("Remove argument groups that no placeholder predicate consumes")
    }

    /// Create an empty-argument-group error.
    pub fn empty_argument_group(predicate: impl AsRef<str>, group: usize) -> Self {
        Self::new(
            ErrorCode::EmptyArgumentGroup,
            format!("argument group {} for predicate {} is empty", group, predicate.as_ref()),
        )
        .with_counts(0, 1)
        .with_help("An IN list needs at least one value")
    }

    /// Create a placeholder-mismatch error.
    pub fn placeholder_mismatch(predicate: impl AsRef<str>, markers: usize, values: usize) -> Self {
        Self::new(
            ErrorCode::PlaceholderMismatch,
            format!(
                "predicate {} has {} placeholders but its argument group has {} values",
                predicate.as_ref(),
                markers,
                values
            ),
        )
        .with_counts(values, markers)
        .with_help("Only IN (?) predicates expand to match the group size")
    }

    /// Create a render-type error.
    pub fn render_type(node: impl fmt::Debug) -> Self {
        Self::new(
            ErrorCode::RenderType,
            format!("cannot render join chain element {:?}", node),
        )
        .with_help("This is a bug in the join merger - please report it")
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create a configuration I/O error.
    pub fn config_io(path: impl AsRef<str>, source: std::io::Error) -> Self {
        Self::new(
            ErrorCode::ConfigIo,
            format!("failed to read {}: {}", path.as_ref(), source),
        )
        .with_source(source)
    }

    // ============== Error Checks ==============

    /// Check if this is an input error (no filters, unknown or malformed filter).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::NoFilters
                | ErrorCode::UnknownFilter
                | ErrorCode::ZeroTables
                | ErrorCode::MalformedFilter
        )
    }

    /// Check if this is a join error.
    pub fn is_join_error(&self) -> bool {
        matches!(self.code, ErrorCode::JoinImpossible | ErrorCode::ConflictingJoin)
    }

    /// Check if this is an argument error.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::NotEnoughArguments
                | ErrorCode::TooManyArguments
                | ErrorCode::EmptyArgumentGroup
                | ErrorCode::PlaceholderMismatch
        )
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref filter) = self.context.filter {
            output.push_str(&format!("  → Filter: {}\n", filter));
        }
        if let Some(ref table) = self.context.table {
            output.push_str(&format!("  → Table: {}\n", table));
        }
        if !self.context.available_tables.is_empty() {
            output.push_str(&format!(
                "  → Available: {}\n",
                self.context.available_tables.join(", ")
            ));
        }
        if let (Some(supplied), Some(required)) = (self.context.supplied, self.context.required) {
            output.push_str(&format!("  → Supplied: {}, required: {}\n", supplied, required));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! compose_error {
    ($code:expr, $msg:expr) => {
        $crate::error::ComposeError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::ComposeError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::NoFilters.code(), "S1001");
        assert_eq!(ErrorCode::JoinImpossible.code(), "S2001");
        assert_eq!(ErrorCode::NotEnoughArguments.code(), "S3001");
        assert_eq!(ErrorCode::RenderType.code(), "S4001");
    }

    #[test]
    fn test_join_impossible_lists_tables() {
        let err = ComposeError::join_impossible("table", ["series", "game"]);
        assert!(err.is_join_error());
        assert_eq!(err.context.table.as_deref(), Some("table"));
        assert_eq!(err.context.available_tables, vec!["series", "game"]);
        assert!(err.message.contains("have tables [series, game]"));
    }

    #[test]
    fn test_argument_counts() {
        let err = ComposeError::not_enough_arguments(1, 2);
        assert!(err.is_argument_error());
        assert_eq!(err.context.supplied, Some(1));
        assert_eq!(err.context.required, Some(2));

        let err = ComposeError::too_many_arguments(3, 2);
        assert_eq!(err.code, ErrorCode::TooManyArguments);
        assert!(err.to_string().contains("provided 3, needed 2"));
    }

    #[test]
    fn test_input_errors() {
        assert!(ComposeError::no_filters().is_input_error());
        assert!(ComposeError::unknown_filter("f8").is_input_error());
        assert!(ComposeError::zero_tables("f7").is_input_error());
        assert!(!ComposeError::render_type(3usize).is_input_error());
    }

    #[test]
    fn test_display_full() {
        let err = ComposeError::join_impossible("table", ["series"]).with_filter("f6");
        let output = err.display_full();
        assert!(output.contains("S2001"));
        assert!(output.contains("Filter: f6"));
        assert!(output.contains("Available: series"));
        assert!(output.contains("Suggestions"));
    }

    #[test]
    fn test_error_macro() {
        let err = compose_error!(
            ErrorCode::MalformedFilter,
            "bad filter",
            with_filter = "f1",
            with_suggestion = "fix it"
        );

        assert_eq!(err.code, ErrorCode::MalformedFilter);
        assert_eq!(err.context.filter, Some("f1".to_string()));
    }
}
