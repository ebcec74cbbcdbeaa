//! # sqlmerge-query
//!
//! Composes reusable SQL filter fragments into one SELECT statement plus an
//! ordered list of bind arguments.
//!
//! This crate provides:
//! - [`Filter`] fragments declaring columns, tables, join conditions and predicates
//! - A thread-safe [`FilterRegistry`] of named filters
//! - A [`JoinChain`] that merges per-filter table lists into one FROM clause
//! - Variadic `IN (?)` expansion with strict placeholder/argument parity
//! - The [`Composer`] tying it all together
//!
//! ## Composing Filters
//!
//! ```rust
//! use sqlmerge_query::{args, Filter, FilterRegistry, Value};
//!
//! let registry = FilterRegistry::new();
//! registry.register(
//!     "f1",
//!     Filter::new(["t1.id"], ["t1", "t2"], ["t1.t2_id = t2.id"], ["t2.col > ?", "t1.col2 = 'colcol'"]),
//! );
//! registry.register("f2", Filter::new(["t1.id"], ["t1"], Vec::<&str>::new(), ["t1.col > ?"]));
//! registry.register(
//!     "f3",
//!     Filter::new(
//!         ["t1.id"],
//!         ["t1", "t3", "t4"],
//!         ["t1.t3_id = t3.id", "t3.t4_id = t4.id"],
//!         ["t4.col = ?"],
//!     ),
//! );
//!
//! let query = registry.compose(&["f1", "f2", "f3"], &args![[1], [2], [3]]).unwrap();
//! assert_eq!(
//!     query.sql(),
//!     "select t1.id from t1 join t3 on t1.t3_id = t3.id join t4 on t3.t4_id = t4.id \
//!      join t2 on t1.t2_id = t2.id where t2.col > ? and t1.col2 = 'colcol' \
//!      and t1.col > ? and t4.col = ?"
//! );
//! assert_eq!(query.params(), &[Value::Int(1), Value::Int(2), Value::Int(3)]);
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sqlmerge_query::{ErrorCode, FilterRegistry};
//!
//! let registry = FilterRegistry::new();
//! let err = registry.compose(&["missing"], &[]).unwrap_err();
//! assert_eq!(err.code, ErrorCode::UnknownFilter);
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod filter;
pub mod join;
pub mod logging;
#[macro_use]
pub mod macros;
pub mod predicate;
pub mod registry;
pub mod sql;
pub mod value;

pub use compose::{ComposedQuery, Composer};
pub use config::{
    ComposeConfig, ComposeSettings, EnvSource, JoinConflictPolicy, LogFormat, LoggingConfig,
    MapEnvSource, StdEnvSource,
};
pub use error::{ComposeError, ComposeResult, ErrorCode, ErrorContext};
pub use filter::{Filter, FilterBuilder, PendingJoin};
pub use join::{Fragment, JoinChain};
pub use predicate::{ArgumentCursor, PredicateSet, count_placeholders, expand_placeholders};
pub use registry::FilterRegistry;
pub use sql::SelectAssembler;
pub use value::{ArgumentGroup, Value};

// Re-export logging utilities
pub use logging::{init as init_logging, init_from_config as init_logging_from_config};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::args;
    pub use crate::compose::{ComposedQuery, Composer};
    pub use crate::config::{ComposeConfig, JoinConflictPolicy};
    pub use crate::error::{ComposeError, ComposeResult, ErrorCode};
    pub use crate::filter::Filter;
    pub use crate::registry::FilterRegistry;
    pub use crate::value::Value;
}
