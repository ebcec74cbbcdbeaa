//! # sqlmerge
//!
//! Merge reusable SQL filter fragments into one SELECT statement with a
//! positionally ordered list of bind arguments.
//!
//! sqlmerge provides:
//! - Named, reusable filters declaring columns, tables, joins and predicates
//! - Join chain merging that splices joins where each filter connects
//! - Variadic `IN (?)` expansion that keeps arguments and placeholders aligned
//! - Typed errors for every way a composition can fail
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlmerge::prelude::*;
//!
//! let registry = FilterRegistry::new();
//! registry.register(
//!     "active_users",
//!     Filter::builder()
//!         .select(["users.id"])
//!         .from("users")
//!         .where_clause("users.active = true")
//!         .build(),
//! );
//! registry.register(
//!     "in_orgs",
//!     Filter::builder()
//!         .select(["users.id"])
//!         .from("users")
//!         .join("orgs").on("orgs.id = users.org_id")
//!         .where_clause("orgs.slug in (?)")
//!         .build(),
//! );
//!
//! let query = Composer::new(&registry)
//!     .compose(&["active_users", "in_orgs"], &args![["acme", "globex"]])
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql(),
//!     "select users.id from users join orgs on orgs.id = users.org_id \
//!      where users.active = true and orgs.slug in (?, ?)"
//! );
//! assert_eq!(query.param_count(), 2);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Composition engine.
pub mod query {
    pub use sqlmerge_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sqlmerge_query::prelude::*;
}

// Re-export key types at the crate root
pub use sqlmerge_query::{
    ComposeConfig, ComposeError, ComposeResult, ComposedQuery, Composer, ErrorCode, Filter,
    FilterRegistry, Value, args,
};
