//! Composition of registered filters into one statement.
//!
//! Filters are processed in the order the caller names them. For each one
//! the join chain is extended first, then its predicates are appended and
//! argument groups bound. Any failure discards the whole session.
//!
//! ```rust
//! use sqlmerge_query::{args, Composer, Filter, FilterRegistry, Value};
//!
//! let registry = FilterRegistry::new();
//! registry.register(
//!     "by_tier",
//!     Filter::builder()
//!         .select(["distinct series.id"])
//!         .from("series")
//!         .join("tournament").on("series.tournament_id = tournament.id")
//!         .where_clause("tournament.tier = ?")
//!         .build(),
//! );
//! registry.register(
//!     "by_country",
//!     Filter::builder()
//!         .select(["distinct series.id"])
//!         .from("series")
//!         .join("team").on("team.series_id = series.id")
//!         .where_clause("team.country in (?)")
//!         .build(),
//! );
//!
//! let query = Composer::new(&registry)
//!     .compose(&["by_tier", "by_country"], &args![[1], ["RU", "EN"]])
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql(),
//!     "select distinct series.id from series \
//!      join team on team.series_id = series.id \
//!      join tournament on series.tournament_id = tournament.id \
//!      where tournament.tier = ? and team.country in (?, ?)"
//! );
//! assert_eq!(query.params(), &[Value::Int(1), Value::from("RU"), Value::from("EN")]);
//! ```

use std::fmt;

use tracing::{debug, debug_span};

use crate::config::ComposeConfig;
use crate::error::{ComposeError, ComposeResult};
use crate::join::JoinChain;
use crate::predicate::{ArgumentCursor, PredicateSet};
use crate::registry::FilterRegistry;
use crate::sql::SelectAssembler;
use crate::value::{ArgumentGroup, Value};

/// A composed statement and its bind arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    sql: String,
    params: Vec<Value>,
}

impl ComposedQuery {
    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind arguments in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Number of bind arguments.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Split into statement and arguments.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl fmt::Display for ComposedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Composes filters from a [`FilterRegistry`].
///
/// A composer only reads the registry, so any number of them may run
/// concurrently against the same one.
#[derive(Debug, Clone)]
pub struct Composer<'r> {
    registry: &'r FilterRegistry,
    config: ComposeConfig,
}

impl<'r> Composer<'r> {
    /// Create a composer with the default configuration.
    pub fn new(registry: &'r FilterRegistry) -> Self {
        Self::with_config(registry, ComposeConfig::default())
    }

    /// Create a composer with the given configuration.
    pub fn with_config(registry: &'r FilterRegistry, config: ComposeConfig) -> Self {
        Self { registry, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Compose the named filters into a single statement.
    ///
    /// `groups` are matched positionally to placeholder-bearing predicates in
    /// the order they are met, not to the filter that declares them.
    pub fn compose<S: AsRef<str>>(
        &self,
        names: &[S],
        groups: &[ArgumentGroup],
    ) -> ComposeResult<ComposedQuery> {
        if names.is_empty() {
            return Err(ComposeError::no_filters());
        }

        let span = debug_span!("compose", filters = names.len(), groups = groups.len());
        let _guard = span.enter();

        let mut session = Session::new(&self.config, groups);
        for name in names {
            let name = name.as_ref();
            let filter = self
                .registry
                .get(name)
                .ok_or_else(|| ComposeError::unknown_filter(name))?;
            if filter.tables.is_empty() {
                return Err(ComposeError::zero_tables(name));
            }

            session.chain.merge(name, &filter)?;
            session.predicates.compose(name, &filter, &mut session.cursor)?;
            session.select.push_columns(&filter.columns);
            debug!(filter = name, consumed = session.cursor.consumed(), "composed filter");
        }

        session.finish()
    }
}

/// Transient state of one composition call.
struct Session<'a> {
    chain: JoinChain,
    select: SelectAssembler,
    predicates: PredicateSet,
    cursor: ArgumentCursor<'a>,
}

impl<'a> Session<'a> {
    fn new(config: &ComposeConfig, groups: &'a [ArgumentGroup]) -> Self {
        Self {
            chain: JoinChain::new().with_conflict_policy(config.compose.join_conflict),
            select: SelectAssembler::new(),
            predicates: PredicateSet::new(),
            cursor: ArgumentCursor::new(groups),
        }
    }

    fn finish(self) -> ComposeResult<ComposedQuery> {
        self.cursor.finish()?;

        let from = self.chain.render()?;
        let (predicates, params) = self.predicates.into_parts();
        let sql = self.select.render(&from, &predicates);

        debug!(sql_len = sql.len(), params = params.len(), "composed query");
        Ok(ComposedQuery { sql, params })
    }
}
