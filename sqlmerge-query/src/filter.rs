//! Reusable SQL filter fragments.
//!
//! A [`Filter`] declares the columns it selects, the tables it touches, the
//! conditions joining those tables, and its WHERE predicates. The first table
//! is the filter's *anchor*: it must already be present when the filter is
//! merged into a composition. Every later table is introduced by the filter
//! and carries exactly one join condition.
//!
//! ```rust
//! use sqlmerge_query::Filter;
//!
//! let filter = Filter::builder()
//!     .select(["distinct series.id"])
//!     .from("series")
//!     .join("game").on("series.id = game.series_id")
//!     .join_on("game_team", "game.id = game_team.game_id")
//!     .where_clause("game_team.score > ?")
//!     .build();
//!
//! assert_eq!(filter.anchor(), Some("series"));
//! assert_eq!(filter.tables().len(), 3);
//! assert_eq!(filter.placeholder_predicates(), 1);
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{ComposeError, ComposeResult};
use crate::predicate::PLACEHOLDER;

/// A reusable query fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Filter {
    /// Selected column expressions.
    #[serde(default)]
    pub columns: Vec<SmolStr>,
    /// Tables, anchor first.
    #[serde(default)]
    pub tables: Vec<SmolStr>,
    /// One join condition per table after the anchor.
    #[serde(default)]
    pub joins: Vec<SmolStr>,
    /// WHERE predicates.
    #[serde(default, rename = "where")]
    pub predicates: Vec<SmolStr>,
}

impl Filter {
    /// Create a filter from its four parts.
    ///
    /// The structure is not validated here; see [`Filter::validate`].
    pub fn new<C, T, J, P>(columns: C, tables: T, joins: J, predicates: P) -> Self
    where
        C: IntoIterator,
        C::Item: Into<SmolStr>,
        T: IntoIterator,
        T::Item: Into<SmolStr>,
        J: IntoIterator,
        J::Item: Into<SmolStr>,
        P: IntoIterator,
        P::Item: Into<SmolStr>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            tables: tables.into_iter().map(Into::into).collect(),
            joins: joins.into_iter().map(Into::into).collect(),
            predicates: predicates.into_iter().map(Into::into).collect(),
        }
    }

    /// Start building a filter.
    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    /// Selected column expressions.
    pub fn columns(&self) -> &[SmolStr] {
        &self.columns
    }

    /// Tables, anchor first.
    pub fn tables(&self) -> &[SmolStr] {
        &self.tables
    }

    /// Join conditions.
    pub fn joins(&self) -> &[SmolStr] {
        &self.joins
    }

    /// WHERE predicates.
    pub fn predicates(&self) -> &[SmolStr] {
        &self.predicates
    }

    /// The anchor table, if any.
    pub fn anchor(&self) -> Option<&str> {
        self.tables.first().map(SmolStr::as_str)
    }

    /// Tables introduced by this filter, paired with their join condition.
    ///
    /// Pairs stop at the shorter of the two lists.
    pub fn joined_tables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .iter()
            .skip(1)
            .zip(self.joins.iter())
            .map(|(t, c)| (t.as_str(), c.as_str()))
    }

    /// Number of predicates that consume an argument group.
    pub fn placeholder_predicates(&self) -> usize {
        self.predicates
            .iter()
            .filter(|p| p.contains(PLACEHOLDER))
            .count()
    }

    /// Check that there is one join condition per table after the anchor.
    ///
    /// `name` is only used for the error message.
    pub fn validate(&self, name: &str) -> ComposeResult<()> {
        if self.tables.is_empty() {
            return Err(ComposeError::zero_tables(name));
        }
        if self.joins.len() != self.tables.len() - 1 {
            return Err(ComposeError::malformed_filter(
                name,
                self.tables.len(),
                self.joins.len(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`Filter`].
///
/// Methods may be called in any order; only [`FilterBuilder::join`] hands
/// back a [`PendingJoin`] that must be completed with a condition.
#[derive(Debug, Clone, Default)]
#[must_use = "builders do nothing until build() is called"]
pub struct FilterBuilder {
    filter: Filter,
}

impl FilterBuilder {
    /// Add selected column expressions.
    pub fn select<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        self.filter
            .columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set the anchor table.
    ///
    /// Calling this again replaces the anchor.
    pub fn from(mut self, table: impl Into<SmolStr>) -> Self {
        let table = table.into();
        match self.filter.tables.first_mut() {
            Some(anchor) => *anchor = table,
            None => self.filter.tables.push(table),
        }
        self
    }

    /// Introduce a joined table; the returned value needs a condition.
    pub fn join(self, table: impl Into<SmolStr>) -> PendingJoin {
        PendingJoin {
            builder: self,
            table: table.into(),
        }
    }

    /// Introduce a joined table together with its condition.
    pub fn join_on(mut self, table: impl Into<SmolStr>, condition: impl Into<SmolStr>) -> Self {
        self.filter.tables.push(table.into());
        self.filter.joins.push(condition.into());
        self
    }

    /// Add one WHERE predicate.
    pub fn where_clause(mut self, predicate: impl Into<SmolStr>) -> Self {
        self.filter.predicates.push(predicate.into());
        self
    }

    /// Add several WHERE predicates.
    pub fn where_all<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        self.filter
            .predicates
            .extend(predicates.into_iter().map(Into::into));
        self
    }

    /// Finish the filter.
    pub fn build(self) -> Filter {
        self.filter
    }
}

/// A joined table waiting for its condition.
#[derive(Debug, Clone)]
#[must_use = "a joined table needs a condition, call on()"]
pub struct PendingJoin {
    builder: FilterBuilder,
    table: SmolStr,
}

impl PendingJoin {
    /// Supply the join condition.
    pub fn on(self, condition: impl Into<SmolStr>) -> FilterBuilder {
        self.builder.join_on(self.table, condition)
    }
}
