//! WHERE predicate composition and argument binding.
//!
//! Predicates containing the `?` marker each consume one argument group, in
//! the order the predicates are visited across all composed filters. A
//! variadic `IN (?)` template grows to one marker per value in its group:
//!
//! ```rust
//! use sqlmerge_query::predicate::expand_placeholders;
//!
//! assert_eq!(expand_placeholders("country.code in (?)", 3), "country.code in (?, ?, ?)");
//! assert_eq!(expand_placeholders("t1.col > ?", 1), "t1.col > ?");
//! ```

use smallvec::SmallVec;
use smol_str::SmolStr;
use tracing::trace;

use crate::error::{ComposeError, ComposeResult};
use crate::filter::Filter;
use crate::value::{ArgumentGroup, Value};

/// The positional placeholder marker.
pub const PLACEHOLDER: &str = "?";

/// Marker that opens a variadic placeholder list.
const VARIADIC_OPEN: &str = "(?";

/// Expand every `(?` in `predicate` to hold `values` markers.
///
/// `values` below one leaves the predicate unchanged.
pub fn expand_placeholders(predicate: &str, values: usize) -> String {
    if values <= 1 || !predicate.contains(VARIADIC_OPEN) {
        return predicate.to_string();
    }
    let mut expanded = String::with_capacity(VARIADIC_OPEN.len() + (values - 1) * 3);
    expanded.push_str(VARIADIC_OPEN);
    for _ in 1..values {
        expanded.push_str(", ?");
    }
    predicate.replace(VARIADIC_OPEN, &expanded)
}

/// Count placeholder markers in a rendered predicate or statement.
pub fn count_placeholders(sql: &str) -> usize {
    sql.matches(PLACEHOLDER).count()
}

/// Positional cursor over the caller's argument groups.
#[derive(Debug)]
pub struct ArgumentCursor<'a> {
    groups: &'a [ArgumentGroup],
    next: usize,
}

impl<'a> ArgumentCursor<'a> {
    /// Create a cursor at the first group.
    pub fn new(groups: &'a [ArgumentGroup]) -> Self {
        Self { groups, next: 0 }
    }

    /// Take the next group, failing if none is left.
    pub fn take(&mut self) -> ComposeResult<&'a [Value]> {
        let group = self
            .groups
            .get(self.next)
            .ok_or_else(|| ComposeError::not_enough_arguments(self.groups.len(), self.next + 1))?;
        self.next += 1;
        Ok(group)
    }

    /// Number of groups consumed so far.
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Number of groups supplied.
    pub fn supplied(&self) -> usize {
        self.groups.len()
    }

    /// Fail if any group was never consumed.
    pub fn finish(self) -> ComposeResult<()> {
        if self.next < self.groups.len() {
            return Err(ComposeError::too_many_arguments(
                self.groups.len(),
                self.next,
            ));
        }
        Ok(())
    }
}

/// Accumulated predicates and bound arguments for one composition.
#[derive(Debug, Default)]
pub struct PredicateSet {
    predicates: SmallVec<[SmolStr; 8]>,
    arguments: Vec<Value>,
}

impl PredicateSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter's predicates, binding argument groups as markers are met.
    pub fn compose(
        &mut self,
        name: &str,
        filter: &Filter,
        cursor: &mut ArgumentCursor<'_>,
    ) -> ComposeResult<()> {
        for predicate in &filter.predicates {
            if !predicate.contains(PLACEHOLDER) {
                self.predicates.push(predicate.clone());
                continue;
            }

            let group = cursor.take().map_err(|e| e.with_filter(name))?;
            if group.is_empty() {
                return Err(
                    ComposeError::empty_argument_group(predicate, cursor.consumed() - 1)
                        .with_filter(name),
                );
            }

            let expanded = expand_placeholders(predicate, group.len());
            let markers = count_placeholders(&expanded);
            if markers != group.len() {
                return Err(
                    ComposeError::placeholder_mismatch(predicate, markers, group.len())
                        .with_filter(name),
                );
            }

            trace!(filter = name, predicate = %expanded, values = group.len(), "bound predicate");
            self.predicates.push(SmolStr::from(expanded));
            self.arguments.extend_from_slice(group);
        }
        Ok(())
    }

    /// Composed predicates in order.
    pub fn predicates(&self) -> &[SmolStr] {
        &self.predicates
    }

    /// Bound arguments in placeholder order.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Split into predicates and arguments.
    pub fn into_parts(self) -> (SmallVec<[SmolStr; 8]>, Vec<Value>) {
        (self.predicates, self.arguments)
    }
}
