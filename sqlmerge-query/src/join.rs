//! Join chain construction.
//!
//! The chain is the FROM clause of the composed statement: an anchor table
//! followed by `join <table> on <condition>` fragments. Filters arrive with
//! their tables in filter-local order, so a later filter may need to splice a
//! join into the middle of the chain, directly after the table it hangs off.
//!
//! Nodes live in an arena (`Vec<ChainNode>`) linked by index, with an
//! ordered index from table name to the node a new join should follow:
//! the anchor node for the anchor table, the `on` node for joined tables.
//!
//! ```rust
//! use sqlmerge_query::{Filter, JoinChain};
//!
//! let mut chain = JoinChain::seeded("t1");
//! chain.merge("f1", &Filter::new(["t1.id"], ["t1", "t2"], ["t1.t2_id = t2.id"], ["x"])).unwrap();
//! chain.merge("f3", &Filter::new(["t1.id"], ["t1", "t3"], ["t1.t3_id = t3.id"], ["y"])).unwrap();
//!
//! assert_eq!(
//!     chain.render().unwrap(),
//!     "t1 join t3 on t1.t3_id = t3.id join t2 on t1.t2_id = t2.id"
//! );
//! ```

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::config::JoinConflictPolicy;
use crate::error::{ComposeError, ComposeResult};
use crate::filter::Filter;

/// What a chain node renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The anchor table of the whole statement.
    Anchor(SmolStr),
    /// ` join <table>`.
    Join(SmolStr),
    /// ` on <condition>`.
    On(SmolStr),
}

/// A node in the join chain arena.
#[derive(Debug, Clone)]
pub struct ChainNode {
    fragment: Fragment,
    next: Option<usize>,
}

impl ChainNode {
    /// The fragment held by this node.
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }
}

/// Where a reachable table sits in the chain.
#[derive(Debug, Clone)]
struct Reach {
    /// Node after which joins hanging off this table are inserted.
    position: usize,
    /// Condition the table was joined on; `None` for the anchor.
    condition: Option<SmolStr>,
}

/// An ordered FROM/JOIN chain built from one or more filters.
#[derive(Debug, Clone, Default)]
pub struct JoinChain {
    nodes: Vec<ChainNode>,
    head: Option<usize>,
    reachable: IndexMap<SmolStr, Reach>,
    conflicts: JoinConflictPolicy,
}

impl JoinChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chain holding only `anchor`.
    pub fn seeded(anchor: impl Into<SmolStr>) -> Self {
        let mut chain = Self::new();
        chain.seed(anchor);
        chain
    }

    /// Set how re-joins with a different condition are handled.
    pub fn with_conflict_policy(mut self, policy: JoinConflictPolicy) -> Self {
        self.conflicts = policy;
        self
    }

    /// Start the chain with its anchor table.
    ///
    /// Seeding a non-empty chain is a no-op.
    pub fn seed(&mut self, anchor: impl Into<SmolStr>) {
        if self.head.is_some() {
            return;
        }
        let anchor = anchor.into();
        let position = self.push_node(Fragment::Anchor(anchor.clone()), None);
        self.head = Some(position);
        self.reachable.insert(
            anchor,
            Reach {
                position,
                condition: None,
            },
        );
    }

    /// Check whether `table` is already part of the chain.
    pub fn contains(&self, table: &str) -> bool {
        self.reachable.contains_key(table)
    }

    /// Reachable tables, in the order they were introduced.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.reachable.keys().map(SmolStr::as_str)
    }

    /// Number of reachable tables.
    pub fn len(&self) -> usize {
        self.reachable.len()
    }

    /// Check whether the chain has no tables yet.
    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    /// Fold a filter's tables into the chain.
    ///
    /// The first filter merged into an empty chain seeds it with its anchor.
    /// Otherwise the anchor must already be reachable. Tables already in the
    /// chain are skipped; new ones are spliced in right after the previous
    /// table of the same filter.
    pub fn merge(&mut self, name: &str, filter: &Filter) -> ComposeResult<()> {
        let Some(anchor) = filter.tables.first() else {
            return Err(ComposeError::zero_tables(name));
        };
        if filter.joins.len() != filter.tables.len() - 1 {
            return Err(
                ComposeError::malformed_filter(name, filter.tables.len(), filter.joins.len())
                    .with_table(anchor.as_str()),
            );
        }

        if self.head.is_none() {
            self.seed(anchor.clone());
        }
        if !self.reachable.contains_key(anchor) {
            return Err(
                ComposeError::join_impossible(anchor.as_str(), self.tables()).with_filter(name),
            );
        }

        for (i, (table, condition)) in filter.tables[1..].iter().zip(&filter.joins).enumerate() {
            if let Some(existing) = self.reachable.get(table) {
                self.check_conflict(name, table, existing, condition)?;
                trace!(filter = name, table = %table, "table already joined");
                continue;
            }

            let previous = &filter.tables[i];
            let after = self.reachable[previous].position;
            let join = self.insert_after(after, Fragment::Join(table.clone()));
            let on = self.insert_after(join, Fragment::On(condition.clone()));
            self.reachable.insert(
                table.clone(),
                Reach {
                    position: on,
                    condition: Some(condition.clone()),
                },
            );
            debug!(filter = name, table = %table, after = %previous, "joined table");
        }

        Ok(())
    }

    fn check_conflict(
        &self,
        name: &str,
        table: &SmolStr,
        existing: &Reach,
        incoming: &SmolStr,
    ) -> ComposeResult<()> {
        let Some(current) = existing.condition.as_ref() else {
            return Ok(());
        };
        if current == incoming {
            return Ok(());
        }
        match self.conflicts {
            JoinConflictPolicy::FirstWins => {
                warn!(
                    filter = name,
                    table = %table,
                    kept = %current,
                    ignored = %incoming,
                    "conflicting join condition ignored"
                );
                Ok(())
            }
            JoinConflictPolicy::Reject => {
                Err(ComposeError::conflicting_join(table.as_str(), current, incoming).with_filter(name))
            }
        }
    }

    /// Render the chain front to back.
    pub fn render(&self) -> ComposeResult<String> {
        let mut out = String::new();
        for fragment in self.fragments() {
            match fragment? {
                Fragment::Anchor(table) => out.push_str(table),
                Fragment::Join(table) => {
                    out.push_str(" join ");
                    out.push_str(table);
                }
                Fragment::On(condition) => {
                    out.push_str(" on ");
                    out.push_str(condition);
                }
            }
        }
        Ok(out)
    }

    /// Walk the chain from its head.
    ///
    /// A link pointing outside the arena yields a render error and ends the
    /// walk.
    pub fn fragments(&self) -> Fragments<'_> {
        Fragments {
            chain: self,
            cursor: self.head,
            steps: 0,
        }
    }

    fn push_node(&mut self, fragment: Fragment, next: Option<usize>) -> usize {
        self.nodes.push(ChainNode { fragment, next });
        self.nodes.len() - 1
    }

    fn insert_after(&mut self, position: usize, fragment: Fragment) -> usize {
        let next = self.nodes[position].next;
        let index = self.push_node(fragment, next);
        self.nodes[position].next = Some(index);
        index
    }
}

/// Iterator over the fragments of a [`JoinChain`], front to back.
#[derive(Debug)]
pub struct Fragments<'a> {
    chain: &'a JoinChain,
    cursor: Option<usize>,
    steps: usize,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = ComposeResult<&'a Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        // A well-formed chain visits every node exactly once.
        if self.steps >= self.chain.nodes.len() {
            self.cursor = None;
            return Some(Err(ComposeError::render_type(index)));
        }
        self.steps += 1;
        match self.chain.nodes.get(index) {
            Some(node) => {
                self.cursor = node.next;
                Some(Ok(&node.fragment))
            }
            None => {
                self.cursor = None;
                Some(Err(ComposeError::render_type(index)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    fn filter(tables: &[&str], joins: &[&str]) -> Filter {
        Filter::new(["c"], tables.iter().copied(), joins.iter().copied(), ["p"])
    }

    #[test]
    fn test_first_filter_seeds_anchor() {
        let mut chain = JoinChain::new();
        chain.merge("f2", &filter(&["t1"], &[])).unwrap();
        assert_eq!(chain.render().unwrap(), "t1");
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_splices_after_previous_table() {
        let mut chain = JoinChain::new();
        chain
            .merge("f1", &filter(&["t1", "t2"], &["t1.t2_id = t2.id"]))
            .unwrap();
        chain.merge("f2", &filter(&["t1"], &[])).unwrap();
        chain
            .merge(
                "f3",
                &filter(&["t1", "t3", "t4"], &["t1.t3_id = t3.id", "t3.t4_id = t4.id"]),
            )
            .unwrap();

        assert_eq!(
            chain.render().unwrap(),
            "t1 join t3 on t1.t3_id = t3.id join t4 on t3.t4_id = t4.id join t2 on t1.t2_id = t2.id"
        );
        assert_eq!(chain.tables().collect::<Vec<_>>(), vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_splices_after_skipped_table() {
        let mut chain = JoinChain::new();
        chain
            .merge("a", &filter(&["s", "g", "c"], &["s.id = g.s_id", "g.c_id = c.id"]))
            .unwrap();
        // g is already joined; x must follow g's condition, ahead of c.
        chain
            .merge("b", &filter(&["s", "g", "x"], &["s.id = g.s_id", "g.id = x.g_id"]))
            .unwrap();

        assert_eq!(
            chain.render().unwrap(),
            "s join g on s.id = g.s_id join x on g.id = x.g_id join c on g.c_id = c.id"
        );
    }

    #[test]
    fn test_reintroduced_table_joined_once() {
        let mut chain = JoinChain::new();
        let f = filter(&["t1", "t2"], &["t1.t2_id = t2.id"]);
        chain.merge("a", &f).unwrap();
        chain.merge("b", &f).unwrap();
        assert_eq!(chain.render().unwrap(), "t1 join t2 on t1.t2_id = t2.id");
    }

    #[test]
    fn test_anchor_not_reachable() {
        let mut chain = JoinChain::seeded("series");
        let err = chain.merge("f6", &filter(&["table"], &[])).unwrap_err();
        assert_eq!(err.code, ErrorCode::JoinImpossible);
        assert_eq!(err.context.table.as_deref(), Some("table"));
        assert_eq!(err.context.available_tables, vec!["series"]);
        assert_eq!(err.context.filter.as_deref(), Some("f6"));
    }

    #[test]
    fn test_missing_join_condition() {
        let mut chain = JoinChain::new();
        let err = chain.merge("bad", &filter(&["t1", "t2"], &[])).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedFilter);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_zero_tables() {
        let mut chain = JoinChain::new();
        let err = chain.merge("f7", &filter(&[], &[])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ZeroTables);
    }

    #[test]
    fn test_conflict_first_wins() {
        let mut chain = JoinChain::new();
        chain.merge("a", &filter(&["t1", "t2"], &["t1.a = t2.a"])).unwrap();
        chain.merge("b", &filter(&["t1", "t2"], &["t1.b = t2.b"])).unwrap();
        assert_eq!(chain.render().unwrap(), "t1 join t2 on t1.a = t2.a");
    }

    #[test]
    fn test_conflict_reject() {
        let mut chain = JoinChain::new().with_conflict_policy(JoinConflictPolicy::Reject);
        chain.merge("a", &filter(&["t1", "t2"], &["t1.a = t2.a"])).unwrap();
        let err = chain
            .merge("b", &filter(&["t1", "t2"], &["t1.b = t2.b"]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConflictingJoin);
        assert_eq!(err.context.filter.as_deref(), Some("b"));
    }

    #[test]
    fn test_dangling_link_is_render_error() {
        let mut chain = JoinChain::seeded("t1");
        chain.nodes[0].next = Some(42);
        let err = chain.render().unwrap_err();
        assert_eq!(err.code, ErrorCode::RenderType);
    }

    #[test]
    fn test_cycle_is_render_error() {
        let mut chain = JoinChain::seeded("t1");
        chain.nodes[0].next = Some(0);
        let err = chain.render().unwrap_err();
        assert_eq!(err.code, ErrorCode::RenderType);
    }
}
