//! SELECT statement assembly.

use indexmap::IndexSet;
use smol_str::SmolStr;

/// Assembles the final `select ... from ... where ...` statement.
///
/// Columns are deduplicated by exact text, keeping the position of their
/// first occurrence. Nothing is quoted or escaped: the output is a statement
/// template for a parameterized query.
#[derive(Debug, Clone, Default)]
pub struct SelectAssembler {
    columns: IndexSet<SmolStr>,
}

impl SelectAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add selected columns, skipping ones already present.
    pub fn push_columns<'a, I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a SmolStr>,
    {
        for column in columns {
            if !self.columns.contains(column) {
                self.columns.insert(column.clone());
            }
        }
        self
    }

    /// Deduplicated columns in first-occurrence order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(SmolStr::as_str)
    }

    /// Render the statement.
    ///
    /// An empty column list renders as `*`; an empty predicate list drops
    /// the `where` clause.
    pub fn render(&self, from: &str, predicates: &[SmolStr]) -> String {
        let mut sql = String::with_capacity(64 + from.len());
        sql.push_str("select ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            push_joined(&mut sql, self.columns.iter(), ", ");
        }
        sql.push_str(" from ");
        sql.push_str(from);
        if !predicates.is_empty() {
            sql.push_str(" where ");
            push_joined(&mut sql, predicates.iter(), " and ");
        }
        sql
    }
}

fn push_joined<'a>(sql: &mut String, parts: impl Iterator<Item = &'a SmolStr>, sep: &str) {
    for (i, part) in parts.enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        sql.push_str(part);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strs(items: &[&str]) -> Vec<SmolStr> {
        items.iter().map(|s| SmolStr::new(s)).collect()
    }

    #[test]
    fn test_render() {
        let mut assembler = SelectAssembler::new();
        assembler.push_columns(&strs(&["t1.id", "t2.name"]));
        let sql = assembler.render("t1 join t2 on t1.t2_id = t2.id", &strs(&["t1.a > ?", "t2.b = 1"]));
        assert_eq!(
            sql,
            "select t1.id, t2.name from t1 join t2 on t1.t2_id = t2.id where t1.a > ? and t2.b = 1"
        );
    }

    #[test]
    fn test_dedup_keeps_first_position() {
        let mut assembler = SelectAssembler::new();
        assembler
            .push_columns(&strs(&["t1.id", "t1.name"]))
            .push_columns(&strs(&["t2.id", "t1.id"]));
        assert_eq!(
            assembler.columns().collect::<Vec<_>>(),
            vec!["t1.id", "t1.name", "t2.id"]
        );
    }

    #[test]
    fn test_no_predicates() {
        let mut assembler = SelectAssembler::new();
        assembler.push_columns(&strs(&["t.c"]));
        assert_eq!(assembler.render("t", &[]), "select t.c from t");
    }

    #[test]
    fn test_no_columns() {
        let assembler = SelectAssembler::new();
        assert_eq!(assembler.render("t", &strs(&["t.c = 1"])), "select * from t where t.c = 1");
    }
}
