//! Structured WHERE-clause compilation.
//!
//! Filters arrive as typed descriptors and compile into a parameterized
//! clause plus a value list; user input is never interpolated into SQL
//! text. The same clause and values feed both the count query and the
//! page query, which is what keeps `total` consistent with `items`.

use chrono::{DateTime, Utc};
use leadbay_types::time::format_datetime;

use super::SqlValue;

/// Accumulates AND-combined predicates and their parameters.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    clauses: Vec<String>,
    args: Vec<SqlValue>,
}

impl WhereBuilder {
    /// Exact-match predicate.
    pub fn eq(&mut self, column: &str, value: impl Into<SqlValue>) {
        self.clauses.push(format!("{column} = ?"));
        self.args.push(value.into());
    }

    /// Case-insensitive substring match ORed across a fixed column set.
    pub fn search(&mut self, columns: &[&str], term: &str) {
        if columns.is_empty() {
            return;
        }
        let pattern = format!("%{}%", term.to_lowercase());
        let ors: Vec<String> = columns
            .iter()
            .map(|col| format!("LOWER({col}) LIKE ?"))
            .collect();
        self.clauses.push(format!("({})", ors.join(" OR ")));
        for _ in columns {
            self.args.push(SqlValue::Text(pattern.clone()));
        }
    }

    /// Date-range predicate: `BETWEEN` when both bounds are present,
    /// one-sided `>=` / `<=` otherwise.
    pub fn date_range(
        &mut self,
        column: &str,
        start: Option<&DateTime<Utc>>,
        end: Option<&DateTime<Utc>>,
    ) {
        match (start, end) {
            (Some(start), Some(end)) => {
                self.clauses.push(format!("{column} BETWEEN ? AND ?"));
                self.args.push(SqlValue::Text(format_datetime(start)));
                self.args.push(SqlValue::Text(format_datetime(end)));
            }
            (Some(start), None) => {
                self.clauses.push(format!("{column} >= ?"));
                self.args.push(SqlValue::Text(format_datetime(start)));
            }
            (None, Some(end)) => {
                self.clauses.push(format!("{column} <= ?"));
                self.args.push(SqlValue::Text(format_datetime(end)));
            }
            (None, None) => {}
        }
    }

    /// Render the clause, empty string when no predicate was added.
    pub fn clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_renders_nothing() {
        let w = WhereBuilder::default();
        assert_eq!(w.clause(), "");
        assert!(w.args().is_empty());
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let mut w = WhereBuilder::default();
        w.eq("microsite", "site-a");
        w.eq("status", "new");
        assert_eq!(w.clause(), " WHERE microsite = ? AND status = ?");
        assert_eq!(w.args().len(), 2);
    }

    #[test]
    fn test_search_ors_across_columns() {
        let mut w = WhereBuilder::default();
        w.search(&["microsite", "phone", "metadata"], "Site-A");
        assert_eq!(
            w.clause(),
            " WHERE (LOWER(microsite) LIKE ? OR LOWER(phone) LIKE ? OR LOWER(metadata) LIKE ?)"
        );
        // One lowercased pattern per column.
        assert_eq!(w.args().len(), 3);
        match &w.args()[0] {
            SqlValue::Text(p) => assert_eq!(p, "%site-a%"),
            other => panic!("unexpected arg {other:?}"),
        }
    }

    #[test]
    fn test_date_range_both_bounds_uses_between() {
        let start: DateTime<Utc> = "2026-01-01T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2026-02-01T00:00:00Z".parse().unwrap();
        let mut w = WhereBuilder::default();
        w.date_range("created_at", Some(&start), Some(&end));
        assert_eq!(w.clause(), " WHERE created_at BETWEEN ? AND ?");
        assert_eq!(w.args().len(), 2);
    }

    #[test]
    fn test_date_range_one_sided() {
        let start: DateTime<Utc> = "2026-01-01T00:00:00Z".parse().unwrap();
        let mut w = WhereBuilder::default();
        w.date_range("created_at", Some(&start), None);
        assert_eq!(w.clause(), " WHERE created_at >= ?");

        let mut w = WhereBuilder::default();
        w.date_range("created_at", None, Some(&start));
        assert_eq!(w.clause(), " WHERE created_at <= ?");
    }
}
