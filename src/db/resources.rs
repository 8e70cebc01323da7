use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// The one query the tool ever runs. Each resource joins to at most one
/// detail row, chosen by its `type`, and results come back classes first,
/// then exams, each sorted by name. The placeholder receives `%term%`.
pub const SEARCH_SQL: &str = "SELECT r.id, r.name, r.type, c.rating, e.exam_type
     FROM resources r
     LEFT JOIN classes c ON r.id = c.resource_id AND r.type = 'class'
     LEFT JOIN exams e ON r.id = e.resource_id AND r.type = 'exam'
     WHERE r.name LIKE ?
     ORDER BY r.type ASC, r.name ASC";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A raw search row before any domain validation. The detail columns are
/// optional because of the left joins.
pub struct ResourceRow {
    /// `resources.id`.
    pub id: i64,
    /// `resources.name`.
    pub name: String,
    /// `resources.type`, still unparsed so hydration can reject unknown tags.
    pub kind: String,
    /// `classes.rating`, present only for class rows.
    pub rating: Option<i64>,
    /// `exams.exam_type`, present only for exam rows.
    pub exam_type: Option<String>,
}

/// Read-only access to the resource tables. Implemented by every backing
/// engine and by test doubles.
pub trait ResourceStore {
    /// Return every row whose name contains `term`, in search order.
    fn find_rows_by_name(&self, term: &str) -> Result<Vec<ResourceRow>>;
}

/// `LIKE` pattern for a substring match. Wildcards in `term` pass through.
pub fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

impl ResourceStore for Connection {
    fn find_rows_by_name(&self, term: &str) -> Result<Vec<ResourceRow>> {
        let mut stmt = self.prepare(SEARCH_SQL)?;

        let rows = stmt
            .query_map([like_pattern(term)], |row| {
                Ok(ResourceRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    kind: row.get(2)?,
                    rating: row.get(3)?,
                    exam_type: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(term, rows = rows.len(), "sqlite search finished");
        Ok(rows)
    }
}
