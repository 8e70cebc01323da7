//! Search-and-hydrate: validates the term, runs the single search query
//! through a [`ResourceStore`], and turns every row into a [`Resource`].

use tracing::debug;

use crate::config::DEFAULT_MIN_SEARCH_LENGTH;
use crate::db::{ResourceRow, ResourceStore};
use crate::error::{Error, Result};
use crate::models::{ClassResource, ExamResource, Resource, ResourceKind};

/// Reject terms shorter than `min_length` characters (not bytes).
pub fn validate_term(term: &str, min_length: usize) -> Result<()> {
    if term.chars().count() < min_length {
        return Err(Error::validation(format!(
            "search term must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// Read-only access to resources by name, on top of any [`ResourceStore`].
pub struct ResourceRepository<'a> {
    /// Open storage handle, owned by the caller.
    store: &'a dyn ResourceStore,
    /// Shortest accepted term, in characters.
    min_search_length: usize,
}

impl<'a> ResourceRepository<'a> {
    /// Repository over `store` rejecting terms shorter than
    /// `min_search_length` characters.
    pub fn new(store: &'a dyn ResourceStore, min_search_length: usize) -> Self {
        Self {
            store,
            min_search_length,
        }
    }

    /// Repository using the default minimum term length.
    pub fn with_default_min_length(store: &'a dyn ResourceStore) -> Self {
        Self::new(store, DEFAULT_MIN_SEARCH_LENGTH)
    }

    /// Configured minimum term length.
    pub fn min_search_length(&self) -> usize {
        self.min_search_length
    }

    /// Resources whose name contains `term`, classes first, each group
    /// sorted by name. The store is never touched for a too-short term.
    pub fn find_by_partial_name(&self, term: &str) -> Result<Vec<Resource>> {
        validate_term(term, self.min_search_length)?;

        let rows = self.store.find_rows_by_name(term)?;
        debug!(term, rows = rows.len(), "hydrating search rows");

        rows.into_iter().map(hydrate).collect()
    }
}

/// Build the variant named by the row's `type` column.
fn hydrate(row: ResourceRow) -> Result<Resource> {
    match row.kind.parse::<ResourceKind>()? {
        ResourceKind::Class => {
            let rating = row.rating.ok_or_else(|| {
                Error::validation(format!("class resource {} has no rating", row.id))
            })?;
            Ok(ClassResource::new(row.id, row.name, rating)?.into())
        }
        ResourceKind::Exam => {
            let exam_type = row.exam_type.as_deref().ok_or_else(|| {
                Error::validation(format!("exam resource {} has no exam type", row.id))
            })?;
            Ok(ExamResource::new(row.id, row.name, exam_type)?.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// Store double that records how often it was queried.
    #[derive(Default)]
    struct FakeStore {
        rows: Vec<ResourceRow>,
        fail_with: Option<&'static str>,
        calls: Cell<usize>,
        terms: RefCell<Vec<String>>,
    }

    impl ResourceStore for FakeStore {
        fn find_rows_by_name(&self, term: &str) -> Result<Vec<ResourceRow>> {
            self.calls.set(self.calls.get() + 1);
            self.terms.borrow_mut().push(term.to_string());
            match self.fail_with {
                Some(message) => Err(Error::Storage {
                    message: message.to_string(),
                    source: None,
                }),
                None => Ok(self.rows.clone()),
            }
        }
    }

    fn row(id: i64, name: &str, kind: &str, rating: Option<i64>, exam: Option<&str>) -> ResourceRow {
        ResourceRow {
            id,
            name: name.to_string(),
            kind: kind.to_string(),
            rating,
            exam_type: exam.map(str::to_string),
        }
    }

    #[test]
    fn short_terms_never_reach_storage() {
        let store = FakeStore::default();
        let repository = ResourceRepository::new(&store, 3);

        for term in ["", "a", "ab", "ñá"] {
            let err = repository.find_by_partial_name(term).unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
            assert!(err.to_string().contains("at least 3 characters"));
        }
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let store = FakeStore::default();
        let repository = ResourceRepository::with_default_min_length(&store);

        // three characters, six bytes
        assert!(repository.find_by_partial_name("ñáé").is_ok());
        assert_eq!(store.terms.borrow().as_slice(), ["ñáé"]);
    }

    #[test]
    fn rows_dispatch_on_type() {
        let store = FakeStore {
            rows: vec![
                row(1, "English Class", "class", Some(5), None),
                row(2, "Spanish Exam", "exam", None, Some("selección")),
            ],
            ..FakeStore::default()
        };
        let results = ResourceRepository::new(&store, 3)
            .find_by_partial_name("search")
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(&results[0], Resource::Class(class) if class.rating() == 5));
        assert!(matches!(&results[1], Resource::Exam(exam) if exam.name() == "Spanish Exam"));
    }

    #[test]
    fn missing_detail_column_fails_hydration() {
        let store = FakeStore {
            rows: vec![row(7, "Orphan Class", "class", None, None)],
            ..FakeStore::default()
        };
        let err = ResourceRepository::new(&store, 3)
            .find_by_partial_name("orphan")
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("resource 7 has no rating"));
    }

    #[test]
    fn unsupported_type_fails_hydration() {
        let store = FakeStore {
            rows: vec![row(8, "Grammar Workshop", "workshop", None, None)],
            ..FakeStore::default()
        };
        let err = ResourceRepository::new(&store, 3)
            .find_by_partial_name("grammar")
            .unwrap_err();

        assert!(err.to_string().contains("unsupported resource type"));
    }

    #[test]
    fn storage_errors_pass_through_unchanged() {
        let store = FakeStore {
            fail_with: Some("Database error"),
            ..FakeStore::default()
        };
        let err = ResourceRepository::new(&store, 3)
            .find_by_partial_name("valid")
            .unwrap_err();

        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(err.to_string(), "Database error");
        assert_eq!(store.calls.get(), 1);
    }
}
