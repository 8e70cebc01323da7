use crate::error::Result;
use crate::models::Resource;
use crate::repository::ResourceRepository;

/// Turns search matches into printable lines.
pub struct SearchService<'a> {
    repository: ResourceRepository<'a>,
}

impl<'a> SearchService<'a> {
    /// Wrap a repository; the service adds formatting only.
    pub fn new(repository: ResourceRepository<'a>) -> Self {
        Self { repository }
    }

    /// Formatted lines for every match, using each resource's own display.
    pub fn search_and_display(&self, term: &str) -> Result<Vec<String>> {
        self.search_and_display_with(term, Resource::display)
    }

    /// Same as [`Self::search_and_display`] with a caller-supplied formatter.
    /// Repository order is preserved and errors are returned untouched.
    pub fn search_and_display_with<F>(&self, term: &str, formatter: F) -> Result<Vec<String>>
    where
        F: Fn(&Resource) -> String,
    {
        let resources = self.repository.find_by_partial_name(term)?;
        Ok(resources.iter().map(formatter).collect())
    }
}
