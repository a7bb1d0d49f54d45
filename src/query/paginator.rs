//! The result of a paged search.
use crate::models::Model;

/// Every result of a paged search, with a window onto one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
	/// All results, merged from every page the server sent and sorted
	results: Vec<Model>,
	/// Results per page
	per_page: usize,
	/// The zero-based page this paginator looks at
	current_page: usize,
}

impl Paginator {
	/// Create a paginator. A page size of zero is treated as one.
	#[must_use]
	pub fn new(results: Vec<Model>, per_page: usize, current_page: usize) -> Self {
		Self { results, per_page: per_page.max(1), current_page }
	}

	/// All results.
	#[must_use]
	pub fn results(&self) -> &[Model] {
		&self.results
	}

	/// Results per page.
	#[must_use]
	pub fn per_page(&self) -> usize {
		self.per_page
	}

	/// The zero-based current page.
	#[must_use]
	pub fn current_page(&self) -> usize {
		self.current_page
	}

	/// Number of pages.
	#[must_use]
	pub fn pages(&self) -> usize {
		self.results.len().div_ceil(self.per_page)
	}

	/// Total number of results.
	#[must_use]
	pub fn count(&self) -> usize {
		self.results.len()
	}

	/// The results on the current page. Empty past the last page.
	#[must_use]
	pub fn current_items(&self) -> &[Model] {
		let start = self.current_page.saturating_mul(self.per_page).min(self.results.len());
		let end = start.saturating_add(self.per_page).min(self.results.len());
		&self.results[start..end]
	}

	/// Unwrap all results.
	#[must_use]
	pub fn into_results(self) -> Vec<Model> {
		self.results
	}
}
