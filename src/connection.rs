//! The capability through which queries and models talk to a directory.
use async_trait::async_trait;

use crate::{attributes::Attributes, entry::RawEntry, error::Error, models::BatchModification};

/// The entries returned by one search request, along with the paged results
/// cookie the server sent back, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
	/// Entries matched by the search
	pub entries: Vec<RawEntry>,
	/// Cookie of the simple paged results control. `None` or an empty cookie
	/// means there are no further pages.
	pub cookie: Option<Vec<u8>>,
}

impl SearchResponse {
	/// A response without paging information.
	#[must_use]
	pub fn new(entries: Vec<RawEntry>) -> Self {
		Self { entries, cookie: None }
	}

	/// The cookie to send for the next page, empty once the last page has been
	/// reached.
	#[must_use]
	pub fn paged_result_cookie(&self) -> &[u8] {
		self.cookie.as_deref().unwrap_or_default()
	}
}

/// Operations a directory connection provides. Implementors own the single
/// stateful handle to the server; callers perform one request at a time.
///
/// Empty attribute selections request every attribute of an entry.
#[async_trait]
pub trait Connection: Send {
	/// Search the whole subtree below `base`.
	async fn search(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error>;

	/// Read the single entry at `base`.
	async fn read(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error>;

	/// Search the direct children of `base`.
	async fn listing(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error>;

	/// Add a new entry.
	async fn add(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error>;

	/// Replace the given attributes of an entry.
	async fn modify(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error> {
		self.mod_replace(dn, attributes).await
	}

	/// Apply a set of modifications to an entry in a single request.
	async fn modify_batch(&mut self, dn: &str, modifications: &[BatchModification])
		-> Result<(), Error>;

	/// Add values to attributes of an entry.
	async fn mod_add(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error>;

	/// Replace the values of attributes of an entry.
	async fn mod_replace(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error>;

	/// Remove values from attributes of an entry. Attributes without values
	/// are removed entirely.
	async fn mod_delete(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error>;

	/// Delete an entry.
	async fn delete(&mut self, dn: &str) -> Result<(), Error>;

	/// Rename an entry and optionally move it below a new parent.
	async fn rename(
		&mut self,
		dn: &str,
		new_rdn: &str,
		new_parent: Option<&str>,
		delete_old_rdn: bool,
	) -> Result<(), Error>;

	/// Attach a simple paged results control to the following searches. A
	/// page size of zero removes the control again.
	async fn control_paged_result(
		&mut self,
		page_size: i32,
		critical: bool,
		cookie: &[u8],
	) -> Result<(), Error>;

	/// Whether the connection is established over LDAPS.
	fn is_using_ssl(&self) -> bool;

	/// Whether the connection was secured with StartTLS.
	fn is_using_tls(&self) -> bool;

	/// Whether the connection is encrypted by either means.
	fn is_secure(&self) -> bool {
		self.is_using_ssl() || self.is_using_tls()
	}
}
