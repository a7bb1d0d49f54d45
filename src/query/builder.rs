//! Fluent construction and execution of directory queries.
use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
	connection::{Connection, SearchResponse},
	entry::RawEntry,
	error::Error,
	models::Model,
	query::{
		binding::{Binding, Bindings, Where},
		escape::unescape,
		grammar,
		operator::Operator,
		paginator::Paginator,
		processor::{Direction, Processor, Sort, SortFlag},
		MATCH_ALL,
	},
	schema::Schema,
};

/// LDAP result code of a search whose base entry does not exist.
const NO_SUCH_OBJECT: u32 = 32;
/// Extensible match rule following group memberships transitively.
const MATCHING_RULE_IN_CHAIN: &str = "1.2.840.113556.1.4.1941";
/// Extensible match rule testing whether bits of a number are set.
const MATCHING_RULE_BIT_AND: &str = "1.2.840.113556.1.4.803";
/// The `userAccountControl` bit of disabled accounts.
const ACCOUNT_DISABLED: &str = "2";

/// The scope a query is executed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
	/// The whole subtree below the base DN
	Search,
	/// Only the entry at the base DN
	Read,
	/// The direct children of the base DN
	Listing,
}

/// Generates a `where` and an `orWhere` shorthand for an operator taking a
/// value.
macro_rules! value_clauses {
	($($operator:ident: $and:ident, $or:ident;)*) => {
		$(
			#[doc = concat!(
				"Add a `where` clause using [`Operator::",
				stringify!($operator),
				"`]."
			)]
			pub fn $and(self, field: impl Into<String>, value: &str) -> Self {
				self.push(Binding::Where(Where::with_value(field, Operator::$operator, value)))
			}

			#[doc = concat!(
				"Add an `orWhere` clause using [`Operator::",
				stringify!($operator),
				"`]."
			)]
			pub fn $or(self, field: impl Into<String>, value: &str) -> Self {
				self.push(Binding::OrWhere(Where::with_value(field, Operator::$operator, value)))
			}
		)*
	};
}

/// Accumulates the clauses and scope of a query and executes it.
///
/// The builder holds the connection exclusively for as long as it lives, so
/// every query gets a builder of its own. The terminal operations
/// ([`Builder::get`], [`Builder::first`], [`Builder::paginate`] and the
/// `find` family) consume it.
#[must_use]
pub struct Builder<'a, C: Connection + ?Sized> {
	/// The connection the query is executed on
	connection: &'a mut C,
	/// Attribute names
	schema: Arc<Schema>,
	/// Search base used when no DN is set
	base_dn: String,
	/// Search base of this query
	dn: Option<String>,
	/// Clauses of the query
	bindings: Bindings,
	/// Read only the entry at the DN
	read: bool,
	/// Search the whole subtree instead of the direct children
	recursive: bool,
	/// Skip the materialization of models
	raw: bool,
	/// Sorting applied to the results
	sort: Option<Sort>,
}

impl<C: Connection + ?Sized> fmt::Debug for Builder<'_, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Builder")
			.field("base_dn", &self.base_dn)
			.field("dn", &self.dn)
			.field("bindings", &self.bindings)
			.field("mode", &self.mode())
			.field("raw", &self.raw)
			.field("sort", &self.sort)
			.finish_non_exhaustive()
	}
}

impl<'a, C: Connection + ?Sized> Builder<'a, C> {
	/// Start a query on a connection. Queries without an explicit DN search
	/// below `base_dn`.
	pub fn new(connection: &'a mut C, schema: Arc<Schema>, base_dn: impl Into<String>) -> Self {
		Self {
			connection,
			schema,
			base_dn: base_dn.into(),
			dn: None,
			bindings: Bindings::default(),
			read: false,
			recursive: true,
			raw: false,
			sort: None,
		}
	}

	/// Add a clause.
	pub fn push(mut self, binding: Binding) -> Self {
		self.bindings.push(binding);
		self
	}

	/// Restrict the attributes returned. Without any selection every
	/// attribute is returned.
	pub fn select<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
		for field in fields {
			self.bindings.push(Binding::Select(field.into()));
		}
		self
	}

	/// Add a `where` clause. `operator` is one of the symbols accepted by
	/// [`Operator`]; `value` must be given exactly when the operator takes
	/// one.
	///
	/// # Errors
	/// [`Error::UnsupportedOperator`] for an unknown operator,
	/// [`Error::InvalidClause`] for a missing or superfluous value.
	pub fn where_(
		self,
		field: impl Into<String>,
		operator: &str,
		value: Option<&str>,
	) -> Result<Self, Error> {
		self.where_op(field, operator.parse()?, value)
	}

	/// [`Builder::where_`] with an already parsed operator.
	///
	/// # Errors
	/// [`Error::InvalidClause`] for a missing or superfluous value.
	pub fn where_op(
		self,
		field: impl Into<String>,
		operator: Operator,
		value: Option<&str>,
	) -> Result<Self, Error> {
		Ok(self.push(Binding::Where(Where::new(field, operator, value)?)))
	}

	/// Add an `orWhere` clause, see [`Builder::where_`].
	///
	/// # Errors
	/// [`Error::UnsupportedOperator`] for an unknown operator,
	/// [`Error::InvalidClause`] for a missing or superfluous value.
	pub fn or_where(
		self,
		field: impl Into<String>,
		operator: &str,
		value: Option<&str>,
	) -> Result<Self, Error> {
		self.or_where_op(field, operator.parse()?, value)
	}

	/// [`Builder::or_where`] with an already parsed operator.
	///
	/// # Errors
	/// [`Error::InvalidClause`] for a missing or superfluous value.
	pub fn or_where_op(
		self,
		field: impl Into<String>,
		operator: Operator,
		value: Option<&str>,
	) -> Result<Self, Error> {
		Ok(self.push(Binding::OrWhere(Where::new(field, operator, value)?)))
	}

	value_clauses! {
		Equals: where_equals, or_where_equals;
		DoesNotEqual: where_not_equals, or_where_not_equals;
		GreaterThanOrEquals: where_greater_than_or_equals, or_where_greater_than_or_equals;
		LessThanOrEquals: where_less_than_or_equals, or_where_less_than_or_equals;
		ApproximatelyEquals: where_approximately_equals, or_where_approximately_equals;
		StartsWith: where_starts_with, or_where_starts_with;
		NotStartsWith: where_not_starts_with, or_where_not_starts_with;
		EndsWith: where_ends_with, or_where_ends_with;
		NotEndsWith: where_not_ends_with, or_where_not_ends_with;
		Contains: where_contains, or_where_contains;
		NotContains: where_not_contains, or_where_not_contains;
	}

	/// Require the attribute to be present.
	pub fn where_has(self, field: impl Into<String>) -> Self {
		self.push(Binding::Where(Where::presence(field, true)))
	}

	/// Require the attribute to be absent.
	pub fn where_not_has(self, field: impl Into<String>) -> Self {
		self.push(Binding::Where(Where::presence(field, false)))
	}

	/// Match entries which have the attribute as an alternative.
	pub fn or_where_has(self, field: impl Into<String>) -> Self {
		self.push(Binding::OrWhere(Where::presence(field, true)))
	}

	/// Match entries which lack the attribute as an alternative.
	pub fn or_where_not_has(self, field: impl Into<String>) -> Self {
		self.push(Binding::OrWhere(Where::presence(field, false)))
	}

	/// Require the attribute to equal one of the values. An empty set of
	/// values matches nothing.
	pub fn where_in<S: AsRef<str>>(
		self,
		field: impl Into<String>,
		values: impl IntoIterator<Item = S>,
	) -> Self {
		let field = field.into();
		let terms: Vec<String> = values
			.into_iter()
			.map(|value| {
				let clause = Where::with_value(field.as_str(), Operator::Equals, value.as_ref());
				grammar::compile_where(&clause)
			})
			.collect();
		let filter = match terms.as_slice() {
			[] => format!("(!({}=*))", self.schema.object_class),
			[term] => term.clone(),
			terms => format!("(|{})", terms.concat()),
		};
		self.raw_filter(filter)
	}

	/// Require the attribute to lie between two values, inclusively.
	pub fn where_between(self, field: impl Into<String>, from: &str, to: &str) -> Self {
		let field = field.into();
		self.where_greater_than_or_equals(field.as_str(), from).where_less_than_or_equals(field, to)
	}

	/// Match members of a group, including members of nested groups.
	pub fn where_member_of(self, group_dn: &str) -> Self {
		let field = format!("{}:{MATCHING_RULE_IN_CHAIN}:", self.schema.member_of);
		self.where_equals(field, group_dn)
	}

	/// Match accounts which are enabled.
	pub fn where_enabled(self) -> Self {
		let field = format!("{}:{MATCHING_RULE_BIT_AND}:", self.schema.user_account_control);
		self.where_not_equals(field, ACCOUNT_DISABLED)
	}

	/// Match accounts which are disabled.
	pub fn where_disabled(self) -> Self {
		let field = format!("{}:{MATCHING_RULE_BIT_AND}:", self.schema.user_account_control);
		self.where_equals(field, ACCOUNT_DISABLED)
	}

	/// Add a literal filter, inserted into the query as given. The enclosing
	/// parentheses may be omitted.
	pub fn raw_filter(self, filter: impl Into<String>) -> Self {
		self.push(Binding::RawFilter(filter.into()))
	}

	/// Set the search base. `None` searches below the configured base DN,
	/// while an empty string searches the root of the directory.
	pub fn set_dn(mut self, dn: Option<&str>) -> Self {
		self.dn = dn.map(str::to_owned);
		self
	}

	/// Search below the given DN.
	pub fn in_dn(self, dn: &str) -> Self {
		self.set_dn(Some(dn))
	}

	/// Search the whole subtree (the default), or only the direct children
	/// of the search base.
	pub fn recursive(mut self, recursive: bool) -> Self {
		self.recursive = recursive;
		self
	}

	/// Read only the entry at the search base, regardless of
	/// [`Builder::recursive`].
	pub fn read(mut self, read: bool) -> Self {
		self.read = read;
		self
	}

	/// Return [`Model::Raw`] entries instead of typed models.
	pub fn raw(mut self, raw: bool) -> Self {
		self.raw = raw;
		self
	}

	/// Sort the results by the first value of an attribute.
	pub fn sort_by(self, field: impl Into<String>, direction: Direction) -> Self {
		self.sort_by_with(field, direction, SortFlag::Regular)
	}

	/// Sort the results by the first value of an attribute, comparing the
	/// values as `flag` describes.
	pub fn sort_by_with(
		mut self,
		field: impl Into<String>,
		direction: Direction,
		flag: SortFlag,
	) -> Self {
		self.sort = Some(Sort { field: field.into(), direction, flag });
		self
	}

	/// The clauses added so far.
	#[must_use]
	pub fn bindings(&self) -> &Bindings {
		&self.bindings
	}

	/// The schema of the query.
	#[must_use]
	pub fn schema(&self) -> &Arc<Schema> {
		&self.schema
	}

	/// The compiled filter. Queries without clauses match every entry.
	#[must_use]
	pub fn get_query(&self) -> String {
		if self.bindings.has_filters() {
			grammar::compile(&self.bindings)
		} else {
			MATCH_ALL.to_owned()
		}
	}

	/// The compiled filter with every escape sequence decoded, for display.
	#[must_use]
	pub fn get_unescaped_query(&self) -> String {
		unescape(&self.get_query())
	}

	/// The attributes requested from the server. Whenever attributes are
	/// selected explicitly, the object category and classes are requested as
	/// well so results can still be materialized.
	#[must_use]
	pub fn get_selects(&self) -> Vec<String> {
		let mut selects = self.bindings.selects.clone();
		if selects.is_empty() || selects.iter().any(|select| select == "*") {
			return selects;
		}
		for required in [&self.schema.object_category, &self.schema.object_class] {
			if !selects.iter().any(|select| select.eq_ignore_ascii_case(required)) {
				selects.push(required.clone());
			}
		}
		selects
	}

	/// The DN the query is executed against.
	#[must_use]
	pub fn get_dn(&self) -> &str {
		self.dn.as_deref().unwrap_or(&self.base_dn)
	}

	/// The scope the query is executed with.
	#[must_use]
	pub fn mode(&self) -> Mode {
		if self.read {
			Mode::Read
		} else if self.recursive {
			Mode::Search
		} else {
			Mode::Listing
		}
	}

	/// Execute the query, returning every result.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn get(mut self) -> Result<Vec<Model>, Error> {
		let response = self.execute().await?;
		self.process(response.entries).await
	}

	/// Execute the query, returning the first result.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn first(self) -> Result<Option<Model>, Error> {
		Ok(self.get().await?.into_iter().next())
	}

	/// Execute the query, failing if there is no result.
	///
	/// # Errors
	/// [`Error::RecordNotFound`] without results, or any error from the
	/// connection.
	pub async fn first_or_fail(self) -> Result<Model, Error> {
		let filter = self.get_query();
		let dn = self.get_dn().to_owned();
		self.first().await?.ok_or(Error::RecordNotFound { filter, dn })
	}

	/// Find an entry by ambiguous name resolution.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn find(self, anr: &str) -> Result<Option<Model>, Error> {
		let field = self.schema.anr.clone();
		self.find_by(&field, anr).await
	}

	/// [`Builder::find`], failing if there is no result.
	///
	/// # Errors
	/// [`Error::RecordNotFound`] without results, or any error from the
	/// connection.
	pub async fn find_or_fail(self, anr: &str) -> Result<Model, Error> {
		let field = self.schema.anr.clone();
		self.find_by_or_fail(&field, anr).await
	}

	/// Find an entry by the value of an attribute.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn find_by(self, attribute: &str, value: &str) -> Result<Option<Model>, Error> {
		self.where_equals(attribute, value).first().await
	}

	/// [`Builder::find_by`], failing if there is no result.
	///
	/// # Errors
	/// [`Error::RecordNotFound`] without results, or any error from the
	/// connection.
	pub async fn find_by_or_fail(self, attribute: &str, value: &str) -> Result<Model, Error> {
		self.where_equals(attribute, value).first_or_fail().await
	}

	/// Find the entries matching any of the values by ambiguous name
	/// resolution.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn find_many<S: AsRef<str>>(
		self,
		values: impl IntoIterator<Item = S>,
	) -> Result<Vec<Model>, Error> {
		let field = self.schema.anr.clone();
		self.find_many_by(&field, values).await
	}

	/// Find the entries whose attribute equals any of the values. No values
	/// find nothing.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn find_many_by<S: AsRef<str>>(
		self,
		attribute: &str,
		values: impl IntoIterator<Item = S>,
	) -> Result<Vec<Model>, Error> {
		let mut query = self;
		let mut any = false;
		for value in values {
			query = query.or_where_equals(attribute, value.as_ref());
			any = true;
		}
		if any {
			query.get().await
		} else {
			Ok(Vec::new())
		}
	}

	/// Read the entry with the given DN. An entry which does not exist gives
	/// `None`.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn find_by_dn(self, dn: &str) -> Result<Option<Model>, Error> {
		let object_class = self.schema.object_class.clone();
		match self.set_dn(Some(dn)).read(true).where_has(object_class).first().await {
			Err(err) if err.server_code() == Some(NO_SUCH_OBJECT) => Ok(None),
			result => result,
		}
	}

	/// [`Builder::find_by_dn`], failing if there is no such entry.
	///
	/// # Errors
	/// [`Error::RecordNotFound`] if the entry does not exist, or any error
	/// from the connection.
	pub async fn find_by_dn_or_fail(self, dn: &str) -> Result<Model, Error> {
		let clause = Where::presence(self.schema.object_class.as_str(), true);
		let filter = grammar::compile_where(&clause);
		let dn = dn.to_owned();
		self.find_by_dn(&dn).await?.ok_or(Error::RecordNotFound { filter, dn })
	}

	/// Execute the query with the simple paged results control, fetching
	/// every page of `per_page` entries. The results of all pages are merged
	/// and sorted before the paginator is positioned at `current_page`.
	///
	/// The paging control is removed from the connection once the search
	/// ends, whether it succeeded or not.
	///
	/// # Errors
	/// [`Error::Invalid`] if the page size can not be sent to the server, or
	/// any error from the connection.
	pub async fn paginate(
		mut self,
		per_page: usize,
		current_page: usize,
		critical: bool,
	) -> Result<Paginator, Error> {
		let page_size = i32::try_from(per_page)
			.ok()
			.filter(|size| *size > 0)
			.ok_or_else(|| Error::Invalid(format!("Invalid page size {per_page}")))?;

		let pages = self.execute_pages(page_size, critical).await;
		let reset = self.connection.control_paged_result(0, false, &[]).await;
		let entries = pages?;
		reset?;

		let models = self.process(entries).await?;
		Ok(Paginator::new(models, per_page, current_page))
	}

	/// Run the paged search loop until the server sends an empty cookie.
	async fn execute_pages(
		&mut self,
		page_size: i32,
		critical: bool,
	) -> Result<Vec<RawEntry>, Error> {
		let mut entries = Vec::new();
		let mut cookie = Vec::new();
		loop {
			self.connection.control_paged_result(page_size, critical, &cookie).await?;
			let response = self.execute().await?;
			cookie = response.paged_result_cookie().to_vec();
			debug!("Received page of {} entries", response.entries.len());
			entries.extend(response.entries);
			if cookie.is_empty() {
				break;
			}
		}
		Ok(entries)
	}

	/// Send the query to the server with the scope of its mode.
	async fn execute(&mut self) -> Result<SearchResponse, Error> {
		let filter = self.get_query();
		let selects = self.get_selects();
		let dn = self.get_dn().to_owned();
		let mode = self.mode();
		debug!("Executing {mode:?} in {dn:?} with filter {filter}");
		match mode {
			Mode::Read => self.connection.read(&dn, &filter, &selects).await,
			Mode::Search => self.connection.search(&dn, &filter, &selects).await,
			Mode::Listing => self.connection.listing(&dn, &filter, &selects).await,
		}
	}

	/// Materialize the search results.
	async fn process(&mut self, entries: Vec<RawEntry>) -> Result<Vec<Model>, Error> {
		Processor {
			connection: &mut *self.connection,
			schema: &self.schema,
			raw: self.raw,
			sort: self.sort.as_ref(),
		}
		.process(entries)
		.await
	}
}
