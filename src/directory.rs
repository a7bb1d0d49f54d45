//! The entry point tying a connection to its schema and base DN.
use std::sync::Arc;

use crate::{
	config::Config,
	connection::Connection,
	error::Error,
	ldap::LdapConnection,
	query::Builder,
	schema::Schema,
};

/// A directory: the connection queries are executed on, the names of its
/// attributes and the DN searched when a query does not name one.
#[derive(Debug)]
pub struct Directory<C> {
	/// The connection to the server
	connection: C,
	/// Attribute and object class names
	schema: Arc<Schema>,
	/// Default search base
	base_dn: String,
}

impl Directory<LdapConnection> {
	/// Connect to the server named in the configuration, binding with the
	/// configured credentials if there are any.
	///
	/// # Errors
	/// Any error establishing the connection or binding.
	pub async fn connect(config: &Config) -> Result<Self, Error> {
		let connection = LdapConnection::connect(config).await?;
		Ok(Self::new(connection, config.base_dn.clone()).with_schema(config.schema.clone()))
	}
}

impl<C: Connection> Directory<C> {
	/// Wrap a connection, using the Active Directory schema.
	#[must_use]
	pub fn new(connection: C, base_dn: impl Into<String>) -> Self {
		Self { connection, schema: Arc::new(Schema::default()), base_dn: base_dn.into() }
	}

	/// Use a different schema.
	#[must_use]
	pub fn with_schema(mut self, schema: Schema) -> Self {
		self.schema = Arc::new(schema);
		self
	}

	/// Start a query below the base DN.
	pub fn search(&mut self) -> Builder<'_, C> {
		Builder::new(&mut self.connection, self.schema.clone(), self.base_dn.as_str())
	}

	/// Start a query for user accounts.
	pub fn users(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search()
			.where_equals(schema.object_category.as_str(), &schema.object_category_person)
			.where_equals(schema.object_class.as_str(), &schema.object_class_user)
	}

	/// Start a query for groups.
	pub fn groups(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search().where_equals(schema.object_class.as_str(), &schema.object_class_group)
	}

	/// Start a query for computer accounts.
	pub fn computers(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search()
			.where_equals(schema.object_category.as_str(), &schema.object_category_computer)
	}

	/// Start a query for contacts.
	pub fn contacts(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search().where_equals(schema.object_class.as_str(), &schema.object_class_contact)
	}

	/// Start a query for printers.
	pub fn printers(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search().where_equals(schema.object_class.as_str(), &schema.object_class_printer)
	}

	/// Start a query for organizational units.
	pub fn organizational_units(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search().where_equals(
			schema.object_category.as_str(),
			&schema.object_category_organizational_unit,
		)
	}

	/// Start a query for containers.
	pub fn containers(&mut self) -> Builder<'_, C> {
		let schema = self.schema.clone();
		self.search()
			.where_equals(schema.object_category.as_str(), &schema.object_category_container)
	}

	/// The connection.
	#[must_use]
	pub fn connection(&self) -> &C {
		&self.connection
	}

	/// The connection, for model operations and requests the query builder
	/// does not cover.
	pub fn connection_mut(&mut self) -> &mut C {
		&mut self.connection
	}

	/// The schema.
	#[must_use]
	pub fn schema(&self) -> &Arc<Schema> {
		&self.schema
	}

	/// The default search base.
	#[must_use]
	pub fn base_dn(&self) -> &str {
		&self.base_dn
	}

	/// Unwrap the connection.
	#[must_use]
	pub fn into_connection(self) -> C {
		self.connection
	}
}
