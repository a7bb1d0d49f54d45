//! Build LDAP search filters fluently and work with directory entries as
//! typed, change-tracked models.
//!
//! Queries are assembled with a [`Builder`](query::Builder), compiled into an
//! RFC 4515 filter and executed through a [`Connection`](connection::Connection).
//! The entries returned are materialized as [`Model`](models::Model)s based on
//! their object classes: users, groups, computers, contacts, containers,
//! printers, organizational units, or generic entries. Models remember the
//! attributes they were loaded with, so saving one sends only the
//! modifications that were made. The attribute and object class names follow
//! Active Directory by default and can be changed through the
//! [`Schema`](schema::Schema).
//!
//! For a general primer on LDAP, the [introduction] in the `ldap3` crate which
//! is used here for interfacing with LDAP is an excellent resource.
//!
//! [introduction]: https://github.com/inejge/ldap3/blob/master/LDAP-primer.md
//!
//! # Getting started
//! A minimal example of finding and updating a user might look like so:
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use url::Url;
//! use ldap_orm::{
//!     config::{Config, ConnectionConfig},
//!     directory::Directory,
//!     models::Model,
//!     query::{Direction, SortFlag},
//!     schema::Schema,
//! };
//!
//! // Configuration can also be deserialized with serde. It's hand-constructed
//! // here for demonstration purposes.
//! let config = Config {
//!     url: Url::parse("ldaps://dc.example.com")?,
//!     connection: ConnectionConfig::default(),
//!     bind_dn: Some("cn=admin,dc=example,dc=com".to_owned()),
//!     bind_password: Some("verysecret".to_owned()),
//!     base_dn: "dc=example,dc=com".to_owned(),
//!     schema: Schema::default(),
//! };
//! let mut directory = Directory::connect(&config).await?;
//!
//! let users = directory
//!     .users()
//!     .where_starts_with("cn", "John")
//!     .or_where_equals("mail", "john@example.com")
//!     .sort_by_with("cn", Direction::Ascending, SortFlag::Natural)
//!     .get()
//!     .await?;
//!
//! for mut user in users.into_iter().filter_map(Model::into_user) {
//!     user.set_first_attribute("description", "Found by the example");
//!     user.save(directory.connection_mut()).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Limitations
//! * Queries are sent one at a time over a single connection, there is no
//!   connection pooling.
//! * Only simple binds are supported.

pub mod attributes;
pub mod config;
pub mod connection;
pub mod convert;
pub mod directory;
pub mod dn;
pub mod entry;
pub mod error;
pub mod ldap;
pub mod models;
pub mod query;
pub mod schema;

pub use crate::{
	connection::Connection,
	directory::Directory,
	error::Error,
	ldap::LdapConnection,
	models::{Entry, Model},
	query::Builder,
};
