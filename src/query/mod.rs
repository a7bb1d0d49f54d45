//! Building search filters and executing them.
//!
//! A [`Builder`] collects [`Binding`]s through its fluent methods. When the
//! query is executed, the bindings are compiled into an RFC 4515 filter by
//! [`grammar::compile`], sent over the [`Connection`](crate::connection::Connection)
//! with the scope of the builder's [`Mode`], and the entries returned are
//! materialized as [`Model`](crate::models::Model)s.
mod binding;
mod builder;
pub mod escape;
pub mod grammar;
mod operator;
mod paginator;
mod processor;

pub use self::{
	binding::{Binding, Bindings, Where},
	builder::{Builder, Mode},
	escape::{escape, escape_dn, unescape},
	operator::{Operator, AND, NOT, OR},
	paginator::Paginator,
	processor::{Direction, Sort, SortFlag},
};

/// The filter matching every entry, used for queries without clauses.
pub const MATCH_ALL: &str = "(objectclass=*)";
