//! The clauses a query is assembled from.
use crate::{
	error::Error,
	query::{escape::escape, operator::Operator},
};

/// A comparison of one attribute. The value is stored escaped for use in a
/// filter, and is absent exactly when the operator takes none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Where {
	/// Attribute being compared
	field: String,
	/// Comparison to perform
	operator: Operator,
	/// Escaped comparison value
	value: Option<String>,
}

impl Where {
	/// Create a clause, escaping the value.
	///
	/// # Errors
	/// [`Error::InvalidClause`] if a value is given to an operator that takes
	/// none, or no value is given to one that requires it.
	pub fn new(
		field: impl Into<String>,
		operator: Operator,
		value: Option<&str>,
	) -> Result<Self, Error> {
		let field = field.into();
		match (operator.takes_value(), value) {
			(true, None) => Err(Error::InvalidClause(format!(
				"operator `{operator}` on `{field}` requires a value"
			))),
			(false, Some(value)) => Err(Error::InvalidClause(format!(
				"operator `{operator}` on `{field}` takes no value, got {value:?}"
			))),
			_ => Ok(Self { field, operator, value: value.map(escape) }),
		}
	}

	/// Create a clause with a value, for operators known to take one.
	pub(crate) fn with_value(field: impl Into<String>, operator: Operator, value: &str) -> Self {
		debug_assert!(operator.takes_value());
		Self { field: field.into(), operator, value: Some(escape(value)) }
	}

	/// Create a presence clause.
	pub(crate) fn presence(field: impl Into<String>, present: bool) -> Self {
		let operator = if present { Operator::Has } else { Operator::NotHas };
		Self { field: field.into(), operator, value: None }
	}

	/// The attribute being compared.
	#[must_use]
	pub fn field(&self) -> &str {
		&self.field
	}

	/// The comparison performed.
	#[must_use]
	pub fn operator(&self) -> Operator {
		self.operator
	}

	/// The escaped comparison value.
	#[must_use]
	pub fn value(&self) -> Option<&str> {
		self.value.as_deref()
	}
}

/// One clause of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
	/// An attribute to return from the search
	Select(String),
	/// A comparison every result must satisfy
	Where(Where),
	/// A comparison of which at least one must be satisfied
	OrWhere(Where),
	/// A literal filter, inserted as given
	RawFilter(String),
}

/// The clauses of a query, grouped by kind in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
	/// Selected attributes
	pub selects: Vec<String>,
	/// `where` clauses
	pub wheres: Vec<Where>,
	/// `orWhere` clauses
	pub or_wheres: Vec<Where>,
	/// Literal filters
	pub filters: Vec<String>,
}

impl Bindings {
	/// Add a clause.
	pub fn push(&mut self, binding: Binding) {
		match binding {
			Binding::Select(field) => self.selects.push(field),
			Binding::Where(clause) => self.wheres.push(clause),
			Binding::OrWhere(clause) => self.or_wheres.push(clause),
			Binding::RawFilter(filter) => self.filters.push(filter),
		}
	}

	/// Whether any clause restricting the results is present.
	#[must_use]
	pub fn has_filters(&self) -> bool {
		!(self.wheres.is_empty() && self.or_wheres.is_empty() && self.filters.is_empty())
	}
}

impl FromIterator<Binding> for Bindings {
	fn from_iter<T: IntoIterator<Item = Binding>>(iter: T) -> Self {
		let mut bindings = Bindings::default();
		for binding in iter {
			bindings.push(binding);
		}
		bindings
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::Where;
	use crate::{error::Error, query::operator::Operator};

	#[test]
	fn values_are_escaped() {
		let clause = Where::new("cn", Operator::Equals, Some("John (Admin)*")).unwrap();
		assert_eq!(clause.value(), Some("John \\28Admin\\29\\2a"));
	}

	#[test]
	fn presence_takes_no_value() {
		assert!(matches!(
			Where::new("mail", Operator::Has, Some("x")),
			Err(Error::InvalidClause(_))
		));
		assert!(matches!(
			Where::new("mail", Operator::NotHas, Some("")),
			Err(Error::InvalidClause(_))
		));
		assert_eq!(Where::new("mail", Operator::Has, None).unwrap(), Where::presence("mail", true));
	}

	#[test]
	fn comparisons_require_a_value() {
		assert!(matches!(Where::new("cn", Operator::Equals, None), Err(Error::InvalidClause(_))));
		assert!(Where::new("cn", Operator::Equals, Some("")).is_ok());
	}
}
