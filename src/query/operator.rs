//! Comparison operators usable in `where` clauses.
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Token joining the terms of a filter with a logical AND.
pub const AND: &str = "&";
/// Token joining the terms of a filter with a logical OR.
pub const OR: &str = "|";
/// Token negating a filter term.
pub const NOT: &str = "!";

/// A comparison between an attribute and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
	/// The attribute is present (`*`)
	Has,
	/// The attribute is absent (`!*`)
	NotHas,
	/// Equality (`=`)
	Equals,
	/// Negated equality (`!` or `!=`)
	DoesNotEqual,
	/// `>=`
	GreaterThanOrEquals,
	/// `<=`
	LessThanOrEquals,
	/// Approximate match (`~=`)
	ApproximatelyEquals,
	/// Substring match on the start of the value
	StartsWith,
	/// Negated [`Operator::StartsWith`]
	NotStartsWith,
	/// Substring match on the end of the value
	EndsWith,
	/// Negated [`Operator::EndsWith`]
	NotEndsWith,
	/// Substring match anywhere in the value
	Contains,
	/// Negated [`Operator::Contains`]
	NotContains,
}

impl Operator {
	/// Every supported operator.
	pub const ALL: [Operator; 13] = [
		Operator::Has,
		Operator::NotHas,
		Operator::Equals,
		Operator::DoesNotEqual,
		Operator::GreaterThanOrEquals,
		Operator::LessThanOrEquals,
		Operator::ApproximatelyEquals,
		Operator::StartsWith,
		Operator::NotStartsWith,
		Operator::EndsWith,
		Operator::NotEndsWith,
		Operator::Contains,
		Operator::NotContains,
	];

	/// The symbol the operator is written as in `where` clauses.
	#[must_use]
	pub fn symbol(self) -> &'static str {
		match self {
			Operator::Has => "*",
			Operator::NotHas => "!*",
			Operator::Equals => "=",
			Operator::DoesNotEqual => "!",
			Operator::GreaterThanOrEquals => ">=",
			Operator::LessThanOrEquals => "<=",
			Operator::ApproximatelyEquals => "~=",
			Operator::StartsWith => "starts_with",
			Operator::NotStartsWith => "not_starts_with",
			Operator::EndsWith => "ends_with",
			Operator::NotEndsWith => "not_ends_with",
			Operator::Contains => "contains",
			Operator::NotContains => "not_contains",
		}
	}

	/// The filter token placed between attribute and value.
	#[must_use]
	pub fn token(self) -> &'static str {
		match self {
			Operator::GreaterThanOrEquals => ">=",
			Operator::LessThanOrEquals => "<=",
			Operator::ApproximatelyEquals => "~=",
			_ => "=",
		}
	}

	/// Whether a clause using this operator requires a value.
	#[must_use]
	pub fn takes_value(self) -> bool {
		!matches!(self, Operator::Has | Operator::NotHas)
	}
}

impl FromStr for Operator {
	type Err = Error;

	fn from_str(symbol: &str) -> Result<Self, Self::Err> {
		if symbol == "!=" {
			return Ok(Operator::DoesNotEqual);
		}
		Operator::ALL
			.into_iter()
			.find(|operator| operator.symbol() == symbol)
			.ok_or_else(|| Error::UnsupportedOperator(symbol.to_owned()))
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol())
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::Operator;
	use crate::error::Error;

	#[test]
	fn parse_symbols() {
		for operator in Operator::ALL {
			assert_eq!(operator.symbol().parse::<Operator>().unwrap(), operator);
		}
		assert_eq!("!=".parse::<Operator>().unwrap(), Operator::DoesNotEqual);
	}

	#[test]
	fn unsupported_symbols() {
		for symbol in ["==", "&", "|", "like", ""] {
			assert!(
				matches!(
					symbol.parse::<Operator>(),
					Err(Error::UnsupportedOperator(s)) if s == symbol
				),
				"{symbol:?} should be rejected"
			);
		}
	}

	#[test]
	fn tokens() {
		assert_eq!(Operator::StartsWith.token(), "=");
		assert_eq!(Operator::ApproximatelyEquals.token(), "~=");
		assert!(!Operator::NotHas.takes_value());
		assert!(Operator::Contains.takes_value());
	}
}
