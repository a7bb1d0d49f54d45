//! Compilation of query clauses into an RFC 4515 search filter.
use crate::query::{
	binding::{Bindings, Where},
	operator::{Operator, AND, NOT, OR},
};

/// Compile the clauses into a filter string.
///
/// Literal filters come first, then `where` clauses, then the `orWhere`
/// clauses. The `orWhere` clauses are grouped in an OR when there are several
/// of them, or when they are combined with other clauses. The result is
/// wrapped in an AND when more than one `where`/literal clause is present, or
/// when a single one is combined with `orWhere` clauses, so the filter always
/// has exactly one top-level term.
///
/// Literal filters count like `where` clauses for the AND rule: one literal
/// filter with a single `orWhere` compiles to `(&(literal)(|(or)))`.
#[must_use]
pub fn compile(bindings: &Bindings) -> String {
	let mut query: String = bindings.filters.iter().map(String::as_str).map(parenthesize).collect();
	for clause in &bindings.wheres {
		query.push_str(&compile_where(clause));
	}

	let total = bindings.wheres.len() + bindings.filters.len();
	let ors = &bindings.or_wheres;
	if !ors.is_empty() {
		let or: String = ors.iter().map(compile_where).collect();
		if ors.len() > 1 || total > 0 {
			query.push_str(&wrap(OR, &or));
		} else {
			query.push_str(&or);
		}
	}

	if total > 1 || (total == 1 && !ors.is_empty()) {
		query = wrap(AND, &query);
	}
	query
}

/// Compile a single clause into a parenthesized filter term.
#[must_use]
pub fn compile_where(clause: &Where) -> String {
	let field = clause.field();
	let value = clause.value().unwrap_or_default();
	let token = clause.operator().token();
	match clause.operator() {
		Operator::Equals
		| Operator::GreaterThanOrEquals
		| Operator::LessThanOrEquals
		| Operator::ApproximatelyEquals => format!("({field}{token}{value})"),
		Operator::DoesNotEqual => not(&format!("({field}={value})")),
		Operator::StartsWith => format!("({field}={value}*)"),
		Operator::NotStartsWith => not(&format!("({field}={value}*)")),
		Operator::EndsWith => format!("({field}=*{value})"),
		Operator::NotEndsWith => not(&format!("({field}=*{value})")),
		Operator::Contains => format!("({field}=*{value}*)"),
		Operator::NotContains => not(&format!("({field}=*{value}*)")),
		Operator::Has => format!("({field}=*)"),
		Operator::NotHas => not(&format!("({field}=*)")),
	}
}

/// Wrap filter terms with a logical operator.
fn wrap(operator: &str, terms: &str) -> String {
	format!("({operator}{terms})")
}

/// Negate a filter term.
fn not(term: &str) -> String {
	wrap(NOT, term)
}

/// Literal filters may be given without their enclosing parentheses.
fn parenthesize(filter: &str) -> String {
	if filter.starts_with('(') && filter.ends_with(')') {
		filter.to_owned()
	} else {
		format!("({filter})")
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::{compile, compile_where};
	use crate::query::{
		binding::{Binding, Bindings, Where},
		operator::Operator,
	};

	fn clause(field: &str, operator: Operator, value: Option<&str>) -> Where {
		Where::new(field, operator, value).unwrap()
	}

	fn equals(field: &str, value: &str) -> Where {
		clause(field, Operator::Equals, Some(value))
	}

	fn query(bindings: impl IntoIterator<Item = Binding>) -> String {
		compile(&bindings.into_iter().collect::<Bindings>())
	}

	#[test]
	fn every_operator() {
		let cases = [
			(Operator::Equals, Some("v"), "(f=v)"),
			(Operator::DoesNotEqual, Some("v"), "(!(f=v))"),
			(Operator::GreaterThanOrEquals, Some("v"), "(f>=v)"),
			(Operator::LessThanOrEquals, Some("v"), "(f<=v)"),
			(Operator::ApproximatelyEquals, Some("v"), "(f~=v)"),
			(Operator::StartsWith, Some("v"), "(f=v*)"),
			(Operator::NotStartsWith, Some("v"), "(!(f=v*))"),
			(Operator::EndsWith, Some("v"), "(f=*v)"),
			(Operator::NotEndsWith, Some("v"), "(!(f=*v))"),
			(Operator::Contains, Some("v"), "(f=*v*)"),
			(Operator::NotContains, Some("v"), "(!(f=*v*))"),
			(Operator::Has, None, "(f=*)"),
			(Operator::NotHas, None, "(!(f=*))"),
		];
		for (operator, value, expected) in cases {
			assert_eq!(compile_where(&clause("f", operator, value)), expected, "{operator:?}");
			assert_eq!(query([Binding::Where(clause("f", operator, value))]), expected);
		}
		assert_eq!(query([Binding::Where(equals("cn", "John"))]), "(cn=John)");
	}

	#[test]
	fn empty_query() {
		assert_eq!(query([]), "");
		assert_eq!(query([Binding::Select("cn".to_owned())]), "");
	}

	#[test]
	fn where_combinations() {
		assert_eq!(query([Binding::Where(equals("a", "1"))]), "(a=1)");
		assert_eq!(
			query([Binding::Where(equals("a", "1")), Binding::Where(equals("b", "2"))]),
			"(&(a=1)(b=2))"
		);
		assert_eq!(
			query([
				Binding::Where(equals("a", "1")),
				Binding::Where(equals("b", "2")),
				Binding::Where(equals("c", "3")),
			]),
			"(&(a=1)(b=2)(c=3))"
		);
	}

	#[test]
	fn or_where_without_where() {
		assert_eq!(query([Binding::OrWhere(equals("b", "2"))]), "(b=2)");
		assert_eq!(
			query([Binding::OrWhere(equals("b", "2")), Binding::OrWhere(equals("c", "3"))]),
			"(|(b=2)(c=3))"
		);
	}

	#[test]
	fn or_where_with_one_where() {
		assert_eq!(
			query([Binding::Where(equals("a", "1")), Binding::OrWhere(equals("b", "2"))]),
			"(&(a=1)(|(b=2)))"
		);
		assert_eq!(
			query([
				Binding::Where(equals("a", "1")),
				Binding::OrWhere(equals("b", "2")),
				Binding::OrWhere(equals("c", "3")),
			]),
			"(&(a=1)(|(b=2)(c=3)))"
		);
	}

	#[test]
	fn or_where_with_several_wheres() {
		assert_eq!(
			query([
				Binding::Where(equals("a", "1")),
				Binding::Where(equals("b", "2")),
				Binding::OrWhere(equals("c", "3")),
			]),
			"(&(a=1)(b=2)(|(c=3)))"
		);
		assert_eq!(
			query([
				Binding::Where(equals("a", "1")),
				Binding::Where(equals("b", "2")),
				Binding::OrWhere(equals("c", "3")),
				Binding::OrWhere(equals("d", "4")),
			]),
			"(&(a=1)(b=2)(|(c=3)(d=4)))"
		);
	}

	#[test]
	fn raw_filters() {
		assert_eq!(query([Binding::RawFilter("(cn=John)".to_owned())]), "(cn=John)");
		assert_eq!(query([Binding::RawFilter("cn=John".to_owned())]), "(cn=John)");
		assert_eq!(
			query([Binding::Where(equals("a", "1")), Binding::RawFilter("(r=x)".to_owned())]),
			"(&(r=x)(a=1))",
			"Raw filters come before where clauses"
		);
		assert_eq!(
			query([Binding::RawFilter("(r=x)".to_owned()), Binding::OrWhere(equals("b", "2"))]),
			"(&(r=x)(|(b=2)))",
			"A raw filter counts like a where clause"
		);
	}

	#[test]
	fn escaped_values_stay_escaped() {
		let filter = query([Binding::Where(equals("cn", "*)(uid=*"))]);
		assert_eq!(filter, "(cn=\\2a\\29\\28uid=\\2a)");
	}
}
