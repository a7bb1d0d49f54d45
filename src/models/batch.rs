//! Attribute-level modifications computed from a model's changes.
use crate::attributes::{Attributes, Value};

/// The kind of change applied to an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModificationKind {
	/// Add values to the attribute
	Add,
	/// Replace every value of the attribute
	Replace,
	/// Remove the given values from the attribute
	Remove,
	/// Remove the attribute with all of its values
	RemoveAll,
}

/// A single modification of one attribute, part of a batch that the
/// directory applies atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchModification {
	/// The attribute being modified
	pub attribute: String,
	/// How the attribute is modified
	pub kind: ModificationKind,
	/// Values to add, replace or remove. Empty for
	/// [`ModificationKind::RemoveAll`].
	pub values: Vec<Value>,
}

impl BatchModification {
	/// Create a modification.
	pub fn new(attribute: impl Into<String>, kind: ModificationKind, values: Vec<Value>) -> Self {
		let values = if kind == ModificationKind::RemoveAll { Vec::new() } else { values };
		Self { attribute: attribute.into(), kind, values }
	}

	/// Add values to an attribute.
	pub fn add(attribute: impl Into<String>, values: Vec<Value>) -> Self {
		Self::new(attribute, ModificationKind::Add, values)
	}

	/// Replace the values of an attribute.
	pub fn replace(attribute: impl Into<String>, values: Vec<Value>) -> Self {
		Self::new(attribute, ModificationKind::Replace, values)
	}

	/// Remove values from an attribute.
	pub fn remove(attribute: impl Into<String>, values: Vec<Value>) -> Self {
		Self::new(attribute, ModificationKind::Remove, values)
	}

	/// Remove an attribute entirely.
	pub fn remove_all(attribute: impl Into<String>) -> Self {
		Self::new(attribute, ModificationKind::RemoveAll, Vec::new())
	}
}

/// Compute the modifications turning `original` into `attributes`.
///
/// * attributes unchanged from `original` produce nothing
/// * attributes missing from `original` are added, unless they hold no
///   values, since empty values can not be sent to the server
/// * changed attributes are replaced with their non-blank values, or have
///   their original values removed when no non-blank value is left
/// * attributes removed from the map altogether are removed with all their
///   values
#[must_use]
pub fn diff(attributes: &Attributes, original: &Attributes) -> Vec<BatchModification> {
	let mut modifications = Vec::new();

	for (name, values) in attributes {
		let previous = original.get(name);
		if previous == Some(values.as_slice()) {
			continue;
		}

		let filtered: Vec<Value> =
			values.iter().filter(|value| !value.is_blank()).cloned().collect();
		match previous {
			None if filtered.is_empty() => {}
			None => modifications.push(BatchModification::add(name.as_str(), filtered)),
			Some([]) if filtered.is_empty() => {}
			Some(previous) if filtered.is_empty() => {
				modifications.push(BatchModification::remove(name.as_str(), previous.to_vec()));
			}
			Some(_) => modifications.push(BatchModification::replace(name.as_str(), filtered)),
		}
	}

	for name in original.names() {
		if !attributes.contains(name) {
			modifications.push(BatchModification::remove_all(name.as_str()));
		}
	}

	modifications
}

#[cfg(test)]
mod tests {
	use super::{diff, BatchModification};
	use crate::attributes::{Attributes, Value};

	fn attributes(pairs: &[(&str, &[&str])]) -> Attributes {
		pairs.iter().map(|(name, values)| (*name, values.to_vec())).collect()
	}

	fn values(values: &[&str]) -> Vec<Value> {
		values.iter().copied().map(Value::from).collect()
	}

	#[test]
	fn untouched_attributes_produce_nothing() {
		let original = attributes(&[("cn", &["A"])]);
		assert!(diff(&original.clone(), &original).is_empty());
		assert!(diff(&Attributes::new(), &Attributes::new()).is_empty());
	}

	#[test]
	fn changed_values_are_replaced() {
		let original = attributes(&[("cn", &["A"])]);
		let current = attributes(&[("cn", &["B"])]);
		assert_eq!(diff(&current, &original), [BatchModification::replace("cn", values(&["B"]))]);
	}

	#[test]
	fn new_attributes_are_added() {
		let original = attributes(&[("cn", &["A"])]);
		let current = attributes(&[("cn", &["A"]), ("mail", &["a@example.com"])]);
		assert_eq!(
			diff(&current, &original),
			[BatchModification::add("mail", values(&["a@example.com"]))]
		);
	}

	#[test]
	fn new_blank_attributes_are_ignored() {
		let current = attributes(&[("mail", &["", "  "])]);
		assert!(diff(&current, &Attributes::new()).is_empty());
	}

	#[test]
	fn emptied_attributes_remove_their_values() {
		let original = attributes(&[("description", &["old", "older"])]);
		let current = attributes(&[("description", &[""])]);
		assert_eq!(
			diff(&current, &original),
			[BatchModification::remove("description", values(&["old", "older"]))]
		);
	}

	#[test]
	fn removed_attributes_are_cleared() {
		let original = attributes(&[("cn", &["A"]), ("description", &["old"])]);
		let current = attributes(&[("cn", &["A"])]);
		let modifications = diff(&current, &original);
		assert_eq!(modifications, [BatchModification::remove_all("description")]);
		assert!(modifications[0].values.is_empty());
	}

	#[test]
	fn reordered_values_are_replaced() {
		let original = attributes(&[("member", &["cn=a", "cn=b"])]);
		let current = attributes(&[("member", &["cn=b", "cn=a"])]);
		assert_eq!(
			diff(&current, &original),
			[BatchModification::replace("member", values(&["cn=b", "cn=a"]))]
		);
	}

	#[test]
	fn diff_is_repeatable() {
		let original = attributes(&[("cn", &["A"])]);
		let current = attributes(&[("cn", &["B"]), ("sn", &["C"])]);
		assert_eq!(diff(&current, &original), diff(&current, &original));
	}
}
