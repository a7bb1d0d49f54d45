//! Case-insensitive storage for multi-valued directory attributes.
use std::collections::{btree_map, BTreeMap};

/// A single attribute value as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
	/// A value which is valid UTF-8
	Text(String),
	/// A binary value, e.g. `objectGUID` or `unicodePwd`
	Binary(Vec<u8>),
}

impl Value {
	/// The value as a string, if it is valid UTF-8.
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Text(text) => Some(text),
			Value::Binary(bytes) => std::str::from_utf8(bytes).ok(),
		}
	}

	/// The raw bytes of the value.
	#[must_use]
	pub fn as_bytes(&self) -> &[u8] {
		match self {
			Value::Text(text) => text.as_bytes(),
			Value::Binary(bytes) => bytes,
		}
	}

	/// Whether the value carries no data. Text consisting only of whitespace
	/// counts as blank, since the directory rejects it.
	#[must_use]
	pub fn is_blank(&self) -> bool {
		match self {
			Value::Text(text) => text.trim().is_empty(),
			Value::Binary(bytes) => bytes.is_empty(),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Text(value.to_owned())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Text(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Value::Binary(value)
	}
}

impl From<&[u8]> for Value {
	fn from(value: &[u8]) -> Self {
		Value::Binary(value.to_vec())
	}
}

/// Attribute map keyed by lower-cased attribute name. Directory attribute
/// names are case-insensitive, so every lookup and insertion folds the key.
/// Values keep the order the server sent them in and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, Vec<Value>>);

/// Fold an attribute name into its canonical map key.
fn key(name: &str) -> String {
	name.to_ascii_lowercase()
}

impl Attributes {
	/// Create an empty attribute map.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// All values of an attribute.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&[Value]> {
		self.0.get(&key(name)).map(Vec::as_slice)
	}

	/// The first value of an attribute.
	#[must_use]
	pub fn first(&self, name: &str) -> Option<&Value> {
		self.get(name)?.first()
	}

	/// The first value of an attribute as a string. Will return `None` if the
	/// value is not valid UTF-8.
	#[must_use]
	pub fn first_str(&self, name: &str) -> Option<&str> {
		self.first(name)?.as_str()
	}

	/// Every value of an attribute which is valid UTF-8.
	#[must_use]
	pub fn strings(&self, name: &str) -> Vec<&str> {
		self.get(name)
			.map(|values| values.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default()
	}

	/// Replace all values of an attribute, returning the previous values.
	pub fn insert<V: Into<Value>>(
		&mut self,
		name: &str,
		values: impl IntoIterator<Item = V>,
	) -> Option<Vec<Value>> {
		self.0.insert(key(name), values.into_iter().map(Into::into).collect())
	}

	/// Append a value to an attribute, creating it if needed.
	pub fn push(&mut self, name: &str, value: impl Into<Value>) {
		self.0.entry(key(name)).or_default().push(value.into());
	}

	/// Remove an attribute entirely.
	pub fn remove(&mut self, name: &str) -> Option<Vec<Value>> {
		self.0.remove(&key(name))
	}

	/// Whether the attribute is present at all (possibly without values).
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(&key(name))
	}

	/// Number of attributes.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether there are no attributes.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterate over the (lower-cased) attribute names and their values.
	pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<Value>> {
		self.0.iter()
	}

	/// Iterate over the lower-cased attribute names.
	pub fn names(&self) -> btree_map::Keys<'_, String, Vec<Value>> {
		self.0.keys()
	}
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, Vec<V>)> for Attributes {
	fn from_iter<T: IntoIterator<Item = (K, Vec<V>)>>(iter: T) -> Self {
		let mut attributes = Attributes::new();
		for (name, values) in iter {
			attributes
				.0
				.entry(key(name.as_ref()))
				.or_default()
				.extend(values.into_iter().map(Into::into));
		}
		attributes
	}
}

impl IntoIterator for Attributes {
	type Item = (String, Vec<Value>);
	type IntoIter = btree_map::IntoIter<String, Vec<Value>>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Attributes {
	type Item = (&'a String, &'a Vec<Value>);
	type IntoIter = btree_map::Iter<'a, String, Vec<Value>>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use super::{Attributes, Value};

	#[test]
	fn keys_are_case_insensitive() {
		let mut attributes = Attributes::new();
		attributes.insert("sAMAccountName", ["jdoe"]);

		assert_eq!(attributes.first_str("samaccountname"), Some("jdoe"));
		assert_eq!(attributes.first_str("SAMACCOUNTNAME"), Some("jdoe"));
		assert!(attributes.contains("SamAccountName"));
		assert_eq!(attributes.names().collect::<Vec<_>>(), ["samaccountname"]);
	}

	#[test]
	fn values_keep_order_and_duplicates() {
		let pairs = [("member", vec!["cn=b", "cn=a", "cn=b"]), ("MEMBER", vec!["cn=c"])];
		let attributes: Attributes = pairs.into_iter().collect();

		assert_eq!(attributes.strings("member"), ["cn=b", "cn=a", "cn=b", "cn=c"]);
	}

	#[test]
	fn binary_values() {
		let mut attributes = Attributes::new();
		attributes.push("objectGUID", vec![0xff_u8, 0x00]);
		attributes.push("cn", "John");

		assert_eq!(attributes.first_str("objectguid"), None, "Invalid UTF-8 has no string form");
		assert_eq!(attributes.first("objectguid").unwrap().as_bytes(), [0xff, 0x00]);
		assert_eq!(attributes.first("cn"), Some(&Value::from("John")));
		assert!(Value::from("  ").is_blank());
		assert!(!Value::from(vec![0_u8]).is_blank());
	}
}
