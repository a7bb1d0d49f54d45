//! Directory entries as returned by a search, before model materialization.
use ldap3::SearchEntry;

use crate::attributes::{Attributes, Value};

/// A single entry returned by the directory: its distinguished name and its
/// attributes. Text and binary attributes share one map, and attribute names
/// are folded to lower case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
	/// Distinguished name of the entry
	pub dn: String,
	/// Attributes of the entry
	pub attributes: Attributes,
}

impl RawEntry {
	/// Create an entry from a distinguished name and its attributes.
	pub fn new(dn: impl Into<String>, attributes: Attributes) -> Self {
		Self { dn: dn.into(), attributes }
	}

	/// Get the first value of an attribute. Will return `None` if attribute
	/// value is not valid UTF-8.
	#[must_use]
	pub fn attr_first(&self, attr: &str) -> Option<&str> {
		self.attributes.first_str(attr)
	}

	/// Get the first value of an attribute, in binary form
	#[must_use]
	pub fn bin_attr_first(&self, attr: &str) -> Option<&[u8]> {
		self.attributes.first(attr).map(Value::as_bytes)
	}
}

impl From<SearchEntry> for RawEntry {
	fn from(entry: SearchEntry) -> Self {
		let mut attributes: Attributes = entry.attrs.into_iter().collect();
		for (name, values) in entry.bin_attrs {
			for value in values {
				attributes.push(&name, value);
			}
		}
		Self { dn: entry.dn, attributes }
	}
}
