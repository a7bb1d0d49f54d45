//! Helpers for working with distinguished names.
use crate::query::escape::escape_dn;

/// Split a distinguished name into its relative distinguished names, honoring
/// backslash escapes.
#[must_use]
pub fn components(dn: &str) -> Vec<&str> {
	if dn.is_empty() {
		return Vec::new();
	}

	let mut components = Vec::new();
	let mut start = 0;
	let mut escaped = false;
	for (i, ch) in dn.char_indices() {
		match ch {
			_ if escaped => escaped = false,
			'\\' => escaped = true,
			',' => {
				components.push(dn[start..i].trim());
				start = i + 1;
			}
			_ => {}
		}
	}
	components.push(dn[start..].trim());
	components
}

/// The first relative distinguished name, e.g. `cn=John Doe`.
#[must_use]
pub fn rdn(dn: &str) -> Option<&str> {
	components(dn).into_iter().next().filter(|rdn| !rdn.is_empty())
}

/// The distinguished name of the parent entry.
#[must_use]
pub fn parent(dn: &str) -> Option<String> {
	let components = components(dn);
	if components.len() < 2 {
		return None;
	}
	Some(components[1..].join(","))
}

/// The number of components, used for ordering entries by depth.
#[must_use]
pub fn depth(dn: &str) -> usize {
	components(dn).len()
}

/// Build a distinguished name from an attribute, its unescaped value and the
/// parent entry.
#[must_use]
pub fn build(attribute: &str, value: &str, parent: &str) -> String {
	if parent.is_empty() {
		format!("{attribute}={}", escape_dn(value))
	} else {
		format!("{attribute}={},{parent}", escape_dn(value))
	}
}

#[cfg(test)]
mod tests {
	use super::{build, components, depth, parent, rdn};

	#[test]
	fn splits_components() {
		assert_eq!(
			components("cn=Doe\\, John,ou=Users, dc=example,dc=com"),
			["cn=Doe\\, John", "ou=Users", "dc=example", "dc=com"]
		);
		assert!(components("").is_empty());
		assert_eq!(depth("dc=example,dc=com"), 2);
	}

	#[test]
	fn rdn_and_parent() {
		let dn = "cn=John Doe,ou=Users,dc=example,dc=com";
		assert_eq!(rdn(dn), Some("cn=John Doe"));
		assert_eq!(parent(dn).as_deref(), Some("ou=Users,dc=example,dc=com"));
		assert_eq!(parent("dc=com"), None);
		assert_eq!(rdn(""), None);
	}

	#[test]
	fn builds_escaped_names() {
		assert_eq!(
			build("cn", "Doe, John", "ou=Users,dc=example,dc=com"),
			"cn=Doe\\, John,ou=Users,dc=example,dc=com"
		);
		assert_eq!(build("dc", "com", ""), "dc=com");
	}
}
