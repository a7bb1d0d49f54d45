//! Escaping of values embedded in search filters and distinguished names.

/// Escape a value for use in a search filter as described in RFC 4515.
/// The characters `\`, `*`, `(`, `)` and NUL are replaced by their
/// hexadecimal `\xx` form.
#[must_use]
pub fn escape(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for ch in value.chars() {
		match ch {
			'\\' => escaped.push_str("\\5c"),
			'*' => escaped.push_str("\\2a"),
			'(' => escaped.push_str("\\28"),
			')' => escaped.push_str("\\29"),
			'\0' => escaped.push_str("\\00"),
			_ => escaped.push(ch),
		}
	}
	escaped
}

/// Reverse [`escape`]: every `\xx` hexadecimal sequence is decoded into the
/// byte it represents. Sequences which are not valid hexadecimal are kept as
/// they are.
#[must_use]
pub fn unescape(value: &str) -> String {
	let bytes = value.as_bytes();
	let mut decoded = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'\\' {
			if let Some(byte) = bytes.get(i + 1..i + 3).and_then(decode_hex) {
				decoded.push(byte);
				i += 3;
				continue;
			}
		}
		decoded.push(bytes[i]);
		i += 1;
	}
	String::from_utf8_lossy(&decoded).into_owned()
}

/// Decode two hexadecimal digits into a byte.
fn decode_hex(hex: &[u8]) -> Option<u8> {
	if !hex.iter().all(u8::is_ascii_hexdigit) {
		return None;
	}
	u8::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()
}

/// Escape an attribute value for use in a distinguished name as described in
/// RFC 4514.
#[must_use]
pub fn escape_dn(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len() * 2);
	let last = value.chars().count().saturating_sub(1);
	for (i, ch) in value.chars().enumerate() {
		match ch {
			',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
				escaped.push('\\');
				escaped.push(ch);
			}
			'\0' => escaped.push_str("\\00"),
			' ' if i == 0 || i == last => escaped.push_str("\\20"),
			'#' if i == 0 => escaped.push_str("\\23"),
			_ => escaped.push(ch),
		}
	}
	escaped
}

#[cfg(test)]
mod tests {
	use super::{escape, escape_dn, unescape};

	#[test]
	fn escapes_filter_metacharacters() {
		assert_eq!(escape("John Doe"), "John Doe");
		assert_eq!(escape("John*"), "John\\2a");
		assert_eq!(escape("(admin)"), "\\28admin\\29");
		assert_eq!(escape("a\\b"), "a\\5cb");
		assert_eq!(escape("a\0b"), "a\\00b");
	}

	#[test]
	fn escape_is_stable_over_unescape() {
		for input in ["plain", "*", "\\", "(x)", "a\0b", "\\2a", "mixed\\*()\0 ünïcode", ""] {
			let escaped = escape(input);
			assert_eq!(unescape(&escaped), input);
			assert_eq!(escape(&unescape(&escaped)), escaped);
			for metacharacter in ['*', '(', ')', '\0'] {
				assert!(!escaped.contains(metacharacter), "{escaped:?} contains {metacharacter:?}");
			}
		}
	}

	#[test]
	fn unescape_keeps_invalid_sequences() {
		assert_eq!(unescape("\\zz"), "\\zz");
		assert_eq!(unescape("trailing\\"), "trailing\\");
		assert_eq!(unescape("\\4a\\6f\\68\\6e"), "John");
	}

	#[test]
	fn escapes_dn_values() {
		assert_eq!(escape_dn("Doe, John"), "Doe\\, John");
		assert_eq!(escape_dn(" admin "), "\\20admin\\20");
		assert_eq!(escape_dn("#admin"), "\\23admin");
		assert_eq!(escape_dn("admin#1"), "admin#1");
		assert_eq!(escape_dn("a=b+c"), "a\\=b\\+c");
		assert_eq!(escape_dn(""), "");
	}
}
