//! Decoding of attribute syntaxes specific to Active Directory.
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
	config::{AD_TIME_FORMAT, TIME_FORMAT},
	error::Error,
};

/// Difference between the Windows file time epoch (1601-01-01) and the Unix
/// epoch, in 100 nanosecond intervals.
const FILETIME_UNIX_OFFSET: i64 = 116_444_736_000_000_000;

/// Render a binary `objectGUID` in its canonical string form. The first three
/// groups are stored little-endian.
#[must_use]
pub fn guid_to_string(bytes: &[u8]) -> Option<String> {
	let b: &[u8; 16] = bytes.try_into().ok()?;
	Some(format!(
		"{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
		b[3],
		b[2],
		b[1],
		b[0],
		b[5],
		b[4],
		b[7],
		b[6],
		b[8],
		b[9],
		b[10],
		b[11],
		b[12],
		b[13],
		b[14],
		b[15]
	))
}

/// Render a binary `objectSid` as a security identifier string
/// (`S-1-5-21-...`).
#[must_use]
pub fn sid_to_string(bytes: &[u8]) -> Option<String> {
	let (&revision, rest) = bytes.split_first()?;
	let (&count, rest) = rest.split_first()?;
	let (authority, rest) = (rest.get(..6)?, rest.get(6..)?);
	if rest.len() != usize::from(count) * 4 {
		return None;
	}

	let authority = authority.iter().fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte));
	let mut sid = format!("S-{revision}-{authority}");
	for chunk in rest.chunks_exact(4) {
		let sub_authority = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
		sid.push_str(&format!("-{sub_authority}"));
	}
	Some(sid)
}

/// Convert a Windows file time (100 nanosecond intervals since 1601) into a
/// timestamp. `0` and `i64::MAX` are used by the directory to mean "never".
#[must_use]
pub fn filetime_to_datetime(filetime: i64) -> Option<OffsetDateTime> {
	if filetime <= 0 || filetime == i64::MAX {
		return None;
	}
	let nanos = i128::from(filetime - FILETIME_UNIX_OFFSET) * 100;
	OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

/// Convert a timestamp into a Windows file time.
#[must_use]
pub fn datetime_to_filetime(time: OffsetDateTime) -> i64 {
	let intervals = time.unix_timestamp_nanos() / 100;
	i64::try_from(intervals).map_or(i64::MAX, |intervals| intervals + FILETIME_UNIX_OFFSET)
}

/// Parse an LDAP generalized time, with or without fractional seconds.
///
/// # Errors
/// [`Error::Invalid`] if the value is not a generalized time.
pub fn parse_generalized_time(value: &str) -> Result<OffsetDateTime, Error> {
	PrimitiveDateTime::parse(value, &AD_TIME_FORMAT)
		.or_else(|_| PrimitiveDateTime::parse(value, &TIME_FORMAT))
		.map(PrimitiveDateTime::assume_utc)
		.map_err(|err| Error::Invalid(format!("{value:?} is not a generalized time: {err}")))
}

/// Encode a password the way Active Directory expects it in `unicodePwd`:
/// surrounded by double quotes and encoded as UTF-16LE.
#[must_use]
pub fn encode_password(password: &str) -> Vec<u8> {
	format!("\"{password}\"").encode_utf16().flat_map(u16::to_le_bytes).collect()
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use time::macros::datetime;

	use super::{
		datetime_to_filetime, encode_password, filetime_to_datetime, guid_to_string,
		parse_generalized_time, sid_to_string,
	};

	#[test]
	fn guid() {
		let bytes = [
			0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
			0xee, 0xff,
		];
		assert_eq!(guid_to_string(&bytes).unwrap(), "00112233-4455-6677-8899-aabbccddeeff");
		assert_eq!(guid_to_string(&bytes[..15]), None);
	}

	#[test]
	fn sid() {
		let bytes = [
			0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x15, 0x00, 0x00, 0x00, 0xa0, 0x65,
			0xcf, 0x7e, 0x78, 0x4b, 0x9b, 0x5f, 0xe7, 0x7c, 0x87, 0x70, 0x09, 0x1c, 0x01, 0x00,
		];
		assert_eq!(
			sid_to_string(&bytes).unwrap(),
			"S-1-5-21-2127521184-1604012920-1887927527-72713"
		);
		assert_eq!(sid_to_string(&bytes[..27]), None, "Truncated sub-authorities are rejected");
		assert_eq!(sid_to_string(&[]), None);
	}

	#[test]
	fn filetime() {
		assert_eq!(
			filetime_to_datetime(116_444_736_000_000_000).unwrap(),
			datetime!(1970-01-01 0:00 UTC)
		);
		assert_eq!(filetime_to_datetime(0), None);
		assert_eq!(filetime_to_datetime(i64::MAX), None);

		let time = datetime!(2023-05-16 20:05:20 UTC);
		assert_eq!(filetime_to_datetime(datetime_to_filetime(time)).unwrap(), time);
	}

	#[test]
	fn generalized_time() {
		let expected = datetime!(2013-05-16 20:05:20 UTC);
		assert_eq!(parse_generalized_time("20130516200520.0Z").unwrap(), expected);
		assert_eq!(parse_generalized_time("20130516200520Z").unwrap(), expected);
		assert!(parse_generalized_time("yesterday").is_err());
	}

	#[test]
	fn password() {
		assert_eq!(encode_password("ab"), [b'"', 0, b'a', 0, b'b', 0, b'"', 0]);
	}
}
