//! Turning search results into models.
use std::{cmp::Ordering, iter::Peekable, str::Chars, sync::Arc};

use tracing::debug;

use crate::{
	connection::Connection,
	entry::RawEntry,
	error::Error,
	models::Model,
	query::MATCH_ALL,
	schema::Schema,
};

/// Order of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
	/// Smallest value first
	#[default]
	Ascending,
	/// Largest value first
	Descending,
}

/// How the sorted values are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortFlag {
	/// Plain string comparison
	#[default]
	Regular,
	/// Runs of digits compare by their numeric value, so `item2` comes before
	/// `item10`
	Natural,
	/// String comparison ignoring ASCII case
	CaseInsensitive,
}

/// Sorting applied to query results after they have been fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
	/// Attribute whose first value is compared
	pub field: String,
	/// Order of the results
	pub direction: Direction,
	/// Comparison of the values
	pub flag: SortFlag,
}

impl Sort {
	/// Order two models by the sorted attribute. Models without the attribute
	/// come first in ascending order.
	fn compare(&self, left: &Model, right: &Model) -> Ordering {
		let left = left.attributes().first_str(&self.field);
		let right = right.attributes().first_str(&self.field);
		let ordering = match (left, right) {
			(Some(left), Some(right)) => match self.flag {
				SortFlag::Regular => left.cmp(right),
				SortFlag::Natural => natural_cmp(left, right),
				SortFlag::CaseInsensitive => {
					left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase())
				}
			},
			(left, right) => left.is_some().cmp(&right.is_some()),
		};
		match self.direction {
			Direction::Ascending => ordering,
			Direction::Descending => ordering.reverse(),
		}
	}
}

/// Compare strings treating runs of digits as numbers.
fn natural_cmp(left: &str, right: &str) -> Ordering {
	let mut left = left.chars().peekable();
	let mut right = right.chars().peekable();
	loop {
		let ordering = match (left.peek().copied(), right.peek().copied()) {
			(None, None) => return Ordering::Equal,
			(None, Some(_)) => return Ordering::Less,
			(Some(_), None) => return Ordering::Greater,
			(Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
				let l = take_number(&mut left);
				let r = take_number(&mut right);
				let (l, r) = (l.trim_start_matches('0'), r.trim_start_matches('0'));
				l.len().cmp(&r.len()).then_with(|| l.cmp(r))
			}
			(Some(l), Some(r)) => {
				left.next();
				right.next();
				l.cmp(&r)
			}
		};
		if ordering != Ordering::Equal {
			return ordering;
		}
	}
}

/// Consume a run of digits.
fn take_number(chars: &mut Peekable<Chars<'_>>) -> String {
	let mut digits = String::new();
	while let Some(digit) = chars.next_if(char::is_ascii_digit) {
		digits.push(digit);
	}
	digits
}

/// A ranged attribute key, as in `member;range=0-1499`.
#[derive(Debug, PartialEq, Eq)]
struct Range<'k> {
	/// The attribute the values belong to
	attribute: &'k str,
	/// The index of the first value included
	start: usize,
	/// The index of the last value included, `None` for the final chunk
	end: Option<usize>,
}

impl<'k> Range<'k> {
	/// Parse a ranged attribute key. Keys without a range give `None`.
	fn parse(key: &'k str) -> Option<Self> {
		let (attribute, range) = key.split_once(";range=")?;
		let (start, end) = range.split_once('-')?;
		let start = start.parse().ok()?;
		let end = match end {
			"*" => None,
			end => Some(end.parse().ok()?),
		};
		Some(Self { attribute, start, end })
	}

	/// The first index of the next chunk, `None` if this is the final one.
	fn next_start(&self) -> Option<usize> {
		self.end.map(|end| end + 1)
	}
}

/// Materializes the raw search results of a query.
pub(crate) struct Processor<'a, C: Connection + ?Sized> {
	/// Used to read the remaining chunks of ranged attributes
	pub(crate) connection: &'a mut C,
	/// Schema handed to the models
	pub(crate) schema: &'a Arc<Schema>,
	/// Return the results as they are
	pub(crate) raw: bool,
	/// Sorting of the results
	pub(crate) sort: Option<&'a Sort>,
}

impl<C: Connection + ?Sized> Processor<'_, C> {
	/// Process the entries returned by a query: unless in raw mode, ranged
	/// attributes are completed and every entry becomes the model matching
	/// its object classes. The results are then sorted, if requested.
	pub(crate) async fn process(self, entries: Vec<RawEntry>) -> Result<Vec<Model>, Error> {
		let mut models = Vec::with_capacity(entries.len());
		for mut entry in entries {
			if self.raw {
				models.push(Model::Raw(entry));
			} else {
				read_ranges(&mut *self.connection, &mut entry).await?;
				models.push(Model::hydrate(entry, self.schema.clone()));
			}
		}

		if let Some(sort) = self.sort {
			models.sort_by(|left, right| sort.compare(left, right));
		}
		Ok(models)
	}
}

/// Replace every ranged attribute of an entry with the complete list of its
/// values, reading the remaining chunks from the directory.
async fn read_ranges<C: Connection + ?Sized>(
	connection: &mut C,
	entry: &mut RawEntry,
) -> Result<(), Error> {
	let ranged: Vec<String> =
		entry.attributes.names().filter(|key| Range::parse(key).is_some()).cloned().collect();

	for key in ranged {
		let (Some(range), Some(mut values)) =
			(Range::parse(&key), entry.attributes.get(&key).map(<[_]>::to_vec))
		else {
			continue;
		};
		let attribute = range.attribute.to_owned();
		let mut next = range.next_start();

		while let Some(start) = next {
			let request = format!("{attribute};range={start}-*");
			debug!("Reading {request} of {}", entry.dn);
			let response = connection.read(&entry.dn, MATCH_ALL, &[request.clone()]).await?;
			let chunk = response.entries.into_iter().next().and_then(|page| {
				page.attributes.into_iter().find(|(key, _)| {
					Range::parse(key).is_some_and(|range| range.attribute == attribute)
				})
			});
			let Some((key, chunk)) = chunk else {
				break;
			};
			next = match Range::parse(&key) {
				Some(range) if range.start == start => range.next_start(),
				_ => {
					return Err(Error::Invalid(format!(
						"Expected {request} of {}, got {key}",
						entry.dn
					)))
				}
			};
			if next.is_some_and(|next| next <= start) {
				return Err(Error::Invalid(format!("Range {key} of {} does not advance", entry.dn)));
			}
			values.extend(chunk);
		}

		entry.attributes.remove(&key);
		entry.attributes.insert(&attribute, values);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::{cmp::Ordering, sync::Arc};

	use super::{natural_cmp, Direction, Range, Sort, SortFlag};
	use crate::{attributes::Attributes, entry::RawEntry, models::Model, schema::Schema};

	#[test]
	fn parse_ranges() {
		assert_eq!(
			Range::parse("member;range=0-1499"),
			Some(Range { attribute: "member", start: 0, end: Some(1499) })
		);
		assert_eq!(
			Range::parse("member;range=1500-*"),
			Some(Range { attribute: "member", start: 1500, end: None })
		);
		let first = Range::parse("member;range=0-1499");
		assert_eq!(first.and_then(|range| range.next_start()), Some(1500));
		assert_eq!(Range::parse("member"), None);
		assert_eq!(Range::parse("member;range=a-b"), None);
	}

	#[test]
	fn natural_order() {
		assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
		assert_eq!(natural_cmp("item10", "item2"), Ordering::Greater);
		assert_eq!(natural_cmp("item02", "item2"), Ordering::Equal);
		assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
		assert_eq!(natural_cmp("b1", "a2"), Ordering::Greater);
	}

	fn named(cn: Option<&str>) -> Model {
		let mut attributes = Attributes::new();
		if let Some(cn) = cn {
			attributes.insert("cn", [cn]);
		}
		Model::hydrate(RawEntry::new("dc=example,dc=com", attributes), Arc::new(Schema::default()))
	}

	fn sorted(direction: Direction, flag: SortFlag) -> Vec<Option<String>> {
		let sort = Sort { field: "cn".to_owned(), direction, flag };
		let mut models: Vec<Model> =
			[Some("user10"), None, Some("User2"), Some("user2")].into_iter().map(named).collect();
		models.sort_by(|left, right| sort.compare(left, right));
		models.iter().map(|model| model.attributes().first_str("cn").map(str::to_owned)).collect()
	}

	#[test]
	fn sorts_by_flag() {
		let names = |names: &[Option<&str>]| {
			names.iter().map(|name| name.map(str::to_owned)).collect::<Vec<_>>()
		};

		assert_eq!(
			sorted(Direction::Ascending, SortFlag::Regular),
			names(&[None, Some("User2"), Some("user10"), Some("user2")])
		);
		assert_eq!(
			sorted(Direction::Ascending, SortFlag::Natural),
			names(&[None, Some("User2"), Some("user2"), Some("user10")])
		);
		assert_eq!(
			sorted(Direction::Ascending, SortFlag::CaseInsensitive),
			names(&[None, Some("user10"), Some("User2"), Some("user2")])
		);
		assert_eq!(
			sorted(Direction::Descending, SortFlag::Regular),
			names(&[Some("user2"), Some("user10"), Some("User2"), None])
		);
	}
}
