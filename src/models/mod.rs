//! Typed models materialized from directory entries.
//!
//! Every model wraps an [`Entry`] and dereferences to it, so the generic
//! attribute accessors and lifecycle operations are available on all of
//! them. The typed wrappers only add the attributes with non-trivial
//! semantics.
use std::sync::Arc;

use crate::{attributes::Attributes, entry::RawEntry, schema::Schema};

/// Declare a model type wrapping an [`Entry`].
macro_rules! model {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Default, PartialEq, Eq)]
		pub struct $name(crate::models::Entry);

		impl $name {
			/// Unwrap the underlying entry.
			#[must_use]
			pub fn into_entry(self) -> crate::models::Entry {
				self.0
			}
		}

		impl From<crate::models::Entry> for $name {
			fn from(entry: crate::models::Entry) -> Self {
				Self(entry)
			}
		}

		impl std::ops::Deref for $name {
			type Target = crate::models::Entry;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}

		impl std::ops::DerefMut for $name {
			fn deref_mut(&mut self) -> &mut Self::Target {
				&mut self.0
			}
		}
	};
}

pub mod batch;
mod entry;
mod group;
mod objects;
mod observer;
mod user;

pub use self::{
	batch::{BatchModification, ModificationKind},
	entry::Entry,
	group::Group,
	objects::{Computer, Contact, Container, OrganizationalUnit, Printer},
	observer::Observer,
	user::{AccountControl, User},
};

/// The model types entries can be materialized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
	/// Computer accounts
	Computer,
	/// Contacts
	Contact,
	/// User accounts (any `person` which is not a contact or computer)
	User,
	/// Groups
	Group,
	/// Containers
	Container,
	/// Printers
	Printer,
	/// Organizational units
	OrganizationalUnit,
	/// Anything else
	Entry,
}

impl ModelKind {
	/// The object class identifying each kind, in order of precedence.
	fn table(schema: &Schema) -> [(&str, ModelKind); 7] {
		[
			(schema.object_class_computer.as_str(), ModelKind::Computer),
			(schema.object_class_contact.as_str(), ModelKind::Contact),
			(schema.object_class_person.as_str(), ModelKind::User),
			(schema.object_class_group.as_str(), ModelKind::Group),
			(schema.object_class_container.as_str(), ModelKind::Container),
			(schema.object_class_printer.as_str(), ModelKind::Printer),
			(schema.object_class_organizational_unit.as_str(), ModelKind::OrganizationalUnit),
		]
	}

	/// Determine the model kind for the object classes of an entry. The
	/// first class in table order which the entry carries decides, so a
	/// computer (which is also a `person`) becomes a [`ModelKind::Computer`].
	#[must_use]
	pub fn resolve(schema: &Schema, object_classes: &[&str]) -> ModelKind {
		Self::table(schema)
			.into_iter()
			.find(|(class, _)| {
				object_classes.iter().any(|candidate| candidate.eq_ignore_ascii_case(class))
			})
			.map_or(ModelKind::Entry, |(_, kind)| kind)
	}
}

/// A materialized search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Model {
	/// A user account
	User(User),
	/// A group
	Group(Group),
	/// A computer account
	Computer(Computer),
	/// A contact
	Contact(Contact),
	/// A container
	Container(Container),
	/// A printer
	Printer(Printer),
	/// An organizational unit
	OrganizationalUnit(OrganizationalUnit),
	/// An entry of no known type
	Entry(Entry),
	/// An entry returned as is, from a query in raw mode
	Raw(RawEntry),
}

impl Model {
	/// Materialize a search result as the model type matching its object
	/// classes.
	#[must_use]
	pub fn hydrate(raw: RawEntry, schema: Arc<Schema>) -> Model {
		let kind = ModelKind::resolve(&schema, &raw.attributes.strings(&schema.object_class));
		let entry = Entry::from_raw(raw, schema);
		match kind {
			ModelKind::Computer => Model::Computer(entry.into()),
			ModelKind::Contact => Model::Contact(entry.into()),
			ModelKind::User => Model::User(entry.into()),
			ModelKind::Group => Model::Group(entry.into()),
			ModelKind::Container => Model::Container(entry.into()),
			ModelKind::Printer => Model::Printer(entry.into()),
			ModelKind::OrganizationalUnit => Model::OrganizationalUnit(entry.into()),
			ModelKind::Entry => Model::Entry(entry),
		}
	}

	/// The kind of the model, `None` for raw entries.
	#[must_use]
	pub fn kind(&self) -> Option<ModelKind> {
		Some(match self {
			Model::User(_) => ModelKind::User,
			Model::Group(_) => ModelKind::Group,
			Model::Computer(_) => ModelKind::Computer,
			Model::Contact(_) => ModelKind::Contact,
			Model::Container(_) => ModelKind::Container,
			Model::Printer(_) => ModelKind::Printer,
			Model::OrganizationalUnit(_) => ModelKind::OrganizationalUnit,
			Model::Entry(_) => ModelKind::Entry,
			Model::Raw(_) => return None,
		})
	}

	/// The underlying entry, or the raw entry for models returned in raw mode.
	fn parts(&self) -> Result<&Entry, &RawEntry> {
		match self {
			Model::User(model) => Ok(&**model),
			Model::Group(model) => Ok(&**model),
			Model::Computer(model) => Ok(&**model),
			Model::Contact(model) => Ok(&**model),
			Model::Container(model) => Ok(&**model),
			Model::Printer(model) => Ok(&**model),
			Model::OrganizationalUnit(model) => Ok(&**model),
			Model::Entry(entry) => Ok(entry),
			Model::Raw(raw) => Err(raw),
		}
	}

	/// The underlying entry, `None` for raw entries.
	#[must_use]
	pub fn as_entry(&self) -> Option<&Entry> {
		self.parts().ok()
	}

	/// Mutable access to the underlying entry, `None` for raw entries.
	pub fn as_entry_mut(&mut self) -> Option<&mut Entry> {
		match self {
			Model::User(model) => Some(&mut **model),
			Model::Group(model) => Some(&mut **model),
			Model::Computer(model) => Some(&mut **model),
			Model::Contact(model) => Some(&mut **model),
			Model::Container(model) => Some(&mut **model),
			Model::Printer(model) => Some(&mut **model),
			Model::OrganizationalUnit(model) => Some(&mut **model),
			Model::Entry(entry) => Some(entry),
			Model::Raw(_) => None,
		}
	}

	/// Unwrap the underlying entry, `None` for raw entries.
	#[must_use]
	pub fn into_entry(self) -> Option<Entry> {
		match self {
			Model::User(model) => Some(model.into_entry()),
			Model::Group(model) => Some(model.into_entry()),
			Model::Computer(model) => Some(model.into_entry()),
			Model::Contact(model) => Some(model.into_entry()),
			Model::Container(model) => Some(model.into_entry()),
			Model::Printer(model) => Some(model.into_entry()),
			Model::OrganizationalUnit(model) => Some(model.into_entry()),
			Model::Entry(entry) => Some(entry),
			Model::Raw(_) => None,
		}
	}

	/// The distinguished name of the entry.
	#[must_use]
	pub fn dn(&self) -> &str {
		match self.parts() {
			Ok(entry) => entry.dn().unwrap_or_default(),
			Err(raw) => &raw.dn,
		}
	}

	/// The attributes of the entry.
	#[must_use]
	pub fn attributes(&self) -> &Attributes {
		match self.parts() {
			Ok(entry) => entry.attributes(),
			Err(raw) => &raw.attributes,
		}
	}

	/// The model as a user, if it is one.
	#[must_use]
	pub fn into_user(self) -> Option<User> {
		match self {
			Model::User(user) => Some(user),
			_ => None,
		}
	}

	/// The model as a group, if it is one.
	#[must_use]
	pub fn into_group(self) -> Option<Group> {
		match self {
			Model::Group(group) => Some(group),
			_ => None,
		}
	}

	/// The model as a raw entry, if it was returned in raw mode.
	#[must_use]
	pub fn into_raw(self) -> Option<RawEntry> {
		match self {
			Model::Raw(raw) => Some(raw),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::expect_used)]

	use std::sync::Arc;

	use super::{Model, ModelKind};
	use crate::{attributes::Attributes, entry::RawEntry, schema::Schema};

	fn hydrate(classes: &[&str]) -> Model {
		let attributes: Attributes = [("objectClass", classes.to_vec())].into_iter().collect();
		let raw = RawEntry::new("cn=x,dc=example,dc=com", attributes);
		Model::hydrate(raw, Arc::new(Schema::default()))
	}

	#[test]
	fn resolves_model_kinds() {
		let cases: [(&[&str], ModelKind); 9] = [
			(&["top", "person", "organizationalPerson", "user"], ModelKind::User),
			(&["top", "group"], ModelKind::Group),
			(&["top", "person", "organizationalPerson", "user", "computer"], ModelKind::Computer),
			(&["top", "person", "organizationalPerson", "contact"], ModelKind::Contact),
			(&["top", "container"], ModelKind::Container),
			(&["top", "leaf", "connectionPoint", "printQueue"], ModelKind::Printer),
			(&["top", "organizationalUnit"], ModelKind::OrganizationalUnit),
			(&["top", "domainDNS"], ModelKind::Entry),
			(&[], ModelKind::Entry),
		];
		for (classes, kind) in cases {
			assert_eq!(hydrate(classes).kind(), Some(kind), "{classes:?}");
		}
	}

	#[test]
	fn object_classes_are_case_insensitive() {
		assert_eq!(hydrate(&["TOP", "GROUP"]).kind(), Some(ModelKind::Group));
	}

	#[test]
	fn hydrated_models_exist() {
		let model = hydrate(&["top", "group"]);
		let entry = model.as_entry().expect("hydrated models wrap an entry");
		assert!(entry.exists());
		assert_eq!(model.dn(), "cn=x,dc=example,dc=com");
		assert!(model.into_group().is_some());
	}
}
