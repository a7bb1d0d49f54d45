//! Models which only add a few named attributes to [`Entry`].
use std::sync::Arc;

use crate::{models::Entry, schema::Schema};

/// An empty entry carrying the given object classes.
fn with_classes(schema: Arc<Schema>, classes: &[&str]) -> Entry {
	let mut entry = Entry::new(schema.clone());
	entry.set_attribute(&schema.object_class, classes.iter().copied());
	entry
}

model!(
	/// A computer account.
	Computer
);

impl Computer {
	/// A new computer account which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let classes = [
			"top",
			schema.object_class_person.as_str(),
			"organizationalPerson",
			schema.object_class_user.as_str(),
			schema.object_class_computer.as_str(),
		];
		Self(with_classes(schema.clone(), &classes))
	}

	/// Name and version of the operating system.
	#[must_use]
	pub fn operating_system(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().operating_system)
	}

	/// Fully qualified host name.
	#[must_use]
	pub fn dns_host_name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().dns_host_name)
	}
}

model!(
	/// A contact, an address book entry without an account.
	Contact
);

impl Contact {
	/// A new contact which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let classes = [
			"top",
			schema.object_class_person.as_str(),
			"organizationalPerson",
			schema.object_class_contact.as_str(),
		];
		Self(with_classes(schema.clone(), &classes))
	}

	/// Email address.
	#[must_use]
	pub fn email(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().email)
	}
}

model!(
	/// A container.
	Container
);

impl Container {
	/// A new container which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let classes = ["top", schema.object_class_container.as_str()];
		Self(with_classes(schema.clone(), &classes))
	}

	/// Name of the container.
	#[must_use]
	pub fn name(&self) -> Option<&str> {
		self.common_name()
	}
}

model!(
	/// A shared printer.
	Printer
);

impl Printer {
	/// A new printer which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let classes = ["top", "leaf", "connectionPoint", schema.object_class_printer.as_str()];
		Self(with_classes(schema.clone(), &classes))
	}

	/// Name of the printer.
	#[must_use]
	pub fn printer_name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().printer_name)
	}

	/// Where the printer is.
	#[must_use]
	pub fn location(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().location)
	}
}

model!(
	/// An organizational unit.
	OrganizationalUnit
);

impl OrganizationalUnit {
	/// A new organizational unit which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let classes = ["top", schema.object_class_organizational_unit.as_str()];
		Self(with_classes(schema.clone(), &classes))
	}

	/// Name of the organizational unit.
	#[must_use]
	pub fn name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().organizational_unit_name)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::{Computer, OrganizationalUnit, Printer};
	use crate::schema::Schema;

	#[test]
	fn new_models_carry_their_classes() {
		let schema = Arc::new(Schema::default());
		assert_eq!(
			Computer::new(schema.clone()).object_classes(),
			["top", "person", "organizationalPerson", "user", "computer"]
		);
		assert_eq!(
			Printer::new(schema.clone()).object_classes(),
			["top", "leaf", "connectionPoint", "printQueue"]
		);

		let mut unit = OrganizationalUnit::new(schema);
		unit.set_first_attribute("OU", "Accounting");
		assert_eq!(unit.name(), Some("Accounting"));
		assert!(!unit.exists());
	}
}
