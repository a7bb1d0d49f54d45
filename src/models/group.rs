//! Groups and their members.
use std::sync::Arc;

use tracing::info;

use crate::{
	attributes::Attributes,
	connection::Connection,
	error::Error,
	models::{Entry, Model},
	query::Builder,
	schema::Schema,
};

model!(
	/// A security or distribution group.
	Group
);

impl Group {
	/// A new group which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let mut entry = Entry::new(schema.clone());
		entry.set_attribute(&schema.object_class, ["top", schema.object_class_group.as_str()]);
		Self(entry)
	}

	/// Distinguished names of the direct members.
	#[must_use]
	pub fn member_dns(&self) -> Vec<&str> {
		self.attributes().strings(&self.schema().member)
	}

	/// Look up the direct members of the group. Members which can not be
	/// found are skipped.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn members<C: Connection + ?Sized>(
		&self,
		connection: &mut C,
	) -> Result<Vec<Model>, Error> {
		let mut members = Vec::new();
		for dn in self.member_dns() {
			let member = Builder::new(connection, self.schema().clone(), "").find_by_dn(dn).await?;
			if let Some(member) = member {
				members.push(member);
			}
		}
		Ok(members)
	}

	/// Add an entry to the group.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn add_member<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		member_dn: &str,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		let name = self.schema().member.clone();
		let change: Attributes = [(name.as_str(), vec![member_dn])].into_iter().collect();
		connection.mod_add(&dn, &change).await?;

		self.add_attribute_value(&name, member_dn);
		self.sync_member(&name);
		info!("Added {member_dn} to {dn}");
		Ok(())
	}

	/// Remove an entry from the group.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn remove_member<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		member_dn: &str,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		let name = self.schema().member.clone();
		let change: Attributes = [(name.as_str(), vec![member_dn])].into_iter().collect();
		connection.mod_delete(&dn, &change).await?;

		let remaining: Vec<String> = self
			.member_dns()
			.into_iter()
			.filter(|member| !member.eq_ignore_ascii_case(member_dn))
			.map(str::to_owned)
			.collect();
		if remaining.is_empty() {
			self.remove_attribute(&name);
		} else {
			self.set_attribute(&name, remaining);
		}
		self.sync_member(&name);
		info!("Removed {member_dn} from {dn}");
		Ok(())
	}

	/// Record the member list as written, leaving other pending changes
	/// untouched.
	fn sync_member(&mut self, name: &str) {
		let mut original = self.original().clone();
		match self.get_attribute(name) {
			Some(values) => {
				original.insert(name, values.to_vec());
			}
			None => {
				original.remove(name);
			}
		}
		self.0.replace_original(original);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::Group;
	use crate::{attributes::Attributes, entry::RawEntry, models::Entry, schema::Schema};

	#[test]
	fn new_groups_carry_group_classes() {
		let group = Group::new(Arc::new(Schema::default()));
		assert_eq!(group.object_classes(), ["top", "group"]);
	}

	#[test]
	fn lists_member_dns() {
		let attributes: Attributes = [
			("objectClass", vec!["top", "group"]),
			("member", vec!["cn=a,dc=example,dc=com", "cn=b,dc=example,dc=com"]),
		]
		.into_iter()
		.collect();
		let group: Group = Entry::from_raw(
			RawEntry::new("cn=staff,dc=example,dc=com", attributes),
			Arc::new(Schema::default()),
		)
		.into();
		assert_eq!(group.member_dns(), ["cn=a,dc=example,dc=com", "cn=b,dc=example,dc=com"]);
	}
}
