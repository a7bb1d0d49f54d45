//! The generic directory entry every model builds on.
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::{
	attributes::{Attributes, Value},
	connection::Connection,
	convert,
	dn,
	entry::RawEntry,
	error::Error,
	models::{batch, BatchModification, Model, Observer},
	query::Builder,
	schema::Schema,
};

/// A directory entry with change tracking.
///
/// The attributes loaded from the directory are kept as a snapshot
/// (`original`), and [`Entry::get_modifications`] compares the current
/// attributes against it to find what has to be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
	/// Distinguished name of the entry
	dn: Option<String>,
	/// Current attributes
	attributes: Attributes,
	/// Attributes as last read from or written to the directory
	original: Attributes,
	/// Whether the entry exists in the directory
	exists: bool,
	/// Names of the attributes of the directory
	schema: Arc<Schema>,
}

impl Default for Entry {
	fn default() -> Self {
		Self::new(Arc::new(Schema::default()))
	}
}

impl Entry {
	/// Create an empty entry which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		Self {
			dn: None,
			attributes: Attributes::new(),
			original: Attributes::new(),
			exists: false,
			schema,
		}
	}

	/// Create an entry from a search result. The entry is marked as existing
	/// and its attributes become the original snapshot.
	#[must_use]
	pub fn from_raw(raw: RawEntry, schema: Arc<Schema>) -> Self {
		let mut entry = Self::new(schema);
		entry.set_raw_attributes(raw);
		entry
	}

	/// Replace the contents of this entry with a search result, marking it as
	/// existing.
	pub fn set_raw_attributes(&mut self, raw: RawEntry) {
		self.dn = Some(raw.dn);
		self.attributes = raw.attributes;
		self.exists = true;
		self.sync_original();
	}

	/// Distinguished name of the entry.
	#[must_use]
	pub fn dn(&self) -> Option<&str> {
		self.dn.as_deref()
	}

	/// Set the distinguished name the entry will be created at.
	pub fn set_dn(&mut self, dn: impl Into<String>) {
		self.dn = Some(dn.into());
	}

	/// Whether the entry exists in the directory.
	#[must_use]
	pub fn exists(&self) -> bool {
		self.exists
	}

	/// The schema the entry was loaded with.
	#[must_use]
	pub fn schema(&self) -> &Arc<Schema> {
		&self.schema
	}

	/// Current attributes.
	#[must_use]
	pub fn attributes(&self) -> &Attributes {
		&self.attributes
	}

	/// Attributes as last synchronized with the directory.
	#[must_use]
	pub fn original(&self) -> &Attributes {
		&self.original
	}

	/// All values of an attribute.
	#[must_use]
	pub fn get_attribute(&self, name: &str) -> Option<&[Value]> {
		self.attributes.get(name)
	}

	/// The first value of an attribute, if it is valid UTF-8.
	#[must_use]
	pub fn get_first_attribute(&self, name: &str) -> Option<&str> {
		self.attributes.first_str(name)
	}

	/// Whether the attribute is present.
	#[must_use]
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attributes.contains(name)
	}

	/// Replace all values of an attribute. Setting no values (or only blank
	/// ones) removes the original values when saved.
	pub fn set_attribute<V: Into<Value>>(
		&mut self,
		name: &str,
		values: impl IntoIterator<Item = V>,
	) {
		self.attributes.insert(name, values);
	}

	/// Replace an attribute with a single value.
	pub fn set_first_attribute(&mut self, name: &str, value: impl Into<Value>) {
		self.attributes.insert(name, [value.into()]);
	}

	/// Append a value to an attribute.
	pub fn add_attribute_value(&mut self, name: &str, value: impl Into<Value>) {
		self.attributes.push(name, value);
	}

	/// Remove an attribute entirely. Saving clears it in the directory.
	pub fn remove_attribute(&mut self, name: &str) -> Option<Vec<Value>> {
		self.attributes.remove(name)
	}

	/// The attributes which differ from the original snapshot.
	#[must_use]
	pub fn get_dirty(&self) -> Attributes {
		self.attributes
			.iter()
			.filter(|(name, values)| self.original.get(name) != Some(values.as_slice()))
			.map(|(name, values)| (name, values.clone()))
			.collect()
	}

	/// Whether any attribute was changed, added or removed.
	#[must_use]
	pub fn is_dirty(&self) -> bool {
		self.attributes != self.original
	}

	/// The modifications needed to bring the directory entry in line with the
	/// current attributes.
	#[must_use]
	pub fn get_modifications(&self) -> Vec<BatchModification> {
		batch::diff(&self.attributes, &self.original)
	}

	/// Take the current attributes as the new original snapshot.
	pub fn sync_original(&mut self) {
		self.original = self.attributes.clone();
	}

	/// Take a new original snapshot, for changes written to the directory
	/// outside of [`Entry::save`].
	pub(crate) fn replace_original(&mut self, original: Attributes) {
		self.original = original;
	}

	/// Common name.
	#[must_use]
	pub fn common_name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema.common_name)
	}

	/// Display name.
	#[must_use]
	pub fn display_name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema.display_name)
	}

	/// Description.
	#[must_use]
	pub fn description(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema.description)
	}

	/// Object classes of the entry.
	#[must_use]
	pub fn object_classes(&self) -> Vec<&str> {
		self.attributes.strings(&self.schema.object_class)
	}

	/// Object category of the entry.
	#[must_use]
	pub fn object_category(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema.object_category)
	}

	/// The entry's GUID in canonical string form.
	#[must_use]
	pub fn object_guid(&self) -> Option<String> {
		self.attributes
			.first(&self.schema.object_guid)
			.and_then(|guid| convert::guid_to_string(guid.as_bytes()))
	}

	/// The entry's security identifier in string form.
	#[must_use]
	pub fn object_sid(&self) -> Option<String> {
		self.attributes
			.first(&self.schema.object_sid)
			.and_then(|sid| convert::sid_to_string(sid.as_bytes()))
	}

	/// When the entry was created.
	///
	/// # Errors
	/// [`Error::Invalid`] if the attribute is not a generalized time.
	pub fn created_at(&self) -> Result<Option<OffsetDateTime>, Error> {
		self.get_first_attribute(&self.schema.created)
			.map(convert::parse_generalized_time)
			.transpose()
	}

	/// When the entry was last changed.
	///
	/// # Errors
	/// [`Error::Invalid`] if the attribute is not a generalized time.
	pub fn updated_at(&self) -> Result<Option<OffsetDateTime>, Error> {
		self.get_first_attribute(&self.schema.updated)
			.map(convert::parse_generalized_time)
			.transpose()
	}

	/// Distinguished names of the groups the entry is a member of.
	#[must_use]
	pub fn member_of(&self) -> Vec<&str> {
		self.attributes.strings(&self.schema.member_of)
	}

	/// A value of a Windows file time attribute.
	pub(crate) fn filetime(&self, name: &str) -> Result<Option<OffsetDateTime>, Error> {
		match self.get_first_attribute(name) {
			Some(value) => {
				let filetime = value
					.parse::<i64>()
					.map_err(|_| Error::Invalid(format!("{name} is not a file time: {value:?}")))?;
				Ok(convert::filetime_to_datetime(filetime))
			}
			None => Ok(None),
		}
	}

	/// The attributes as the directory keeps them: blank values are dropped,
	/// and attributes left without values are absent.
	fn stored_attributes(&self) -> Attributes {
		self.attributes
			.iter()
			.map(|(name, values)| {
				(name, values.iter().filter(|value| !value.is_blank()).cloned().collect::<Vec<_>>())
			})
			.filter(|(_, values)| !values.is_empty())
			.collect()
	}

	/// The distinguished name of an entry which has to exist in the
	/// directory.
	pub(crate) fn existing_dn(&self) -> Result<String, Error> {
		match &self.dn {
			Some(dn) if self.exists => Ok(dn.clone()),
			dn => Err(Error::ModelDoesNotExist(dn.clone().unwrap_or_default())),
		}
	}

	/// Look up the groups this entry is a member of.
	///
	/// # Errors
	/// Any error from the connection.
	pub async fn groups<C: Connection + ?Sized>(
		&self,
		connection: &mut C,
	) -> Result<Vec<Model>, Error> {
		let mut groups = Vec::new();
		for dn in self.member_of() {
			let group = Builder::new(connection, self.schema.clone(), "").find_by_dn(dn).await?;
			if let Some(group) = group {
				groups.push(group);
			}
		}
		Ok(groups)
	}

	/// Write the entry to the directory: existing entries have their
	/// modifications applied, new entries are added.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::MissingDn`] when a new entry
	/// has no distinguished name.
	pub async fn save<C: Connection + ?Sized>(&mut self, connection: &mut C) -> Result<(), Error> {
		self.save_with(connection, &mut ()).await
	}

	/// [`Entry::save`], notifying an observer.
	///
	/// # Errors
	/// See [`Entry::save`].
	pub async fn save_with<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		observer: &mut impl Observer,
	) -> Result<(), Error> {
		if self.exists {
			self.update_with(connection, observer).await
		} else {
			self.create_with(connection, observer).await
		}
	}

	/// Add the entry to the directory.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::MissingDn`] when the entry has
	/// no distinguished name.
	pub async fn create<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
	) -> Result<(), Error> {
		self.create_with(connection, &mut ()).await
	}

	/// [`Entry::create`], notifying an observer.
	///
	/// # Errors
	/// See [`Entry::create`].
	pub async fn create_with<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		observer: &mut impl Observer,
	) -> Result<(), Error> {
		let dn = self.dn.clone().ok_or(Error::MissingDn)?;
		let attributes = self.stored_attributes();

		observer.creating(self);
		connection.add(&dn, &attributes).await?;
		self.attributes = attributes;
		self.exists = true;
		self.sync_original();
		info!("Created entry {dn}");
		observer.created(self);
		Ok(())
	}

	/// Apply the modifications of an existing entry. Does nothing if the entry
	/// is unchanged.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn update<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
	) -> Result<(), Error> {
		self.update_with(connection, &mut ()).await
	}

	/// [`Entry::update`], notifying an observer.
	///
	/// # Errors
	/// See [`Entry::update`].
	pub async fn update_with<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		observer: &mut impl Observer,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		let modifications = self.get_modifications();
		if modifications.is_empty() {
			return Ok(());
		}

		observer.updating(self);
		connection.modify_batch(&dn, &modifications).await?;
		self.attributes = self.stored_attributes();
		self.sync_original();
		info!("Updated {} attributes of {dn}", modifications.len());
		observer.updated(self);
		Ok(())
	}

	/// Delete the entry from the directory. The entry stays usable as a
	/// detached value, but no longer exists.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn delete<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
	) -> Result<(), Error> {
		self.delete_with(connection, &mut ()).await
	}

	/// [`Entry::delete`], notifying an observer.
	///
	/// # Errors
	/// See [`Entry::delete`].
	pub async fn delete_with<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		observer: &mut impl Observer,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		observer.deleting(self);
		connection.delete(&dn).await?;
		self.exists = false;
		info!("Deleted entry {dn}");
		observer.deleted(self);
		Ok(())
	}

	/// Delete the entry along with everything below it, deepest entries
	/// first.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn delete_recursive<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		let mut descendants: Vec<String> = Builder::new(connection, self.schema.clone(), "")
			.in_dn(&dn)
			.raw(true)
			.select([self.schema.distinguished_name.clone()])
			.get()
			.await?
			.into_iter()
			.map(|model| model.dn().to_owned())
			.filter(|child| !child.eq_ignore_ascii_case(&dn))
			.collect();
		descendants.sort_by_key(|child| std::cmp::Reverse(dn::depth(child)));

		for child in descendants {
			connection.delete(&child).await?;
			info!("Deleted entry {child}");
		}
		self.delete(connection).await
	}

	/// Rename the entry and optionally move it below another parent.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn rename<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		new_rdn: &str,
		new_parent: Option<&str>,
		delete_old_rdn: bool,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		connection.rename(&dn, new_rdn, new_parent, delete_old_rdn).await?;

		let parent = new_parent.map(str::to_owned).or_else(|| dn::parent(&dn));
		let new_dn = match parent {
			Some(parent) if !parent.is_empty() => format!("{new_rdn},{parent}"),
			_ => new_rdn.to_owned(),
		};
		info!("Renamed entry {dn} to {new_dn}");
		self.dn = Some(new_dn);
		Ok(())
	}

	/// Move the entry below another parent, keeping its name.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`].
	pub async fn move_to<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		new_parent: &str,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		let rdn =
			dn::rdn(&dn).ok_or_else(|| Error::Invalid(format!("Invalid DN {dn:?}")))?.to_owned();
		self.rename(connection, &rdn, Some(new_parent), true).await
	}

	/// Re-read the entry from the directory, discarding local changes.
	///
	/// # Errors
	/// Any error from the connection, or [`Error::ModelDoesNotExist`] if the
	/// entry can no longer be found.
	pub async fn refresh<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
	) -> Result<(), Error> {
		let dn = self.existing_dn()?;
		let fresh =
			Builder::new(connection, self.schema.clone(), "").raw(true).find_by_dn(&dn).await?;
		match fresh {
			Some(Model::Raw(raw)) => {
				self.set_raw_attributes(raw);
				Ok(())
			}
			_ => Err(Error::ModelDoesNotExist(dn)),
		}
	}
}
