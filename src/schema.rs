//! Names of the attributes and object classes the library relies on.
use serde::{Deserialize, Serialize};

/// Attribute and object class names used for building queries and
/// materializing models. The default values are those of Active Directory;
/// deserialized configurations may override individual names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
	/// The attribute listing the object classes of an entry
	pub object_class: String,
	/// The attribute holding the object category of an entry
	pub object_category: String,
	/// The distinguished name attribute
	pub distinguished_name: String,
	/// Common name
	pub common_name: String,
	/// Ambiguous name resolution pseudo-attribute
	pub anr: String,
	/// Members of a group
	pub member: String,
	/// Groups an entry is a member of
	pub member_of: String,
	/// Logon name of an account
	pub account_name: String,
	/// User principal name of an account
	pub user_principal_name: String,
	/// E-mail address
	pub email: String,
	/// Display name
	pub display_name: String,
	/// Free-form description
	pub description: String,
	/// Binary GUID of an entry
	pub object_guid: String,
	/// Binary security identifier of an entry
	pub object_sid: String,
	/// Account control flags
	pub user_account_control: String,
	/// Password attribute, written as quoted UTF-16LE
	pub unicode_password: String,
	/// Creation time, in generalized time syntax
	pub created: String,
	/// Last modification time, in generalized time syntax
	pub updated: String,
	/// Last logon time, as a Windows file time
	pub last_logon: String,
	/// Time the password was last set, as a Windows file time
	pub password_last_set: String,
	/// Expiry of an account, as a Windows file time
	pub account_expires: String,
	/// Operating system of a computer
	pub operating_system: String,
	/// DNS name of a computer
	pub dns_host_name: String,
	/// Name of an organizational unit
	pub organizational_unit_name: String,
	/// Name of a printer
	pub printer_name: String,
	/// Location of a printer
	pub location: String,
	/// Object class of people (users and contacts)
	pub object_class_person: String,
	/// Object class of user accounts
	pub object_class_user: String,
	/// Object class of computers
	pub object_class_computer: String,
	/// Object class of contacts
	pub object_class_contact: String,
	/// Object class of groups
	pub object_class_group: String,
	/// Object class of containers
	pub object_class_container: String,
	/// Object class of printers
	pub object_class_printer: String,
	/// Object class of organizational units
	pub object_class_organizational_unit: String,
	/// Object category of people
	pub object_category_person: String,
	/// Object category of computers
	pub object_category_computer: String,
	/// Object category of containers
	pub object_category_container: String,
	/// Object category of organizational units
	pub object_category_organizational_unit: String,
}

impl Default for Schema {
	fn default() -> Self {
		Self::active_directory()
	}
}

impl Schema {
	/// Attribute names used by Microsoft Active Directory.
	#[must_use]
	pub fn active_directory() -> Self {
		Schema {
			object_class: "objectClass".to_owned(),
			object_category: "objectCategory".to_owned(),
			distinguished_name: "distinguishedName".to_owned(),
			common_name: "cn".to_owned(),
			anr: "anr".to_owned(),
			member: "member".to_owned(),
			member_of: "memberOf".to_owned(),
			account_name: "sAMAccountName".to_owned(),
			user_principal_name: "userPrincipalName".to_owned(),
			email: "mail".to_owned(),
			display_name: "displayName".to_owned(),
			description: "description".to_owned(),
			object_guid: "objectGUID".to_owned(),
			object_sid: "objectSid".to_owned(),
			user_account_control: "userAccountControl".to_owned(),
			unicode_password: "unicodePwd".to_owned(),
			created: "whenCreated".to_owned(),
			updated: "whenChanged".to_owned(),
			last_logon: "lastLogon".to_owned(),
			password_last_set: "pwdLastSet".to_owned(),
			account_expires: "accountExpires".to_owned(),
			operating_system: "operatingSystem".to_owned(),
			dns_host_name: "dNSHostName".to_owned(),
			organizational_unit_name: "ou".to_owned(),
			printer_name: "printerName".to_owned(),
			location: "location".to_owned(),
			object_class_person: "person".to_owned(),
			object_class_user: "user".to_owned(),
			object_class_computer: "computer".to_owned(),
			object_class_contact: "contact".to_owned(),
			object_class_group: "group".to_owned(),
			object_class_container: "container".to_owned(),
			object_class_printer: "printQueue".to_owned(),
			object_class_organizational_unit: "organizationalUnit".to_owned(),
			object_category_person: "person".to_owned(),
			object_category_computer: "computer".to_owned(),
			object_category_container: "container".to_owned(),
			object_category_organizational_unit: "organizationalUnit".to_owned(),
		}
	}

	/// The ranged form of the member attribute, e.g. `member;range=0-1499`.
	/// An upper bound of `None` requests every remaining value.
	#[must_use]
	pub fn member_range(&self, from: usize, to: Option<usize>) -> String {
		match to {
			Some(to) => format!("{};range={from}-{to}", self.member),
			None => format!("{};range={from}-*", self.member),
		}
	}
}
