//! User accounts.
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::{
	attributes::Value,
	connection::Connection,
	convert,
	error::Error,
	models::{BatchModification, Entry},
	schema::Schema,
};

/// Extended error code of a password which violates the password policy.
const PASSWORD_POLICY_CODE: &str = "0000052D";
/// Extended error code of a wrong current password.
const INCORRECT_PASSWORD_CODE: &str = "00000056";

model!(
	/// A user account.
	User
);

/// The `userAccountControl` flags of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccountControl(pub u32);

impl AccountControl {
	/// The account is disabled
	pub const ACCOUNTDISABLE: u32 = 0x2;
	/// The account is locked out
	pub const LOCKOUT: u32 = 0x10;
	/// No password is required
	pub const PASSWD_NOTREQD: u32 = 0x20;
	/// A regular user account
	pub const NORMAL_ACCOUNT: u32 = 0x200;
	/// The password never expires
	pub const DONT_EXPIRE_PASSWORD: u32 = 0x1_0000;
	/// The password has expired
	pub const PASSWORD_EXPIRED: u32 = 0x80_0000;

	/// Whether all of the given flags are set.
	#[must_use]
	pub fn has(self, flags: u32) -> bool {
		self.0 & flags == flags
	}

	/// Set the given flags.
	#[must_use]
	pub fn with(self, flags: u32) -> Self {
		Self(self.0 | flags)
	}

	/// Clear the given flags.
	#[must_use]
	pub fn without(self, flags: u32) -> Self {
		Self(self.0 & !flags)
	}

	/// The raw flag value.
	#[must_use]
	pub fn bits(self) -> u32 {
		self.0
	}
}

impl User {
	/// A new user account which does not exist in the directory yet.
	#[must_use]
	pub fn new(schema: Arc<Schema>) -> Self {
		let mut entry = Entry::new(schema.clone());
		entry.set_attribute(
			&schema.object_class,
			[
				"top",
				schema.object_class_person.as_str(),
				"organizationalPerson",
				schema.object_class_user.as_str(),
			],
		);
		Self(entry)
	}

	/// The pre-Windows 2000 logon name.
	#[must_use]
	pub fn account_name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().account_name)
	}

	/// The logon name in email form.
	#[must_use]
	pub fn user_principal_name(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().user_principal_name)
	}

	/// Email address.
	#[must_use]
	pub fn email(&self) -> Option<&str> {
		self.get_first_attribute(&self.schema().email)
	}

	/// The account control flags. Accounts without the attribute count as
	/// normal accounts.
	///
	/// # Errors
	/// [`Error::Invalid`] if the attribute is not a number.
	pub fn account_control(&self) -> Result<AccountControl, Error> {
		match self.get_first_attribute(&self.schema().user_account_control) {
			Some(value) => value
				.parse::<u32>()
				.map(AccountControl)
				.map_err(|_| {
					Error::Invalid(format!("userAccountControl is not a number: {value:?}"))
				}),
			None => Ok(AccountControl(AccountControl::NORMAL_ACCOUNT)),
		}
	}

	/// Replace the account control flags.
	pub fn set_account_control(&mut self, control: AccountControl) {
		let name = self.schema().user_account_control.clone();
		self.set_first_attribute(&name, control.bits().to_string());
	}

	/// Whether the account is enabled.
	///
	/// # Errors
	/// See [`User::account_control`].
	pub fn is_enabled(&self) -> Result<bool, Error> {
		Ok(!self.is_disabled()?)
	}

	/// Whether the account is disabled.
	///
	/// # Errors
	/// See [`User::account_control`].
	pub fn is_disabled(&self) -> Result<bool, Error> {
		Ok(self.account_control()?.has(AccountControl::ACCOUNTDISABLE))
	}

	/// Clear the disabled flag. Takes effect when saved.
	///
	/// # Errors
	/// See [`User::account_control`].
	pub fn enable(&mut self) -> Result<(), Error> {
		let control = self.account_control()?.without(AccountControl::ACCOUNTDISABLE);
		self.set_account_control(control);
		Ok(())
	}

	/// Set the disabled flag. Takes effect when saved.
	///
	/// # Errors
	/// See [`User::account_control`].
	pub fn disable(&mut self) -> Result<(), Error> {
		let control = self.account_control()?.with(AccountControl::ACCOUNTDISABLE);
		self.set_account_control(control);
		Ok(())
	}

	/// The last time the user logged on, as recorded by the domain controller
	/// that answered.
	///
	/// # Errors
	/// [`Error::Invalid`] if the attribute is not a file time.
	pub fn last_logon(&self) -> Result<Option<OffsetDateTime>, Error> {
		self.filetime(&self.schema().last_logon)
	}

	/// When the password was last set.
	///
	/// # Errors
	/// [`Error::Invalid`] if the attribute is not a file time.
	pub fn password_last_set(&self) -> Result<Option<OffsetDateTime>, Error> {
		self.filetime(&self.schema().password_last_set)
	}

	/// When the account expires, `None` for accounts that never do.
	///
	/// # Errors
	/// [`Error::Invalid`] if the attribute is not a file time.
	pub fn account_expires(&self) -> Result<Option<OffsetDateTime>, Error> {
		self.filetime(&self.schema().account_expires)
	}

	/// Set the password of the account. Existing accounts are updated
	/// immediately; for new accounts the password is sent along when the
	/// account is created.
	///
	/// # Errors
	/// [`Error::SecureConnectionRequired`] on a plain connection,
	/// [`Error::PasswordPolicy`] if the directory rejects the password, or
	/// any error from the connection.
	pub async fn set_password<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		password: &str,
	) -> Result<(), Error> {
		require_secure(connection)?;
		let name = self.schema().unicode_password.clone();
		let encoded = convert::encode_password(password);

		if !self.exists() {
			self.set_first_attribute(&name, encoded);
			return Ok(());
		}

		let dn = self.existing_dn()?;
		let modifications = [BatchModification::replace(name, vec![Value::Binary(encoded)])];
		connection.modify_batch(&dn, &modifications).await.map_err(password_error)?;
		info!("Set password of {dn}");
		Ok(())
	}

	/// Change the password of an existing account, proving knowledge of the
	/// current password.
	///
	/// # Errors
	/// [`Error::SecureConnectionRequired`] on a plain connection,
	/// [`Error::IncorrectPassword`] if `old` is wrong,
	/// [`Error::PasswordPolicy`] if the directory rejects `new`, or any error
	/// from the connection.
	pub async fn change_password<C: Connection + ?Sized>(
		&mut self,
		connection: &mut C,
		old: &str,
		new: &str,
	) -> Result<(), Error> {
		require_secure(connection)?;
		let dn = self.existing_dn()?;
		let name = self.schema().unicode_password.clone();
		let modifications = [
			BatchModification::remove(
				name.as_str(),
				vec![Value::Binary(convert::encode_password(old))],
			),
			BatchModification::add(name, vec![Value::Binary(convert::encode_password(new))]),
		];
		connection.modify_batch(&dn, &modifications).await.map_err(password_error)?;
		info!("Changed password of {dn}");
		Ok(())
	}
}

/// Fail unless the connection is encrypted.
fn require_secure<C: Connection + ?Sized>(connection: &C) -> Result<(), Error> {
	if connection.is_using_ssl() || connection.is_using_tls() {
		Ok(())
	} else {
		Err(Error::SecureConnectionRequired)
	}
}

/// Recognize the extended error codes the directory reports for rejected
/// password modifications.
fn password_error(error: Error) -> Error {
	let Some(message) = error.server_message().map(str::to_owned) else {
		return error;
	};
	let code = message.to_ascii_uppercase();
	if code.contains(PASSWORD_POLICY_CODE) {
		Error::PasswordPolicy(message)
	} else if code.contains(INCORRECT_PASSWORD_CODE) {
		Error::IncorrectPassword(message)
	} else {
		error
	}
}

#[cfg(test)]
mod tests {
	#![allow(clippy::unwrap_used)]

	use std::sync::Arc;

	use super::{password_error, AccountControl, User};
	use crate::{error::Error, schema::Schema};

	#[test]
	fn new_users_carry_user_classes() {
		let user = User::new(Arc::new(Schema::default()));
		assert!(!user.exists());
		assert_eq!(user.object_classes(), ["top", "person", "organizationalPerson", "user"]);
	}

	#[test]
	fn toggles_account_control() {
		let mut user = User::default();
		assert!(user.is_enabled().unwrap());

		user.disable().unwrap();
		assert!(user.is_disabled().unwrap());
		assert_eq!(user.get_first_attribute("userAccountControl"), Some("514"));

		user.enable().unwrap();
		assert_eq!(user.account_control().unwrap(), AccountControl(AccountControl::NORMAL_ACCOUNT));
	}

	#[test]
	fn rejects_malformed_account_control() {
		let mut user = User::default();
		user.set_first_attribute("userAccountControl", "lots");
		assert!(matches!(user.account_control(), Err(Error::Invalid(_))));
	}

	#[test]
	fn maps_password_errors() {
		let server = |message: &str| Error::Server { code: 19, message: message.to_owned() };

		assert!(matches!(
			password_error(server("0000052D: Constraint violation")),
			Error::PasswordPolicy(_)
		));
		assert!(matches!(
			password_error(server("80090308: LdapErr: DSID-0C09041C, data 00000056")),
			Error::IncorrectPassword(_)
		));
		assert!(matches!(
			password_error(server("00002098: Insufficient rights")),
			Error::Server { .. }
		));
		assert!(matches!(password_error(Error::MissingDn), Error::MissingDn));
	}
}
