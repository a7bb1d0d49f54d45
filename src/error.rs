//! Error codes

/// Errors that can occur when using this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// An operator outside the supported set was used in a `where` clause.
	#[error("Unsupported operator `{0}`")]
	UnsupportedOperator(String),
	/// A value was supplied to an operator that takes none, or the reverse.
	#[error("Invalid clause: {0}")]
	InvalidClause(String),
	/// A query which was required to return a result returned nothing.
	#[error("No record found for filter {filter} in {dn:?}")]
	RecordNotFound {
		/// The compiled filter that was executed
		filter: String,
		/// The search base the filter was executed against
		dn: String,
	},
	/// The directory server answered an operation with a failing result code.
	#[error("Server error {code}: {message}")]
	Server {
		/// The LDAP result code
		code: u32,
		/// The diagnostic message sent along with the result code
		message: String,
	},
	/// The password being set does not satisfy the directory's password
	/// policy.
	#[error("Password does not meet the password policy: {0}")]
	PasswordPolicy(String),
	/// The current password given for a password change was wrong.
	#[error("Incorrect password: {0}")]
	IncorrectPassword(String),
	/// An operation which requires an existing entry was performed on a model
	/// that has not been saved, or was deleted.
	#[error("Model {0:?} does not exist in the directory")]
	ModelDoesNotExist(String),
	/// A model without a distinguished name can not be created.
	#[error("Model has no distinguished name")]
	MissingDn,
	/// Passwords can only be set over SSL or TLS secured connections.
	#[error("A secure connection (SSL or TLS) is required for this operation")]
	SecureConnectionRequired,
	/// The contents of an attribute did not conform to the expected syntax.
	#[error("Malformed data: {0}")]
	Invalid(String),
	/// Reading a file failed
	#[error(transparent)]
	Io(#[from] std::io::Error),
	/// An underlying protocol error or similar occurred, or the LDAP library
	/// was used incorrectly.
	#[error(transparent)]
	Ldap(#[from] ldap3::LdapError),
}

impl Error {
	/// The LDAP result code of a failed server operation, if this error
	/// carries one.
	#[must_use]
	pub fn server_code(&self) -> Option<u32> {
		match self {
			Error::Server { code, .. } => Some(*code),
			Error::Ldap(ldap3::LdapError::LdapResult { result }) => Some(result.rc),
			_ => None,
		}
	}

	/// The diagnostic message of a failed server operation, if any.
	#[must_use]
	pub fn server_message(&self) -> Option<&str> {
		match self {
			Error::Server { message, .. } => Some(message),
			Error::Ldap(ldap3::LdapError::LdapResult { result }) => Some(&result.text),
			_ => None,
		}
	}
}
