//! Connection to an LDAP server over `ldap3`

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use ldap3::{
	controls::{Control, ControlType, PagedResults, RawControl},
	LdapConnAsync, LdapResult, Mod, Scope, SearchEntry, SearchResult,
};
use tracing::{debug, warn};

use crate::{
	attributes::Attributes,
	config::Config,
	connection::{Connection, SearchResponse},
	entry::RawEntry,
	error::Error,
	models::{BatchModification, ModificationKind},
};

/// A connection to an LDAP server, implementing [`Connection`] on top of an
/// [`ldap3::Ldap`] handle.
#[derive(Debug)]
pub struct LdapConnection {
	/// The handle requests are sent through
	ldap: ldap3::Ldap,
	/// Whether the connection was established over LDAPS
	ssl: bool,
	/// Whether the connection was secured with StartTLS
	tls: bool,
	/// Timeout applied to every request
	operation_timeout: Duration,
	/// Paged results control attached to the following searches
	paging: Option<RawControl>,
}

impl LdapConnection {
	/// Connect to the server at the configured URL, binding with the
	/// configured DN if one is set.
	///
	/// # Errors
	/// Any error reading the TLS material, connecting or binding.
	pub async fn connect(config: &Config) -> Result<Self, Error> {
		let settings = config.connection.to_settings().await?;
		let (conn, ldap) = LdapConnAsync::from_url_with_settings(settings, &config.url).await?;
		tokio::spawn(async move {
			if let Err(err) = conn.drive().await {
				warn!("Ldap connection error {err}");
			}
		});

		let scheme = config.url.scheme();
		let mut connection =
			Self::new(ldap, scheme == "ldaps", config.connection.operation_timeout);
		connection.tls = config.connection.tls.starttls && scheme == "ldap";
		if let Some(bind_dn) = &config.bind_dn {
			connection.bind(bind_dn, config.bind_password.as_deref().unwrap_or_default()).await?;
		}
		Ok(connection)
	}

	/// Wrap an established handle.
	#[must_use]
	pub fn new(ldap: ldap3::Ldap, ssl: bool, operation_timeout: Duration) -> Self {
		Self { ldap, ssl, tls: false, operation_timeout, paging: None }
	}

	/// Authenticate with a simple bind.
	///
	/// # Errors
	/// [`Error::Server`] if the server rejects the credentials.
	pub async fn bind(&mut self, dn: &str, password: &str) -> Result<(), Error> {
		let result = self.handle().simple_bind(dn, password).await?;
		check(result)?;
		debug!("Bound as {dn}");
		Ok(())
	}

	/// Close the connection.
	///
	/// # Errors
	/// Any error sending the request.
	pub async fn unbind(mut self) -> Result<(), Error> {
		self.ldap.unbind().await?;
		Ok(())
	}

	/// The handle, with the operation timeout set for the next request.
	fn handle(&mut self) -> &mut ldap3::Ldap {
		self.ldap.with_timeout(self.operation_timeout)
	}

	/// Perform a search with the given scope, attaching the paging control
	/// if one is pending.
	async fn search_with_scope(
		&mut self,
		base: &str,
		scope: Scope,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error> {
		let attributes: Vec<&str> = if attributes.is_empty() {
			vec!["*"]
		} else {
			attributes.iter().map(String::as_str).collect()
		};
		let paging = self.paging.clone();
		let ldap = self.handle();
		if let Some(control) = paging {
			ldap.with_controls(vec![control]);
		}

		let SearchResult(entries, result) = ldap.search(base, scope, filter, attributes).await?;
		let cookie = paged_results_cookie(&result);
		check(result)?;
		let entries = entries.into_iter().map(SearchEntry::construct).map(RawEntry::from).collect();
		Ok(SearchResponse { entries, cookie })
	}

	/// Apply modifications to an entry.
	async fn modify_with(&mut self, dn: &str, mods: Vec<Mod<Vec<u8>>>) -> Result<(), Error> {
		let result = self.handle().modify(dn, mods).await?;
		check(result)?;
		Ok(())
	}
}

#[async_trait]
impl Connection for LdapConnection {
	async fn search(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error> {
		self.search_with_scope(base, Scope::Subtree, filter, attributes).await
	}

	async fn read(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error> {
		self.search_with_scope(base, Scope::Base, filter, attributes).await
	}

	async fn listing(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, Error> {
		self.search_with_scope(base, Scope::OneLevel, filter, attributes).await
	}

	async fn add(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error> {
		let result = self.handle().add(dn, values(attributes)).await?;
		check(result)?;
		Ok(())
	}

	async fn modify_batch(
		&mut self,
		dn: &str,
		modifications: &[BatchModification],
	) -> Result<(), Error> {
		self.modify_with(dn, modifications.iter().map(to_mod).collect()).await
	}

	async fn mod_add(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error> {
		let mods =
			values(attributes).into_iter().map(|(name, values)| Mod::Add(name, values)).collect();
		self.modify_with(dn, mods).await
	}

	async fn mod_replace(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error> {
		let mods = values(attributes)
			.into_iter()
			.map(|(name, values)| Mod::Replace(name, values))
			.collect();
		self.modify_with(dn, mods).await
	}

	async fn mod_delete(&mut self, dn: &str, attributes: &Attributes) -> Result<(), Error> {
		let mods = values(attributes)
			.into_iter()
			.map(|(name, values)| Mod::Delete(name, values))
			.collect();
		self.modify_with(dn, mods).await
	}

	async fn delete(&mut self, dn: &str) -> Result<(), Error> {
		let result = self.handle().delete(dn).await?;
		check(result)?;
		Ok(())
	}

	async fn rename(
		&mut self,
		dn: &str,
		new_rdn: &str,
		new_parent: Option<&str>,
		delete_old_rdn: bool,
	) -> Result<(), Error> {
		let result = self.handle().modifydn(dn, new_rdn, delete_old_rdn, new_parent).await?;
		check(result)?;
		Ok(())
	}

	async fn control_paged_result(
		&mut self,
		page_size: i32,
		critical: bool,
		cookie: &[u8],
	) -> Result<(), Error> {
		self.paging = (page_size > 0).then(|| {
			let mut control: RawControl =
				PagedResults { size: page_size, cookie: cookie.to_vec() }.into();
			control.crit = critical;
			control
		});
		Ok(())
	}

	fn is_using_ssl(&self) -> bool {
		self.ssl
	}

	fn is_using_tls(&self) -> bool {
		self.tls
	}
}

/// Turn a failed result into [`Error::Server`], keeping the code and message.
fn check(result: LdapResult) -> Result<LdapResult, Error> {
	if result.rc == 0 {
		Ok(result)
	} else {
		Err(Error::Server { code: result.rc, message: result.text })
	}
}

/// The cookie of the paged results control in a search result, if the server
/// sent one.
fn paged_results_cookie(result: &LdapResult) -> Option<Vec<u8>> {
	result.ctrls.iter().find_map(|Control(kind, raw)| match kind {
		Some(ControlType::PagedResults) if raw.val.is_some() => {
			Some(raw.parse::<PagedResults>().cookie)
		}
		Some(ControlType::PagedResults) => {
			warn!("Ignoring paged results control without a value");
			None
		}
		_ => None,
	})
}

/// Attributes in the shape `ldap3` sends them.
fn values(attributes: &Attributes) -> Vec<(Vec<u8>, HashSet<Vec<u8>>)> {
	attributes
		.iter()
		.map(|(name, values)| {
			let values = values.iter().map(|value| value.as_bytes().to_vec()).collect();
			(name.clone().into_bytes(), values)
		})
		.collect()
}

/// Convert a modification into an `ldap3` modify operation. Removing an
/// attribute entirely is a delete without values.
fn to_mod(modification: &BatchModification) -> Mod<Vec<u8>> {
	let attribute = modification.attribute.clone().into_bytes();
	let values = modification.values.iter().map(|value| value.as_bytes().to_vec()).collect();
	match modification.kind {
		ModificationKind::Add => Mod::Add(attribute, values),
		ModificationKind::Replace => Mod::Replace(attribute, values),
		ModificationKind::Remove | ModificationKind::RemoveAll => Mod::Delete(attribute, values),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use ldap3::Mod;

	use super::to_mod;
	use crate::{attributes::Value, models::BatchModification};

	#[test]
	fn converts_modifications() {
		let replace = to_mod(&BatchModification::replace("cn", vec![Value::from("John")]));
		assert!(matches!(
			replace,
			Mod::Replace(name, values)
				if name == b"cn" && values == HashSet::from([b"John".to_vec()])
		));

		let remove_all = to_mod(&BatchModification::remove_all("mail"));
		assert!(matches!(
			remove_all,
			Mod::Delete(name, values) if name == b"mail" && values.is_empty()
		));
	}
}
