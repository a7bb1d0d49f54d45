use std::{collections::VecDeque, error::Error};

use async_trait::async_trait;
use ldap_orm::{
	attributes::Attributes,
	config::{Config, ConnectionConfig},
	connection::{Connection, SearchResponse},
	entry::RawEntry,
	models::{BatchModification, Entry, Observer},
	schema::Schema,
};
use url::Url;

/// A request received by [`MockConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	Search { base: String, filter: String, attributes: Vec<String> },
	Read { base: String, filter: String, attributes: Vec<String> },
	Listing { base: String, filter: String, attributes: Vec<String> },
	Add { dn: String, attributes: Attributes },
	ModifyBatch { dn: String, modifications: Vec<BatchModification> },
	ModAdd { dn: String, attributes: Attributes },
	ModReplace { dn: String, attributes: Attributes },
	ModDelete { dn: String, attributes: Attributes },
	Delete { dn: String },
	Rename { dn: String, new_rdn: String, new_parent: Option<String>, delete_old_rdn: bool },
	PagedResult { page_size: i32, critical: bool, cookie: Vec<u8> },
}

impl Call {
	pub fn is_search(&self) -> bool {
		matches!(self, Call::Search { .. } | Call::Read { .. } | Call::Listing { .. })
	}
}

/// A connection recording every request. Searches answer with the queued
/// responses in order, or with no entries once the queue is empty. Write
/// requests fail with the queued error, if any.
#[derive(Debug, Default)]
pub struct MockConnection {
	pub calls: Vec<Call>,
	pub responses: VecDeque<Result<SearchResponse, ldap_orm::Error>>,
	pub write_error: Option<ldap_orm::Error>,
	pub secure: bool,
}

impl MockConnection {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(mut self, response: SearchResponse) -> Self {
		self.responses.push_back(Ok(response));
		self
	}

	pub fn fail(mut self, error: ldap_orm::Error) -> Self {
		self.responses.push_back(Err(error));
		self
	}

	pub fn searches(&self) -> Vec<&Call> {
		self.calls.iter().filter(|call| call.is_search()).collect()
	}

	fn answer(&mut self, call: Call) -> Result<SearchResponse, ldap_orm::Error> {
		self.calls.push(call);
		self.responses.pop_front().unwrap_or_else(|| Ok(SearchResponse::default()))
	}

	fn write(&mut self, call: Call) -> Result<(), ldap_orm::Error> {
		self.calls.push(call);
		match self.write_error.take() {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}

#[async_trait]
impl Connection for MockConnection {
	async fn search(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, ldap_orm::Error> {
		self.answer(Call::Search {
			base: base.to_owned(),
			filter: filter.to_owned(),
			attributes: attributes.to_vec(),
		})
	}

	async fn read(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, ldap_orm::Error> {
		self.answer(Call::Read {
			base: base.to_owned(),
			filter: filter.to_owned(),
			attributes: attributes.to_vec(),
		})
	}

	async fn listing(
		&mut self,
		base: &str,
		filter: &str,
		attributes: &[String],
	) -> Result<SearchResponse, ldap_orm::Error> {
		self.answer(Call::Listing {
			base: base.to_owned(),
			filter: filter.to_owned(),
			attributes: attributes.to_vec(),
		})
	}

	async fn add(&mut self, dn: &str, attributes: &Attributes) -> Result<(), ldap_orm::Error> {
		self.write(Call::Add { dn: dn.to_owned(), attributes: attributes.clone() })
	}

	async fn modify_batch(
		&mut self,
		dn: &str,
		modifications: &[BatchModification],
	) -> Result<(), ldap_orm::Error> {
		self.write(Call::ModifyBatch { dn: dn.to_owned(), modifications: modifications.to_vec() })
	}

	async fn mod_add(&mut self, dn: &str, attributes: &Attributes) -> Result<(), ldap_orm::Error> {
		self.write(Call::ModAdd { dn: dn.to_owned(), attributes: attributes.clone() })
	}

	async fn mod_replace(
		&mut self,
		dn: &str,
		attributes: &Attributes,
	) -> Result<(), ldap_orm::Error> {
		self.write(Call::ModReplace { dn: dn.to_owned(), attributes: attributes.clone() })
	}

	async fn mod_delete(
		&mut self,
		dn: &str,
		attributes: &Attributes,
	) -> Result<(), ldap_orm::Error> {
		self.write(Call::ModDelete { dn: dn.to_owned(), attributes: attributes.clone() })
	}

	async fn delete(&mut self, dn: &str) -> Result<(), ldap_orm::Error> {
		self.write(Call::Delete { dn: dn.to_owned() })
	}

	async fn rename(
		&mut self,
		dn: &str,
		new_rdn: &str,
		new_parent: Option<&str>,
		delete_old_rdn: bool,
	) -> Result<(), ldap_orm::Error> {
		self.write(Call::Rename {
			dn: dn.to_owned(),
			new_rdn: new_rdn.to_owned(),
			new_parent: new_parent.map(str::to_owned),
			delete_old_rdn,
		})
	}

	async fn control_paged_result(
		&mut self,
		page_size: i32,
		critical: bool,
		cookie: &[u8],
	) -> Result<(), ldap_orm::Error> {
		self.calls.push(Call::PagedResult { page_size, critical, cookie: cookie.to_vec() });
		Ok(())
	}

	fn is_using_ssl(&self) -> bool {
		self.secure
	}

	fn is_using_tls(&self) -> bool {
		false
	}
}

/// Records the lifecycle events it is notified of.
#[derive(Debug, Default)]
pub struct RecordingObserver {
	pub events: Vec<&'static str>,
}

impl Observer for RecordingObserver {
	fn creating(&mut self, _entry: &Entry) {
		self.events.push("creating");
	}

	fn created(&mut self, _entry: &Entry) {
		self.events.push("created");
	}

	fn updating(&mut self, _entry: &Entry) {
		self.events.push("updating");
	}

	fn updated(&mut self, _entry: &Entry) {
		self.events.push("updated");
	}

	fn deleting(&mut self, _entry: &Entry) {
		self.events.push("deleting");
	}

	fn deleted(&mut self, _entry: &Entry) {
		self.events.push("deleted");
	}
}

pub fn raw_entry(dn: &str, attributes: &[(&str, &[&str])]) -> RawEntry {
	RawEntry::new(dn, attributes.iter().map(|(name, values)| (*name, values.to_vec())).collect())
}

pub fn response(entries: Vec<RawEntry>) -> SearchResponse {
	SearchResponse::new(entries)
}

pub fn page(entries: Vec<RawEntry>, cookie: &[u8]) -> SearchResponse {
	SearchResponse { entries, cookie: Some(cookie.to_vec()) }
}

pub fn server_error(code: u32, message: &str) -> ldap_orm::Error {
	ldap_orm::Error::Server { code, message: message.to_owned() }
}

pub fn docker_config() -> Config {
	Config {
		url: Url::parse("ldap://localhost:1389").unwrap(),
		connection: ConnectionConfig::default(),
		bind_dn: Some("cn=admin,dc=example,dc=org".to_owned()),
		bind_password: Some("adminpassword".to_owned()),
		base_dn: "dc=example,dc=org".to_owned(),
		schema: Schema::default(),
	}
}

pub async fn ldap_connect() -> Result<ldap3::Ldap, Box<dyn Error>> {
	let (conn, mut ldap) = ldap3::LdapConnAsync::new("ldap://localhost:1389").await?;
	let _handle = tokio::spawn(async move {
		if let Err(err) = conn.drive().await {
			panic!("Ldap connection error {err}");
		}
	});
	ldap.simple_bind("cn=admin,dc=example,dc=org", "adminpassword").await?;
	Ok(ldap)
}

pub async fn ldap_delete_tree(ldap: &mut ldap3::Ldap, dn: &str) -> Result<(), Box<dyn Error>> {
	let (entries, _res) = ldap
		.search(dn, ldap3::Scope::Subtree, "(objectClass=*)", vec!["1.1"])
		.await?
		.success()?;
	let mut dns: Vec<String> =
		entries.into_iter().map(|entry| ldap3::SearchEntry::construct(entry).dn).collect();
	dns.sort_by_key(|dn| std::cmp::Reverse(dn.matches(',').count()));
	for dn in dns {
		ldap.delete(&dn).await?.success()?;
	}
	Ok(())
}
