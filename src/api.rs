//! Data service client.
//!
//! `DataService` is the seam the graph page talks to; `HttpDataService`
//! implements it over `fetch` against the REST backend.

use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{
	NewRelationship, Person, PersonFields, PersonId, Point, Relationship, RelationshipId,
	SourceData,
};

/// Operations the graph consumes from the backend.
#[allow(async_fn_in_trait)]
pub trait DataService {
	/// All people of the current user.
	async fn list_people(&self) -> Result<Vec<Person>, ApiError>;
	/// All relationships of the current user.
	async fn list_relationships(&self) -> Result<Vec<Relationship>, ApiError>;
	/// Creates a person; the returned record carries the new id.
	async fn create_person(&self, fields: &PersonFields) -> Result<Person, ApiError>;
	/// Updates a person's editable fields.
	async fn update_person(&self, id: PersonId, fields: &PersonFields)
	-> Result<Person, ApiError>;
	/// Deletes a person and, server side, their relationships.
	async fn delete_person(&self, id: PersonId) -> Result<(), ApiError>;
	/// Writes a relationship without validation. Prefer `create_relationship`.
	async fn insert_relationship(&self, rel: &NewRelationship) -> Result<Relationship, ApiError>;
	/// Deletes a relationship.
	async fn delete_relationship(&self, id: RelationshipId) -> Result<(), ApiError>;
	/// Persists one node position.
	async fn save_position(&self, id: PersonId, at: Point) -> Result<(), ApiError>;

	/// Creates a relationship; self-relationships fail before any write.
	async fn create_relationship(&self, rel: &NewRelationship) -> Result<Relationship, ApiError> {
		rel.validate()?;
		self.insert_relationship(rel).await
	}
}

/// Fetches people and relationships as a pair. A failed read degrades to an
/// empty list so the graph still renders.
pub async fn load_source<S: DataService>(service: &S) -> SourceData {
	let people = service.list_people().await.unwrap_or_else(|err| {
		log::warn!("Failed to load people: {err}");
		Vec::new()
	});
	let relationships = service.list_relationships().await.unwrap_or_else(|err| {
		log::warn!("Failed to load relationships: {err}");
		Vec::new()
	});
	SourceData {
		people,
		relationships,
	}
}

/// `DataService` over the browser `fetch` API.
#[derive(Clone, Debug)]
pub struct HttpDataService {
	config: ApiConfig,
}

fn js_err(err: JsValue) -> ApiError {
	ApiError::Network(format!("{err:?}"))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
	serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ApiError> {
	if text.trim().is_empty() {
		return Ok(Vec::new());
	}
	decode::<Option<Vec<T>>>(text).map(Option::unwrap_or_default)
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
	serde_json::to_string(value).map_err(|e| ApiError::Decode(e.to_string()))
}

impl HttpDataService {
	/// Creates a client for the configured base URL.
	pub fn new(config: ApiConfig) -> Self {
		Self { config }
	}

	fn bearer_token(&self) -> Option<String> {
		web_sys::window()?
			.local_storage()
			.ok()??
			.get_item(&self.config.token_key)
			.ok()?
			.filter(|t| !t.is_empty())
	}

	async fn send(&self, method: &str, path: &str, body: Option<String>) -> Result<String, ApiError> {
		let url = format!("{}{}", self.config.base_url, path);

		let opts = RequestInit::new();
		opts.set_method(method);
		opts.set_mode(RequestMode::Cors);

		let headers = Headers::new().map_err(js_err)?;
		if let Some(token) = self.bearer_token() {
			headers
				.set("Authorization", &format!("Bearer {token}"))
				.map_err(js_err)?;
		}
		if let Some(body) = &body {
			headers
				.set("Content-Type", "application/json")
				.map_err(js_err)?;
			opts.set_body(&JsValue::from_str(body));
		}
		opts.set_headers(&headers);

		let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
		let window = web_sys::window().ok_or_else(|| ApiError::Unsupported("no window".into()))?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(js_err)?;
		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| ApiError::Decode("response is not a Response".into()))?;

		let text = JsFuture::from(resp.text().map_err(js_err)?)
			.await
			.map_err(js_err)?
			.as_string()
			.unwrap_or_default();

		if !resp.ok() {
			return Err(ApiError::Http {
				status: resp.status(),
				body: text,
			});
		}
		Ok(text)
	}
}

impl DataService for HttpDataService {
	async fn list_people(&self) -> Result<Vec<Person>, ApiError> {
		decode_list(&self.send("GET", "/people", None).await?)
	}

	async fn list_relationships(&self) -> Result<Vec<Relationship>, ApiError> {
		decode_list(&self.send("GET", "/relationships", None).await?)
	}

	async fn create_person(&self, fields: &PersonFields) -> Result<Person, ApiError> {
		decode(&self.send("POST", "/people", Some(encode(fields)?)).await?)
	}

	async fn update_person(
		&self,
		id: PersonId,
		fields: &PersonFields,
	) -> Result<Person, ApiError> {
		let text = self
			.send("PUT", &format!("/people/{id}"), Some(encode(fields)?))
			.await?;
		// The backend acknowledges with a status object rather than the record.
		if let Ok(person) = decode::<Person>(&text) {
			return Ok(person);
		}
		self.list_people()
			.await?
			.into_iter()
			.find(|p| p.id == id)
			.ok_or_else(|| ApiError::Decode(format!("person {id} missing after update")))
	}

	async fn delete_person(&self, id: PersonId) -> Result<(), ApiError> {
		self.send("DELETE", &format!("/people/{id}"), None).await?;
		Ok(())
	}

	async fn insert_relationship(&self, rel: &NewRelationship) -> Result<Relationship, ApiError> {
		decode(&self.send("POST", "/relationships", Some(rel.to_wire_json()?)).await?)
	}

	async fn delete_relationship(&self, id: RelationshipId) -> Result<(), ApiError> {
		self.send("DELETE", &format!("/relationships/{id}"), None)
			.await?;
		Ok(())
	}

	async fn save_position(&self, id: PersonId, at: Point) -> Result<(), ApiError> {
		let body = serde_json::json!({ "id": id, "x": at.x, "y": at.y });
		self.send("PUT", "/people/position", Some(body.to_string()))
			.await?;
		Ok(())
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::model::{Gender, Placement, RecordedDate, RelationKind};

	/// Records every call; reads can be made to fail.
	#[derive(Default)]
	pub(crate) struct RecordingService {
		pub data: RefCell<SourceData>,
		pub calls: RefCell<Vec<String>>,
		pub fail_reads: bool,
		pub fail_writes: bool,
	}

	/// Copies edited fields onto a stored record, keeping id and placement.
	fn apply_fields(fields: &PersonFields, person: &mut Person) {
		let present = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());
		person.first_name = fields.first_name.clone();
		person.middle_name = present(&fields.middle_name);
		person.last_name = fields.last_name.clone();
		person.gender = fields.gender;
		person.birth_date = fields.birth_date.clone();
		person.death_date = fields.death_date.clone();
		person.photo_url = present(&fields.photo_url);
	}

	impl RecordingService {
		fn write(&self, call: String) -> Result<(), ApiError> {
			self.calls.borrow_mut().push(call);
			if self.fail_writes {
				return Err(ApiError::Http {
					status: 500,
					body: "boom".into(),
				});
			}
			Ok(())
		}

		fn read(&self, call: &str) -> Result<(), ApiError> {
			self.calls.borrow_mut().push(call.to_string());
			if self.fail_reads {
				return Err(ApiError::Network("offline".into()));
			}
			Ok(())
		}
	}

	impl DataService for RecordingService {
		async fn list_people(&self) -> Result<Vec<Person>, ApiError> {
			self.read("list_people")?;
			Ok(self.data.borrow().people.clone())
		}

		async fn list_relationships(&self) -> Result<Vec<Relationship>, ApiError> {
			self.read("list_relationships")?;
			Ok(self.data.borrow().relationships.clone())
		}

		async fn create_person(&self, fields: &PersonFields) -> Result<Person, ApiError> {
			self.write("create_person".into())?;
			let mut data = self.data.borrow_mut();
			let id = data.people.iter().map(|p| p.id).max().unwrap_or(0) + 1;
			let mut person = Person {
				id,
				first_name: String::new(),
				middle_name: None,
				last_name: String::new(),
				gender: fields.gender,
				birth_date: None,
				death_date: None,
				photo_url: None,
				placement: Placement::Unset,
			};
			apply_fields(fields, &mut person);
			data.people.push(person.clone());
			Ok(person)
		}

		async fn update_person(
			&self,
			id: PersonId,
			fields: &PersonFields,
		) -> Result<Person, ApiError> {
			self.write(format!("update_person {id}"))?;
			let mut data = self.data.borrow_mut();
			let person = data
				.people
				.iter_mut()
				.find(|p| p.id == id)
				.ok_or(ApiError::Http {
					status: 404,
					body: String::new(),
				})?;
			apply_fields(fields, person);
			Ok(person.clone())
		}

		async fn delete_person(&self, id: PersonId) -> Result<(), ApiError> {
			self.write(format!("delete_person {id}"))?;
			self.data.borrow_mut().remove_person(id);
			Ok(())
		}

		async fn insert_relationship(
			&self,
			rel: &NewRelationship,
		) -> Result<Relationship, ApiError> {
			self.write(format!("insert_relationship {}->{}", rel.from, rel.to))?;
			let mut data = self.data.borrow_mut();
			let id = data.relationships.iter().map(|r| r.id).max().unwrap_or(0) + 1;
			let created = Relationship {
				id,
				from: rel.from,
				to: rel.to,
				kind: rel.kind,
				label: rel.label.clone(),
				description: rel.description.clone(),
			};
			data.relationships.push(created.clone());
			Ok(created)
		}

		async fn delete_relationship(&self, id: RelationshipId) -> Result<(), ApiError> {
			self.write(format!("delete_relationship {id}"))?;
			self.data.borrow_mut().remove_relationship(id);
			Ok(())
		}

		async fn save_position(&self, id: PersonId, at: Point) -> Result<(), ApiError> {
			self.write(format!("save_position {id} {} {}", at.x, at.y))?;
			self.data.borrow_mut().save_placement(id, at);
			Ok(())
		}
	}

	#[test]
	fn test_self_relationship_makes_no_write() {
		let svc = RecordingService::default();
		let rel = NewRelationship::new(3, 3, RelationKind::Parent);
		let result = pollster::block_on(svc.create_relationship(&rel));
		assert!(matches!(result, Err(ApiError::SelfRelationship(3))));
		assert!(svc.calls.borrow().is_empty());
	}

	#[test]
	fn test_create_relationship_writes_once() {
		let svc = RecordingService::default();
		let rel = NewRelationship::with_label(1, 2, "Супруг");
		let created = pollster::block_on(svc.create_relationship(&rel)).unwrap();
		assert_eq!(created.kind, RelationKind::Spouse);
		assert_eq!(svc.calls.borrow().as_slice(), ["insert_relationship 1->2"]);
	}

	#[test]
	fn test_failed_reads_degrade_to_empty() {
		let svc = RecordingService {
			fail_reads: true,
			..Default::default()
		};
		let source = pollster::block_on(load_source(&svc));
		assert!(source.people.is_empty());
		assert!(source.relationships.is_empty());
		assert_eq!(svc.calls.borrow().len(), 2);
	}

	#[test]
	fn test_write_failure_is_returned() {
		let svc = RecordingService {
			fail_writes: true,
			..Default::default()
		};
		let err = pollster::block_on(svc.save_position(1, Point::new(1.0, 2.0))).unwrap_err();
		assert_eq!(
			err,
			ApiError::Http {
				status: 500,
				body: "boom".into()
			}
		);
	}

	#[test]
	fn test_update_person_keeps_placement() {
		let svc = RecordingService::default();
		let fields = PersonFields {
			first_name: "Анна".into(),
			middle_name: Some(" ".into()),
			last_name: "Ким".into(),
			gender: Gender::Female,
			birth_date: RecordedDate::parse("1950"),
			death_date: None,
			photo_url: None,
		};
		let created = pollster::block_on(svc.create_person(&fields)).unwrap();
		svc.data
			.borrow_mut()
			.save_placement(created.id, Point::new(80.0, 90.0));
		let updated = pollster::block_on(svc.update_person(
			created.id,
			&PersonFields {
				death_date: RecordedDate::parse("2020-03"),
				..fields
			},
		))
		.unwrap();
		assert_eq!(updated.middle_name, None);
		assert!(updated.is_deceased());
		assert_eq!(updated.placement, Placement::Saved(Point::new(80.0, 90.0)));
	}

	#[test]
	fn test_decode_list_accepts_null() {
		assert!(decode_list::<Person>("null").unwrap().is_empty());
		assert!(decode_list::<Person>("").unwrap().is_empty());
		assert!(decode_list::<Person>("{").is_err());
	}
}
