//! Person and relationship records as cached from the data service.
//!
//! The wire format still carries the legacy `position_x`/`position_y` pair
//! (with `(0, 0)` meaning "never placed") and a free-text relationship
//! `type`. Both are converted into closed Rust types at the serde boundary.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Identity of a person record.
pub type PersonId = i64;

/// Identity of a relationship record.
pub type RelationshipId = i64;

/// A point in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Where a node's position comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Placement {
	/// Never positioned by the user or by a layout reset.
	#[default]
	Unset,
	/// Persisted in the backing store; always wins over auto-layout.
	Saved(Point),
	/// Produced by the layout engine for this render only.
	Computed(Point),
}

impl Placement {
	/// The coordinates, if any.
	pub fn point(&self) -> Option<Point> {
		match *self {
			Placement::Unset => None,
			Placement::Saved(p) | Placement::Computed(p) => Some(p),
		}
	}

	/// True iff the position came from the backing store.
	pub fn is_saved(&self) -> bool {
		matches!(self, Placement::Saved(_))
	}

	fn from_wire(x: f64, y: f64) -> Self {
		if x == 0.0 && y == 0.0 {
			Placement::Unset
		} else {
			Placement::Saved(Point::new(x, y))
		}
	}

	/// Only saved positions reach the backend.
	fn to_wire(self) -> (f64, f64) {
		match self {
			Placement::Saved(p) => (p.x, p.y),
			Placement::Unset | Placement::Computed(_) => (0.0, 0.0),
		}
	}
}

/// Gender of a person; drives card colour and the avatar fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gender {
	/// Male.
	#[default]
	Male,
	/// Female.
	Female,
	/// Anything else recorded by the backend.
	Other,
}

impl Gender {
	fn from_wire(s: &str) -> Self {
		match s.trim().to_lowercase().as_str() {
			"male" | "m" | "мужской" => Gender::Male,
			"female" | "f" | "женский" => Gender::Female,
			_ => Gender::Other,
		}
	}

	/// Wire representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			Gender::Male => "male",
			Gender::Female => "female",
			Gender::Other => "other",
		}
	}
}

/// How much of a recorded date is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DatePrecision {
	/// Only the year.
	Year,
	/// Year and month.
	Month,
	/// A full calendar day.
	Day,
}

/// A date as the backend stores it: text that may be partial (`1990`,
/// `1990-05`) or not a date at all. The text is what gets shown and written
/// back; the parsed form only feeds age arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedDate {
	raw: String,
	parsed: Option<(NaiveDate, DatePrecision)>,
}

impl RecordedDate {
	/// Wraps stored text; blank text is no date at all.
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		if raw.is_empty() {
			return None;
		}
		Some(Self {
			raw: raw.to_string(),
			parsed: parse_parts(raw),
		})
	}

	/// A full calendar day.
	pub fn day(date: NaiveDate) -> Self {
		Self {
			raw: date.format("%Y-%m-%d").to_string(),
			parsed: Some((date, DatePrecision::Day)),
		}
	}

	/// The text as recorded.
	pub fn raw(&self) -> &str {
		&self.raw
	}

	/// First day the recorded value covers, with its precision.
	pub fn parsed(&self) -> Option<(NaiveDate, DatePrecision)> {
		self.parsed
	}

	/// `17.05.1990`, `05.1990` or `1990`; unparseable text as recorded.
	pub fn display(&self) -> String {
		match self.parsed {
			Some((d, DatePrecision::Day)) => d.format("%d.%m.%Y").to_string(),
			Some((d, DatePrecision::Month)) => d.format("%m.%Y").to_string(),
			Some((d, DatePrecision::Year)) => d.format("%Y").to_string(),
			None => self.raw.clone(),
		}
	}
}

/// `YYYY-MM-DD` (optionally the head of a timestamp), `YYYY-MM` or `YYYY`.
fn parse_parts(s: &str) -> Option<(NaiveDate, DatePrecision)> {
	if let Some(Ok(d)) = s.get(..10).map(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d")) {
		return Some((d, DatePrecision::Day));
	}
	let (year, month) = match s.split_once('-') {
		Some((y, m)) => (y, Some(m)),
		None => (s, None),
	};
	if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	let year: i32 = year.parse().ok()?;
	match month {
		None => Some((NaiveDate::from_ymd_opt(year, 1, 1)?, DatePrecision::Year)),
		Some(m) if (1..=2).contains(&m.len()) => {
			let month: u32 = m.parse().ok()?;
			Some((NaiveDate::from_ymd_opt(year, month, 1)?, DatePrecision::Month))
		}
		Some(_) => None,
	}
}

fn non_empty(s: Option<String>) -> Option<String> {
	s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// A person record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersonWire", into = "PersonWire")]
pub struct Person {
	/// Stable identity.
	pub id: PersonId,
	/// First name.
	pub first_name: String,
	/// Middle name (patronymic).
	pub middle_name: Option<String>,
	/// Last name.
	pub last_name: String,
	/// Gender.
	pub gender: Gender,
	/// Birth date as recorded.
	pub birth_date: Option<RecordedDate>,
	/// Death date as recorded; present means deceased.
	pub death_date: Option<RecordedDate>,
	/// Photo URL.
	pub photo_url: Option<String>,
	/// Persisted position, `Unset` or `Saved`.
	pub placement: Placement,
}

impl Person {
	/// "first middle last" with empty parts skipped.
	pub fn full_name(&self) -> String {
		[
			Some(self.first_name.as_str()),
			self.middle_name.as_deref(),
			Some(self.last_name.as_str()),
		]
		.into_iter()
		.flatten()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
	}

	/// Name shown on the graph card.
	pub fn display_name(&self) -> String {
		format!("{} {}", self.first_name.trim(), self.last_name.trim())
			.trim()
			.to_string()
	}

	/// Text matched by search: first + last + middle, lower-cased.
	pub fn search_haystack(&self) -> String {
		format!(
			"{}{}{}",
			self.first_name,
			self.last_name,
			self.middle_name.as_deref().unwrap_or_default()
		)
		.to_lowercase()
	}

	/// One or two initials for the avatar fallback.
	pub fn initials(&self) -> String {
		self.first_name
			.chars()
			.next()
			.into_iter()
			.chain(self.last_name.chars().next())
			.collect::<String>()
			.to_uppercase()
	}

	/// True iff a death date is recorded.
	pub fn is_deceased(&self) -> bool {
		self.death_date.is_some()
	}

	/// Whole years between birth and death (or `today` when alive). When
	/// either end is known only to the year, this is the difference of years.
	pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
		let (birth, birth_precision) = self.birth_date.as_ref()?.parsed()?;
		let (reference, reference_precision) = match &self.death_date {
			Some(death) => death.parsed()?,
			None => (today, DatePrecision::Day),
		};
		let before_birthday = match birth_precision.min(reference_precision) {
			DatePrecision::Year => false,
			DatePrecision::Month => reference.month() < birth.month(),
			DatePrecision::Day => (reference.month(), reference.day()) < (birth.month(), birth.day()),
		};
		let years = reference.year() - birth.year() - i32::from(before_birthday);
		u32::try_from(years).ok()
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PersonWire {
	id: PersonId,
	#[serde(default)]
	first_name: String,
	#[serde(default)]
	middle_name: Option<String>,
	#[serde(default)]
	last_name: String,
	#[serde(default)]
	birth_date: Option<String>,
	#[serde(default)]
	death_date: Option<String>,
	#[serde(default)]
	gender: String,
	#[serde(default)]
	photo_url: Option<String>,
	#[serde(default)]
	position_x: f64,
	#[serde(default)]
	position_y: f64,
}

impl From<PersonWire> for Person {
	fn from(w: PersonWire) -> Self {
		Self {
			id: w.id,
			first_name: w.first_name,
			middle_name: non_empty(w.middle_name),
			last_name: w.last_name,
			gender: Gender::from_wire(&w.gender),
			birth_date: w.birth_date.as_deref().and_then(RecordedDate::parse),
			death_date: w.death_date.as_deref().and_then(RecordedDate::parse),
			photo_url: non_empty(w.photo_url),
			placement: Placement::from_wire(w.position_x, w.position_y),
		}
	}
}

impl From<Person> for PersonWire {
	fn from(p: Person) -> Self {
		let (position_x, position_y) = p.placement.to_wire();
		Self {
			id: p.id,
			first_name: p.first_name,
			middle_name: p.middle_name,
			last_name: p.last_name,
			birth_date: p.birth_date.map(|d| d.raw),
			death_date: p.death_date.map(|d| d.raw),
			gender: p.gender.as_str().to_string(),
			photo_url: p.photo_url,
			position_x,
			position_y,
		}
	}
}

/// Editable fields of a person, the create/update payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(into = "FieldsWire")]
pub struct PersonFields {
	/// First name.
	pub first_name: String,
	/// Middle name.
	pub middle_name: Option<String>,
	/// Last name.
	pub last_name: String,
	/// Gender.
	pub gender: Gender,
	/// Birth date, possibly partial.
	pub birth_date: Option<RecordedDate>,
	/// Death date, possibly partial.
	pub death_date: Option<RecordedDate>,
	/// Photo URL.
	pub photo_url: Option<String>,
}

#[derive(Serialize)]
struct FieldsWire {
	first_name: String,
	middle_name: String,
	last_name: String,
	birth_date: String,
	death_date: Option<String>,
	gender: &'static str,
	photo_url: String,
}

impl From<PersonFields> for FieldsWire {
	fn from(f: PersonFields) -> Self {
		Self {
			first_name: f.first_name,
			middle_name: f.middle_name.unwrap_or_default(),
			last_name: f.last_name,
			birth_date: f.birth_date.map(|d| d.raw).unwrap_or_default(),
			death_date: f.death_date.map(|d| d.raw),
			gender: f.gender.as_str(),
			photo_url: f.photo_url.unwrap_or_default(),
		}
	}
}

/// Closed classification of a relationship.
///
/// The direction convention is "`from` is the `kind` of `to`": a `Parent`
/// relationship from A to B reads "A is the parent of B".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RelationKind {
	/// `from` is a parent of `to`.
	Parent,
	/// `from` is a child of `to`.
	Child,
	/// Partners.
	Spouse,
	/// Brothers and sisters.
	Sibling,
	/// Anything else; the free-text label carries the meaning.
	#[default]
	Other,
}

const PARENT_WORDS: &[&str] = &[
	"parent", "mother", "father", "step_parent", "stepparent", "родитель", "мать", "отец",
	"мама", "папа", "отчим", "мачеха",
];
const CHILD_WORDS: &[&str] = &[
	"child", "son", "daughter", "ребенок", "ребёнок", "сын", "дочь", "дочка", "пасынок",
	"падчерица",
];
const SPOUSE_WORDS: &[&str] = &[
	"spouse", "husband", "wife", "partner", "супруг", "супруга", "муж", "жена",
];
const SIBLING_WORDS: &[&str] = &[
	"sibling", "brother", "sister", "брат", "сестра", "брат/сестра",
];

impl RelationKind {
	/// Classifies a free-text relationship type, case-insensitively.
	pub fn classify(raw: &str) -> Self {
		let needle = raw.trim().to_lowercase();
		let needle = needle.as_str();
		if PARENT_WORDS.contains(&needle) {
			RelationKind::Parent
		} else if CHILD_WORDS.contains(&needle) {
			RelationKind::Child
		} else if SPOUSE_WORDS.contains(&needle) {
			RelationKind::Spouse
		} else if SIBLING_WORDS.contains(&needle) {
			RelationKind::Sibling
		} else {
			RelationKind::Other
		}
	}

	/// Parent/child relations determine generational rank.
	pub fn is_vertical(&self) -> bool {
		matches!(self, RelationKind::Parent | RelationKind::Child)
	}

	/// The relation read from the other end.
	pub fn inverse(&self) -> Self {
		match self {
			RelationKind::Parent => RelationKind::Child,
			RelationKind::Child => RelationKind::Parent,
			other => *other,
		}
	}

	/// Display term.
	pub fn canonical_label(&self) -> &'static str {
		match self {
			RelationKind::Parent => "Родитель",
			RelationKind::Child => "Ребенок",
			RelationKind::Spouse => "Супруг",
			RelationKind::Sibling => "Брат/Сестра",
			RelationKind::Other => "Связь",
		}
	}
}

/// A directed, typed relationship between two people.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RelationshipWire", into = "RelationshipWire")]
pub struct Relationship {
	/// Stable identity.
	pub id: RelationshipId,
	/// Source person.
	pub from: PersonId,
	/// Target person.
	pub to: PersonId,
	/// Closed classification.
	pub kind: RelationKind,
	/// Free-text label as entered by the user.
	pub label: String,
	/// Optional note.
	pub description: String,
}

impl Relationship {
	/// Label to show when read in the recorded direction.
	pub fn display_label(&self) -> &str {
		if self.label.trim().is_empty() {
			self.kind.canonical_label()
		} else {
			self.label.trim()
		}
	}

	/// True iff `id` is one of the endpoints.
	pub fn touches(&self, id: PersonId) -> bool {
		self.from == id || self.to == id
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RelationshipWire {
	#[serde(default)]
	id: RelationshipId,
	from_person_id: PersonId,
	to_person_id: PersonId,
	#[serde(rename = "type", default)]
	kind: String,
	#[serde(default)]
	description: String,
}

impl From<RelationshipWire> for Relationship {
	fn from(w: RelationshipWire) -> Self {
		Self {
			id: w.id,
			from: w.from_person_id,
			to: w.to_person_id,
			kind: RelationKind::classify(&w.kind),
			label: w.kind,
			description: w.description,
		}
	}
}

impl From<Relationship> for RelationshipWire {
	fn from(r: Relationship) -> Self {
		let kind = r.display_label().to_string();
		Self {
			id: r.id,
			from_person_id: r.from,
			to_person_id: r.to,
			kind,
			description: r.description,
		}
	}
}

/// Payload for creating a relationship.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRelationship {
	/// Source person.
	pub from: PersonId,
	/// Target person.
	pub to: PersonId,
	/// Classification.
	pub kind: RelationKind,
	/// Display label; defaults to the kind's canonical term.
	pub label: String,
	/// Optional note.
	pub description: String,
}

impl NewRelationship {
	/// A relationship labelled with the kind's canonical term.
	pub fn new(from: PersonId, to: PersonId, kind: RelationKind) -> Self {
		Self {
			from,
			to,
			kind,
			label: kind.canonical_label().to_string(),
			description: String::new(),
		}
	}

	/// A relationship from free text, e.g. "Бабушка"; the kind is classified.
	pub fn with_label(from: PersonId, to: PersonId, label: &str) -> Self {
		Self {
			from,
			to,
			kind: RelationKind::classify(label),
			label: label.trim().to_string(),
			description: String::new(),
		}
	}

	/// Rejects self-relationships.
	pub fn validate(&self) -> Result<(), ApiError> {
		if self.from == self.to {
			return Err(ApiError::SelfRelationship(self.from));
		}
		Ok(())
	}

	pub(crate) fn to_wire_json(&self) -> Result<String, ApiError> {
		let wire = RelationshipWire {
			id: 0,
			from_person_id: self.from,
			to_person_id: self.to,
			kind: if self.label.trim().is_empty() {
				self.kind.canonical_label().to_string()
			} else {
				self.label.trim().to_string()
			},
			description: self.description.clone(),
		};
		serde_json::to_string(&wire).map_err(|e| ApiError::Decode(e.to_string()))
	}
}

/// The cached pair of record lists everything is derived from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceData {
	/// People.
	pub people: Vec<Person>,
	/// Relationships.
	pub relationships: Vec<Relationship>,
}

impl SourceData {
	/// Looks up a person.
	pub fn person(&self, id: PersonId) -> Option<&Person> {
		self.people.iter().find(|p| p.id == id)
	}

	/// Drops a person and every relationship touching them.
	pub fn remove_person(&mut self, id: PersonId) {
		self.people.retain(|p| p.id != id);
		self.relationships.retain(|r| !r.touches(id));
	}

	/// Drops a relationship.
	pub fn remove_relationship(&mut self, id: RelationshipId) {
		self.relationships.retain(|r| r.id != id);
	}

	/// Records a persisted position. Returns false for an unknown id.
	pub fn save_placement(&mut self, id: PersonId, point: Point) -> bool {
		match self.people.iter_mut().find(|p| p.id == id) {
			Some(p) => {
				p.placement = Placement::Saved(point);
				true
			}
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sentinel_origin_is_unset() {
		let json = r#"{"id":1,"first_name":"Иван","last_name":"Петров","gender":"male","position_x":0,"position_y":0}"#;
		let p: Person = serde_json::from_str(json).unwrap();
		assert_eq!(p.placement, Placement::Unset);
		assert!(!p.placement.is_saved());

		let json = r#"{"id":2,"first_name":"Анна","last_name":"Петрова","gender":"female","position_x":50,"position_y":50}"#;
		let p: Person = serde_json::from_str(json).unwrap();
		assert_eq!(p.placement, Placement::Saved(Point::new(50.0, 50.0)));
	}

	#[test]
	fn test_missing_optional_fields() {
		let json = r#"{"id":3,"first_name":"Олег","last_name":"","birth_date":"","death_date":null,"photo_url":""}"#;
		let p: Person = serde_json::from_str(json).unwrap();
		assert_eq!(p.birth_date, None);
		assert_eq!(p.photo_url, None);
		assert_eq!(p.gender, Gender::Other);
		assert_eq!(p.display_name(), "Олег");
	}

	fn date(raw: &str) -> RecordedDate {
		RecordedDate::parse(raw).unwrap()
	}

	#[test]
	fn test_recorded_date_forms() {
		let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
		assert_eq!(date("1990-05-17").parsed(), Some((ymd(1990, 5, 17), DatePrecision::Day)));
		assert_eq!(
			date("1990-05-17T00:00:00Z").parsed(),
			Some((ymd(1990, 5, 17), DatePrecision::Day))
		);
		assert_eq!(date("1990-05").parsed(), Some((ymd(1990, 5, 1), DatePrecision::Month)));
		assert_eq!(date("1990").parsed(), Some((ymd(1990, 1, 1), DatePrecision::Year)));
		assert_eq!(date("soon").parsed(), None);
		assert_eq!(RecordedDate::parse("  "), None);

		assert_eq!(date("1990-05-17").display(), "17.05.1990");
		assert_eq!(date("1990-05").display(), "05.1990");
		assert_eq!(date("1990").display(), "1990");
		assert_eq!(date("около 1900").display(), "около 1900");
	}

	#[test]
	fn test_partial_dates_round_trip_as_recorded() {
		let json = r#"{"id":4,"first_name":"Пётр","last_name":"Ким","birth_date":"1990","death_date":"2020-05"}"#;
		let p: Person = serde_json::from_str(json).unwrap();
		assert_eq!(p.birth_date.as_ref().map(RecordedDate::raw), Some("1990"));
		let back = serde_json::to_value(&p).unwrap();
		assert_eq!(back["birth_date"], "1990");
		assert_eq!(back["death_date"], "2020-05");
	}

	#[test]
	fn test_age_from_partial_dates() {
		let mut p: Person = serde_json::from_str(r#"{"id":1,"first_name":"A","last_name":"B","birth_date":"1990"}"#).unwrap();
		let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
		assert_eq!(p.age_on(today), Some(34));

		p.birth_date = Some(date("1990-07"));
		assert_eq!(p.age_on(today), Some(33));
		p.birth_date = Some(date("1990-06"));
		assert_eq!(p.age_on(today), Some(34));

		p.death_date = Some(date("2000"));
		assert_eq!(p.age_on(today), Some(10));
		p.death_date = Some(date("неизвестно"));
		assert_eq!(p.age_on(today), None);
	}

	#[test]
	fn test_age_uses_death_date() {
		let mut p: Person = serde_json::from_str(
			r#"{"id":1,"first_name":"A","last_name":"B","birth_date":"1900-06-10","death_date":"1950-06-09"}"#,
		)
		.unwrap();
		let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
		assert_eq!(p.age_on(today), Some(49));
		p.death_date = None;
		assert_eq!(p.age_on(today), Some(123));
		p.birth_date = None;
		assert_eq!(p.age_on(today), None);
	}

	#[test]
	fn test_classify_both_languages() {
		assert_eq!(RelationKind::classify("Супруг"), RelationKind::Spouse);
		assert_eq!(RelationKind::classify("Родитель"), RelationKind::Parent);
		assert_eq!(RelationKind::classify(" PARENT "), RelationKind::Parent);
		assert_eq!(RelationKind::classify("сестра"), RelationKind::Sibling);
		assert_eq!(RelationKind::classify("Ребёнок"), RelationKind::Child);
		assert_eq!(RelationKind::classify("Бабушка"), RelationKind::Other);
	}

	#[test]
	fn test_relationship_keeps_free_text_label() {
		let r: Relationship = serde_json::from_str(
			r#"{"id":7,"from_person_id":1,"to_person_id":2,"type":"Отец","description":""}"#,
		)
		.unwrap();
		assert_eq!(r.kind, RelationKind::Parent);
		assert_eq!(r.display_label(), "Отец");
		let back = serde_json::to_value(&r).unwrap();
		assert_eq!(back["type"], "Отец");
	}

	#[test]
	fn test_self_relationship_rejected() {
		let rel = NewRelationship::new(4, 4, RelationKind::Parent);
		assert!(matches!(rel.validate(), Err(ApiError::SelfRelationship(4))));
		assert!(NewRelationship::new(4, 5, RelationKind::Parent).validate().is_ok());
	}

	#[test]
	fn test_remove_person_cascades() {
		let rel = |id, from, to| Relationship {
			id,
			from,
			to,
			kind: RelationKind::Parent,
			label: String::new(),
			description: String::new(),
		};
		let mut data = SourceData {
			people: Vec::new(),
			relationships: vec![rel(1, 1, 2), rel(2, 2, 3), rel(3, 3, 4)],
		};
		data.remove_person(2);
		assert_eq!(data.relationships.len(), 1);
		assert_eq!(data.relationships[0].id, 3);
	}

	#[test]
	fn test_death_date_marks_deceased() {
		let mut p: Person = serde_json::from_str(
			r#"{"id":5,"first_name":"Олег","last_name":"Ким","death_date":"2010"}"#,
		)
		.unwrap();
		assert!(p.is_deceased());
		p.death_date = None;
		assert!(!p.is_deceased());
		assert!(RelationKind::Child.is_vertical());
		assert!(!RelationKind::Spouse.is_vertical());
	}

	#[test]
	fn test_person_fields_wire_shape() {
		let fields = PersonFields {
			first_name: "Иван".into(),
			last_name: "Петров".into(),
			birth_date: Some(RecordedDate::day(NaiveDate::from_ymd_opt(1980, 2, 3).unwrap())),
			death_date: Some(date("1999")),
			..Default::default()
		};
		let v = serde_json::to_value(&fields).unwrap();
		assert_eq!(v["birth_date"], "1980-02-03");
		assert_eq!(v["gender"], "male");
		assert_eq!(v["death_date"], "1999");
	}
}
