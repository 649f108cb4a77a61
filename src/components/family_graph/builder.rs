//! Source records to render model.

use chrono::NaiveDate;

use super::interaction::{InteractionState, emphasize};
use super::layout::layout_source;
use super::reconcile::apply_layout;
use super::types::{EdgeClass, GraphEdge, GraphNode, RenderModel};
use crate::config::GraphConfig;
use crate::model::{
	Person, PersonId, RecordedDate, RelationKind, Relationship, RelationshipId, SourceData,
};

/// Shown where a relationship names a person who is not loaded.
pub const UNKNOWN_PERSON: &str = "Неизвестный";

/// Inputs of a rebuild that are neither records nor interaction state.
#[derive(Clone, Debug)]
pub struct BuildContext {
	pub today: NaiveDate,
	pub config: GraphConfig,
}

/// `(sourceData, uiState) -> RenderModel`: nodes and edges with positions
/// reconciled and emphasis applied.
pub fn build_render_model(source: &SourceData, ui: &InteractionState, ctx: &BuildContext) -> RenderModel {
	let mut model = RenderModel {
		nodes: build_nodes(source, ctx.today),
		edges: build_edges(source),
	};
	let computed = layout_source(source, &ctx.config);
	apply_layout(&mut model.nodes, &computed);
	emphasize(&mut model, ui);
	model
}

/// Russian noun form for a count of years: 1 год, 2 года, 5 лет, 11 лет, 21 год.
pub fn years_word(n: u32) -> &'static str {
	if (11..=14).contains(&(n % 100)) {
		return "лет";
	}
	match n % 10 {
		1 => "год",
		2..=4 => "года",
		_ => "лет",
	}
}

pub fn format_age(n: u32) -> String {
	format!("{n} {}", years_word(n))
}

fn node_for(person: &Person, today: NaiveDate) -> GraphNode {
	GraphNode {
		id: person.id.to_string(),
		name: person.display_name(),
		search_text: person.search_haystack(),
		initials: person.initials(),
		gender: person.gender,
		photo_url: person.photo_url.clone(),
		birth_text: person.birth_date.as_ref().map(RecordedDate::display),
		death_text: person.death_date.as_ref().map(|d| format!("† {}", d.display())),
		age_text: person.age_on(today).map(format_age),
		placement: person.placement,
		matched: false,
		dimmed: false,
		selected: false,
	}
}

pub fn build_nodes(source: &SourceData, today: NaiveDate) -> Vec<GraphNode> {
	source.people.iter().map(|p| node_for(p, today)).collect()
}

fn name_of(source: &SourceData, id: PersonId) -> String {
	source
		.person(id)
		.map(Person::display_name)
		.unwrap_or_else(|| UNKNOWN_PERSON.to_string())
}

/// Label shown for the relation as read from the target's side.
fn recorded_label(rel: &Relationship) -> String {
	match rel.kind {
		RelationKind::Other => rel.display_label().to_string(),
		kind => kind.canonical_label().to_string(),
	}
}

fn edge_for(rel: &Relationship) -> GraphEdge {
	let class = EdgeClass::from(rel.kind);
	let label = recorded_label(rel);
	GraphEdge {
		id: format!("e{}", rel.id),
		relationship_id: rel.id,
		source: rel.from.to_string(),
		target: rel.to.to_string(),
		kind: rel.kind,
		recorded_label: label,
		label: None,
		opacity: 1.0,
		width: 1.5,
		z: 0,
		stroke: class.stroke(),
		arrow: class.has_arrow(),
	}
}

/// One edge per relationship; duplicates between the same pair are kept.
pub fn build_edges(source: &SourceData) -> Vec<GraphEdge> {
	source.relationships.iter().map(edge_for).collect()
}

/// How the far end of `edge` relates to `focus`, or `None` when `focus` is
/// not an endpoint. From the target's side the recorded relation applies;
/// from the source's side it is inverted.
pub fn perspective_label(edge: &GraphEdge, focus: &str) -> Option<String> {
	if edge.target == focus {
		Some(edge.recorded_label.clone())
	} else if edge.source == focus {
		Some(match edge.kind {
			RelationKind::Other => edge.recorded_label.clone(),
			kind => kind.inverse().canonical_label().to_string(),
		})
	} else {
		None
	}
}

/// Direction of a relationship relative to the person it is listed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	Outgoing,
	Incoming,
}

/// A relationship as listed on a person's side panel.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationEntry {
	pub relationship_id: RelationshipId,
	pub other_id: PersonId,
	pub other_name: String,
	/// What the other person is to this one.
	pub label: String,
	pub direction: Direction,
}

/// Every relationship touching `person`.
pub fn relations_of(person: PersonId, source: &SourceData) -> Vec<RelationEntry> {
	let focus = person.to_string();
	source
		.relationships
		.iter()
		.filter(|r| r.touches(person))
		.filter_map(|rel| {
			let edge = edge_for(rel);
			let label = perspective_label(&edge, &focus)?;
			let (other_id, direction) = if rel.from == person {
				(rel.to, Direction::Outgoing)
			} else {
				(rel.from, Direction::Incoming)
			};
			Some(RelationEntry {
				relationship_id: rel.id,
				other_id,
				other_name: name_of(source, other_id),
				label,
				direction,
			})
		})
		.collect()
}
