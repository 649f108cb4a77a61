//! Selection and search state, and the emphasis they imply.
//!
//! Selection (`none` / `node(id)`) and search (`empty` / `query`) are
//! orthogonal. Selection drives edge emphasis and perspective labels; search
//! drives node dimming and highlighting. Neither touches backing data.

use super::builder::perspective_label;
use super::types::RenderModel;

const FADED_EDGE_OPACITY: f64 = 0.1;

/// Inputs to the state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	/// A click on a node; toggles its selection.
	NodeClicked(String),
	/// A click on empty canvas.
	CanvasClicked,
	/// The search field changed.
	SearchChanged(String),
	/// Source data was replaced by a reload.
	DataReloaded,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	selected: Option<String>,
	query: String,
}

impl InteractionState {
	pub fn apply(&mut self, event: InteractionEvent) {
		match event {
			InteractionEvent::NodeClicked(id) => {
				self.selected = if self.selected.as_deref() == Some(id.as_str()) {
					None
				} else {
					Some(id)
				};
			}
			InteractionEvent::CanvasClicked | InteractionEvent::DataReloaded => {
				self.selected = None;
			}
			InteractionEvent::SearchChanged(query) => self.query = query,
		}
	}

	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	/// Lower-cased query, or `None` when blank.
	pub fn search_term(&self) -> Option<String> {
		let term = self.query.trim().to_lowercase();
		(!term.is_empty()).then_some(term)
	}
}

/// Applies search and selection emphasis to a freshly built model.
pub fn emphasize(model: &mut RenderModel, state: &InteractionState) {
	let term = state.search_term();
	let selected = state.selected();

	for node in &mut model.nodes {
		node.selected = selected == Some(node.id.as_str());
		match &term {
			Some(term) => {
				node.matched = node.search_text.contains(term.as_str());
				node.dimmed = !node.matched;
			}
			None => {
				node.matched = false;
				node.dimmed = false;
			}
		}
	}

	for edge in &mut model.edges {
		match selected {
			None => {
				edge.label = None;
				edge.opacity = 1.0;
				edge.width = 1.5;
				edge.z = 0;
			}
			Some(focus) => match perspective_label(edge, focus) {
				Some(label) => {
					edge.label = Some(label);
					edge.opacity = 1.0;
					edge.width = 3.0;
					edge.z = 10;
				}
				None => {
					edge.label = None;
					edge.opacity = FADED_EDGE_OPACITY;
					edge.width = 1.0;
					edge.z = 0;
				}
			},
		}
	}
	model.edges.sort_by_key(|e| e.z);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::family_graph::builder::tests::{ctx, person, relation};
	use crate::components::family_graph::builder::build_render_model;
	use crate::model::SourceData;

	fn family() -> SourceData {
		let mut ivanova = person(3, "Мария", "Иванова");
		ivanova.middle_name = Some("Ивановна".into());
		SourceData {
			people: vec![person(1, "Иван", "Петров"), person(2, "Пётр", "Сидоров"), ivanova],
			relationships: vec![relation(1, 1, 2, "Родитель"), relation(2, 2, 3, "Супруг")],
		}
	}

	#[test]
	fn test_click_toggles_selection() {
		let mut s = InteractionState::default();
		s.apply(InteractionEvent::NodeClicked("1".into()));
		assert_eq!(s.selected(), Some("1"));
		s.apply(InteractionEvent::NodeClicked("2".into()));
		assert_eq!(s.selected(), Some("2"));
		s.apply(InteractionEvent::NodeClicked("2".into()));
		assert_eq!(s.selected(), None);
	}

	#[test]
	fn test_canvas_click_and_reload_clear_selection_only() {
		let mut s = InteractionState::default();
		s.apply(InteractionEvent::SearchChanged("Ив".into()));
		s.apply(InteractionEvent::NodeClicked("1".into()));
		s.apply(InteractionEvent::CanvasClicked);
		assert_eq!(s.selected(), None);
		s.apply(InteractionEvent::NodeClicked("1".into()));
		s.apply(InteractionEvent::DataReloaded);
		assert_eq!(s.selected(), None);
		assert_eq!(s.query(), "Ив");
	}

	#[test]
	fn test_search_dims_non_matching() {
		let mut s = InteractionState::default();
		s.apply(InteractionEvent::SearchChanged("Иван".into()));
		let model = build_render_model(&family(), &s, &ctx());
		// Matches Иван Петров and Мария Иванова, not Пётр Сидоров.
		assert_eq!(model.node("1").unwrap().opacity(), 1.0);
		assert!(model.node("1").unwrap().matched);
		assert!(model.node("2").unwrap().dimmed);
		assert!(model.node("2").unwrap().opacity() < 1.0);
		assert_eq!(model.node("3").unwrap().opacity(), 1.0);
	}

	#[test]
	fn test_blank_query_dims_nothing() {
		let mut s = InteractionState::default();
		s.apply(InteractionEvent::SearchChanged("   ".into()));
		let model = build_render_model(&family(), &s, &ctx());
		assert!(model.nodes.iter().all(|n| !n.dimmed && !n.matched));
	}

	#[test]
	fn test_selection_fades_untouched_edges() {
		let mut s = InteractionState::default();
		s.apply(InteractionEvent::NodeClicked("1".into()));
		let model = build_render_model(&family(), &s, &ctx());
		let touching = model.edges.iter().find(|e| e.relationship_id == 1).unwrap();
		let other = model.edges.iter().find(|e| e.relationship_id == 2).unwrap();
		assert_eq!(touching.label.as_deref(), Some("Ребенок"));
		assert_eq!(touching.opacity, 1.0);
		assert!(touching.z > other.z);
		assert_eq!(other.label, None);
		assert_eq!(other.opacity, FADED_EDGE_OPACITY);
		// Touching edges are drawn last.
		assert_eq!(model.edges.last().unwrap().relationship_id, 1);
	}

	#[test]
	fn test_no_selection_means_no_labels() {
		let model = build_render_model(&family(), &InteractionState::default(), &ctx());
		assert!(model.edges.iter().all(|e| e.label.is_none() && e.opacity == 1.0));
	}
}
