use crate::model::{Gender, Placement, Point, RelationKind, RelationshipId};

/// Layout and styling class of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeClass {
	/// Parent/child; the only class fed to the layout engine.
	Vertical,
	/// Partners.
	Spouse,
	/// Brothers and sisters.
	Sibling,
	/// Default directed edge.
	Other,
}

impl From<RelationKind> for EdgeClass {
	fn from(kind: RelationKind) -> Self {
		match kind {
			RelationKind::Parent | RelationKind::Child => EdgeClass::Vertical,
			RelationKind::Spouse => EdgeClass::Spouse,
			RelationKind::Sibling => EdgeClass::Sibling,
			RelationKind::Other => EdgeClass::Other,
		}
	}
}

impl EdgeClass {
	/// Line pattern.
	pub fn stroke(&self) -> StrokeStyle {
		match self {
			EdgeClass::Vertical | EdgeClass::Other => StrokeStyle::Solid,
			EdgeClass::Spouse => StrokeStyle::Dashed,
			EdgeClass::Sibling => StrokeStyle::Dotted,
		}
	}

	/// Same-generation relations are drawn without an arrowhead.
	pub fn has_arrow(&self) -> bool {
		matches!(self, EdgeClass::Vertical | EdgeClass::Other)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeStyle {
	Solid,
	Dashed,
	Dotted,
}

/// One person card.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	/// Lower-cased first + last + middle name.
	pub search_text: String,
	pub initials: String,
	pub gender: Gender,
	pub photo_url: Option<String>,
	pub birth_text: Option<String>,
	pub death_text: Option<String>,
	pub age_text: Option<String>,
	/// `Saved` or `Computed` once positions are reconciled.
	pub placement: Placement,
	pub matched: bool,
	pub dimmed: bool,
	pub selected: bool,
}

impl GraphNode {
	/// Top-left corner of the card.
	pub fn position(&self) -> Point {
		self.placement.point().unwrap_or_default()
	}

	pub fn opacity(&self) -> f64 {
		if self.dimmed { 0.3 } else { 1.0 }
	}
}

/// One relationship line.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	pub id: String,
	pub relationship_id: RelationshipId,
	pub source: String,
	pub target: String,
	pub kind: RelationKind,
	/// Label as recorded, read from the target's side.
	pub recorded_label: String,
	/// Perspective label; only set while the selected node is an endpoint.
	pub label: Option<String>,
	pub opacity: f64,
	pub width: f64,
	pub z: i32,
	pub stroke: StrokeStyle,
	pub arrow: bool,
}

/// Everything the canvas needs for one frame of data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderModel {
	pub nodes: Vec<GraphNode>,
	pub edges: Vec<GraphEdge>,
}

impl RenderModel {
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Min and max corners over all card origins.
	pub fn bounds(&self) -> Option<(Point, Point)> {
		let mut points = self.nodes.iter().map(GraphNode::position);
		let first = points.next()?;
		Some(points.fold((first, first), |(lo, hi), p| {
			(
				Point::new(lo.x.min(p.x), lo.y.min(p.y)),
				Point::new(hi.x.max(p.x), hi.y.max(p.y)),
			)
		}))
	}
}
