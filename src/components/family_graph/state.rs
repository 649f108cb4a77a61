use super::render::PhotoCache;
use super::types::RenderModel;
use crate::config::GraphConfig;
use crate::model::{Placement, Point};

/// Screen pixels a press may travel and still count as a click.
pub const CLICK_SLOP: f64 = 4.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 4.0;
const FIT_PADDING: f64 = 40.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// What a pointer release amounted to.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerOutcome {
	NodeClicked(String),
	CanvasClicked,
	DragStopped { id: String, at: Point },
	Panned,
}

pub struct FamilyGraphState {
	pub model: RenderModel,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
	pub node_width: f64,
	pub node_height: f64,
	/// Eases toward 1 while a node is selected, toward 0 otherwise.
	pub highlight_t: f64,
	/// Avatar photos; kept across model swaps.
	pub photos: PhotoCache,
}

impl FamilyGraphState {
	pub fn new(model: RenderModel, config: &GraphConfig, width: f64, height: f64) -> Self {
		let mut state = Self {
			model,
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
			node_width: config.node_width,
			node_height: config.node_height,
			highlight_t: 0.0,
			photos: PhotoCache::default(),
		};
		state.fit_view();
		state
	}

	/// Swaps in a rebuilt model. The view is kept; a drag in progress is
	/// dropped because its node index may no longer be valid.
	pub fn set_model(&mut self, model: RenderModel) {
		let first_data = self.model.nodes.is_empty() && !model.nodes.is_empty();
		self.model = model;
		self.drag = DragState::default();
		self.hover = None;
		if first_data {
			self.fit_view();
		}
	}

	pub fn has_selection(&self) -> bool {
		self.model.nodes.iter().any(|n| n.selected)
	}

	/// Frames every card inside the canvas, never zooming in past 1.
	pub fn fit_view(&mut self) {
		let Some((lo, hi)) = self.model.bounds() else {
			self.transform = ViewTransform { x: 0.0, y: 0.0, k: 1.0 };
			return;
		};
		let (w, h) = (hi.x - lo.x + self.node_width, hi.y - lo.y + self.node_height);
		let k = ((self.width - 2.0 * FIT_PADDING) / w)
			.min((self.height - 2.0 * FIT_PADDING) / h)
			.clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: (self.width - w * k) / 2.0 - lo.x * k,
			y: (self.height - h * k) / 2.0 - lo.y * k,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost card under the pointer; later cards are drawn on top.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.model.nodes.iter().rposition(|node| {
			let p = node.position();
			gx >= p.x && gx <= p.x + self.node_width && gy >= p.y && gy <= p.y + self.node_height
		})
	}

	pub fn press(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				moved: false,
				start_x: sx,
				start_y: sy,
				node_start: self.model.nodes[idx].position(),
			};
		} else {
			self.pan = PanState {
				active: true,
				moved: false,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn move_to(&mut self, sx: f64, sy: f64) {
		if !self.drag.active {
			self.hover = self.node_at_position(sx, sy);
		}

		if self.drag.active {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if dx.hypot(dy) >= CLICK_SLOP {
				self.drag.moved = true;
			}
			if !self.drag.moved {
				return;
			}
			if let Some(node) = self.drag.node_idx.and_then(|idx| self.model.nodes.get_mut(idx)) {
				let k = self.transform.k;
				node.placement = Placement::Saved(Point::new(
					self.drag.node_start.x + dx / k,
					self.drag.node_start.y + dy / k,
				));
			}
		} else if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			if dx.hypot(dy) >= CLICK_SLOP {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		}
	}

	pub fn release(&mut self) -> Option<PointerOutcome> {
		let drag = std::mem::take(&mut self.drag);
		let pan = std::mem::take(&mut self.pan);
		if drag.active {
			let node = self.model.nodes.get(drag.node_idx?)?;
			return Some(if drag.moved {
				PointerOutcome::DragStopped {
					id: node.id.clone(),
					at: node.position(),
				}
			} else {
				PointerOutcome::NodeClicked(node.id.clone())
			});
		}
		if pan.active {
			return Some(if pan.moved {
				PointerOutcome::Panned
			} else {
				PointerOutcome::CanvasClicked
			});
		}
		None
	}

	/// Pointer left the canvas: a drag in flight still ends as a drag-stop.
	pub fn leave(&mut self) -> Option<PointerOutcome> {
		self.hover = None;
		match self.release() {
			Some(outcome @ PointerOutcome::DragStopped { .. }) => Some(outcome),
			_ => None,
		}
	}

	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f64) {
		let target = if self.has_selection() { 1.0 } else { 0.0 };
		self.highlight_t += (target - self.highlight_t) * (6.0 * dt).min(1.0);
		if (target - self.highlight_t).abs() < 0.01 {
			self.highlight_t = target;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::family_graph::builder::build_render_model;
	use crate::components::family_graph::builder::tests::{ctx, person, relation};
	use crate::components::family_graph::interaction::InteractionState;
	use crate::model::SourceData;

	fn state() -> FamilyGraphState {
		let mut b = person(2, "B", "B");
		b.placement = Placement::Saved(Point::new(500.0, 40.0));
		let source = SourceData {
			people: vec![person(1, "A", "A"), b],
			relationships: vec![relation(1, 1, 2, "Супруг")],
		};
		let ctx = ctx();
		let model = build_render_model(&source, &InteractionState::default(), &ctx);
		let mut s = FamilyGraphState::new(model, &ctx.config, 800.0, 600.0);
		s.transform = ViewTransform { x: 0.0, y: 0.0, k: 1.0 };
		s
	}

	#[test]
	fn test_hit_test_uses_card_rect() {
		let s = state();
		assert_eq!(s.node_at_position(45.0, 45.0), Some(0));
		assert_eq!(s.node_at_position(505.0, 135.0), Some(1));
		assert_eq!(s.node_at_position(300.0, 300.0), None);
	}

	#[test]
	fn test_short_press_is_click() {
		let mut s = state();
		s.press(50.0, 50.0);
		s.move_to(52.0, 51.0);
		assert_eq!(s.release(), Some(PointerOutcome::NodeClicked("1".into())));
		assert_eq!(s.model.nodes[0].position(), Point::new(40.0, 40.0));

		s.press(300.0, 300.0);
		assert_eq!(s.release(), Some(PointerOutcome::CanvasClicked));
	}

	#[test]
	fn test_drag_reports_final_position() {
		let mut s = state();
		s.transform.k = 2.0;
		// Card 1 spans 80..420 on screen at this zoom.
		s.press(100.0, 100.0);
		s.move_to(140.0, 120.0);
		assert_eq!(
			s.release(),
			Some(PointerOutcome::DragStopped {
				id: "1".into(),
				at: Point::new(60.0, 50.0),
			})
		);
		assert!(!s.drag.active);
	}

	#[test]
	fn test_pan_moves_transform() {
		let mut s = state();
		s.press(300.0, 300.0);
		s.move_to(320.0, 310.0);
		assert_eq!(s.transform.x, 20.0);
		assert_eq!(s.release(), Some(PointerOutcome::Panned));
	}

	#[test]
	fn test_zoom_clamped_around_cursor() {
		let mut s = state();
		for _ in 0..100 {
			s.zoom(100.0, 100.0, -1.0);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
		let (gx, gy) = s.screen_to_graph(100.0, 100.0);
		assert!((gx - 100.0).abs() < 1e-6 && (gy - 100.0).abs() < 1e-6);
	}

	#[test]
	fn test_fit_view_frames_all_cards() {
		let mut s = state();
		s.fit_view();
		for node in &s.model.nodes {
			let p = node.position();
			let sx = p.x * s.transform.k + s.transform.x;
			let sy = p.y * s.transform.k + s.transform.y;
			assert!(sx >= 0.0 && sx + s.node_width * s.transform.k <= s.width);
			assert!(sy >= 0.0 && sy + s.node_height * s.transform.k <= s.height);
		}
	}
}
