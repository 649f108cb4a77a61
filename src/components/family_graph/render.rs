use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::state::FamilyGraphState;
use super::types::{GraphEdge, GraphNode, StrokeStyle};
use crate::model::Gender;

const BACKGROUND: &str = "#f8f9fb";
const GRID: &str = "#e3e6ea";
const EDGE_COLOR: &str = "85, 85, 85";
const MATCH_BORDER: &str = "#f59f00";
const SELECTED_BORDER: &str = "#1c7ed6";
const AVATAR_RADIUS: f64 = 22.0;
const CORNER_RADIUS: f64 = 8.0;

/// Avatar photos keyed by URL, requested on first draw.
#[derive(Debug, Default)]
pub struct PhotoCache {
	images: RefCell<HashMap<String, HtmlImageElement>>,
}

impl PhotoCache {
	/// The photo for `url` once it has loaded; broken images never qualify.
	fn loaded(&self, url: &str) -> Option<HtmlImageElement> {
		let mut images = self.images.borrow_mut();
		if !images.contains_key(url) {
			let image = HtmlImageElement::new().ok()?;
			image.set_src(url);
			images.insert(url.to_string(), image);
		}
		images
			.get(url)
			.filter(|image| image.complete() && image.natural_width() > 0)
			.cloned()
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn gender_color(gender: Gender) -> &'static str {
	match gender {
		Gender::Male => "#4a90d9",
		Gender::Female => "#d9487f",
		Gender::Other => "#868e96",
	}
}

pub fn render(state: &FamilyGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_grid(state, ctx);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	draw_edge_labels(state, ctx);
	ctx.restore();
}

fn draw_grid(state: &FamilyGraphState, ctx: &CanvasRenderingContext2d) {
	let gap = 16.0;
	let (x0, y0) = state.screen_to_graph(0.0, 0.0);
	let (x1, y1) = state.screen_to_graph(state.width, state.height);
	if (x1 - x0) / gap > 400.0 {
		return;
	}
	ctx.set_fill_style_str(GRID);
	let r = 1.0 / state.transform.k;
	let mut x = (x0 / gap).floor() * gap;
	while x <= x1 {
		let mut y = (y0 / gap).floor() * gap;
		while y <= y1 {
			ctx.fill_rect(x - r / 2.0, y - r / 2.0, r, r);
			y += gap;
		}
		x += gap;
	}
}

fn center(state: &FamilyGraphState, node: &GraphNode) -> (f64, f64) {
	let p = node.position();
	(p.x + state.node_width / 2.0, p.y + state.node_height / 2.0)
}

/// Distance from a card's centre to its border along (ux, uy).
fn border_offset(state: &FamilyGraphState, ux: f64, uy: f64) -> f64 {
	let (hw, hh) = (state.node_width / 2.0, state.node_height / 2.0);
	let tx = if ux.abs() > 1e-9 { hw / ux.abs() } else { f64::INFINITY };
	let ty = if uy.abs() > 1e-9 { hh / uy.abs() } else { f64::INFINITY };
	tx.min(ty)
}

/// Opacity eased between "no selection" and the edge's target emphasis.
fn eased_opacity(state: &FamilyGraphState, edge: &GraphEdge) -> f64 {
	let t = ease_out_cubic(state.highlight_t);
	1.0 + (edge.opacity - 1.0) * t
}

fn endpoints<'a>(state: &'a FamilyGraphState, edge: &GraphEdge) -> Option<(&'a GraphNode, &'a GraphNode)> {
	Some((state.model.node(&edge.source)?, state.model.node(&edge.target)?))
}

fn draw_edges(state: &FamilyGraphState, ctx: &CanvasRenderingContext2d) {
	let arrow_size = 9.0;

	for edge in &state.model.edges {
		let Some((from, to)) = endpoints(state, edge) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = (center(state, from), center(state, to));
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let inset = border_offset(state, ux, uy);
		if 2.0 * inset >= dist {
			continue;
		}

		let alpha = eased_opacity(state, edge);
		ctx.set_stroke_style_str(&format!("rgba({EDGE_COLOR}, {alpha})"));
		ctx.set_line_width(edge.width);
		let dash = match edge.stroke {
			StrokeStyle::Solid => js_sys::Array::new(),
			StrokeStyle::Dashed => js_sys::Array::of2(&JsValue::from_f64(8.0), &JsValue::from_f64(5.0)),
			StrokeStyle::Dotted => js_sys::Array::of2(&JsValue::from_f64(2.0), &JsValue::from_f64(4.0)),
		};
		let _ = ctx.set_line_dash(&dash);

		let tail = if edge.arrow { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(x1 + ux * inset, y1 + uy * inset);
		ctx.line_to(x2 - ux * (inset + tail), y2 - uy * (inset + tail));
		ctx.stroke();

		if edge.arrow {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			ctx.set_fill_style_str(&format!("rgba({EDGE_COLOR}, {alpha})"));
			let (tip_x, tip_y) = (x2 - ux * inset, y2 - uy * inset);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_edge_labels(state: &FamilyGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("bold 11px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for edge in &state.model.edges {
		let Some(label) = &edge.label else {
			continue;
		};
		let Some((from, to)) = endpoints(state, edge) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = (center(state, from), center(state, to));
		let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
		// No TextMetrics here; approximate glyph width.
		let w = label.chars().count() as f64 * 6.5 + 10.0;
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
		ctx.fill_rect(mx - w / 2.0, my - 9.0, w, 18.0);
		ctx.set_fill_style_str("#212529");
		let _ = ctx.fill_text(label, mx, my);
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_nodes(state: &FamilyGraphState, ctx: &CanvasRenderingContext2d) {
	let (w, h) = (state.node_width, state.node_height);
	for (idx, node) in state.model.nodes.iter().enumerate() {
		let p = node.position();
		let hovered = state.hover == Some(idx);
		ctx.set_global_alpha(node.opacity());

		rounded_rect(ctx, p.x, p.y, w, h, CORNER_RADIUS);
		ctx.set_fill_style_str("white");
		ctx.fill();
		let (border, line_width) = if node.selected {
			(SELECTED_BORDER, 3.0)
		} else if node.matched {
			(MATCH_BORDER, 3.0)
		} else {
			(gender_color(node.gender), if hovered { 2.0 } else { 1.0 })
		};
		ctx.set_stroke_style_str(border);
		ctx.set_line_width(line_width);
		ctx.stroke();

		let (cx, cy) = (p.x + w / 2.0, p.y + 8.0 + AVATAR_RADIUS);
		let photo = node.photo_url.as_deref().and_then(|url| state.photos.loaded(url));
		ctx.begin_path();
		let _ = ctx.arc(cx, cy, AVATAR_RADIUS, 0.0, 2.0 * PI);
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		match photo {
			Some(image) => {
				ctx.save();
				ctx.clip();
				let size = 2.0 * AVATAR_RADIUS;
				let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
					&image,
					cx - AVATAR_RADIUS,
					cy - AVATAR_RADIUS,
					size,
					size,
				);
				ctx.restore();
				ctx.set_stroke_style_str(gender_color(node.gender));
				ctx.set_line_width(2.0);
				ctx.stroke();
			}
			None => {
				ctx.set_fill_style_str(gender_color(node.gender));
				ctx.fill();
				ctx.set_fill_style_str("white");
				ctx.set_font("bold 14px sans-serif");
				let _ = ctx.fill_text(&node.initials, cx, cy);
			}
		}

		ctx.set_fill_style_str("#212529");
		ctx.set_font("bold 12px sans-serif");
		let _ = ctx.fill_text_with_max_width(&node.name, cx, p.y + 66.0, w - 10.0);

		let dates = match (&node.birth_text, &node.death_text) {
			(Some(b), Some(d)) => format!("{b} {d}"),
			(Some(b), None) => b.clone(),
			(None, Some(d)) => d.clone(),
			(None, None) => String::new(),
		};
		ctx.set_fill_style_str("#868e96");
		ctx.set_font("10px sans-serif");
		if !dates.is_empty() {
			let _ = ctx.fill_text_with_max_width(&dates, cx, p.y + 80.0, w - 10.0);
		}
		if let Some(age) = &node.age_text {
			let _ = ctx.fill_text(age, cx, p.y + 92.0);
		}
	}
	ctx.set_global_alpha(1.0);
}
