use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{FamilyGraphState, PointerOutcome};
use super::types::RenderModel;
use crate::config::GraphConfig;
use crate::model::Point;

type SharedState = Rc<RefCell<Option<FamilyGraphState>>>;

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Canvas view of a family graph.
///
/// `on_select` receives `Some(id)` for a node click and `None` for a click on
/// empty canvas; `on_drag_stop` receives the final card origin of a dragged
/// node. The component never mutates source data itself.
#[component]
pub fn FamilyGraphCanvas(
	#[prop(into)] model: Signal<RenderModel>,
	#[prop(into)] on_select: Callback<Option<String>>,
	#[prop(into)] on_drag_stop: Callback<(String, Point)>,
	#[prop(optional)] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("Canvas 2d context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(FamilyGraphState::new(
			model.get_untracked(),
			&config,
			w,
			h,
		));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let last_frame = Rc::new(RefCell::new(None::<f64>));
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last_frame
				.borrow_mut()
				.replace(now)
				.map_or(0.016, |prev| ((now - prev) / 1000.0).clamp(0.0, 0.1));
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(dt);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Rebuilt models replace the drawn one; view transform survives.
	let state_model = state.clone();
	Effect::new(move |_| {
		let next = model.get();
		if let Some(ref mut s) = *state_model.borrow_mut() {
			s.set_model(next);
		}
	});

	let dispatch = move |outcome: Option<PointerOutcome>| match outcome {
		Some(PointerOutcome::NodeClicked(id)) => on_select.run(Some(id)),
		Some(PointerOutcome::CanvasClicked) => on_select.run(None),
		Some(PointerOutcome::DragStopped { id, at }) => on_drag_stop.run((id, at)),
		Some(PointerOutcome::Panned) | None => {}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.move_to(x, y);
		}
	};

	// Callbacks run after the borrow ends; they may rebuild the model.
	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let outcome = state_mu.borrow_mut().as_mut().and_then(FamilyGraphState::release);
		dispatch(outcome);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let outcome = state_ml.borrow_mut().as_mut().and_then(FamilyGraphState::leave);
		dispatch(outcome);
	};

	let state_dbl = state.clone();
	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_dbl.borrow_mut() {
			s.fit_view();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="family-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
