//! Family graph: render-model pipeline, layered layout and the canvas view.

mod builder;
mod component;
mod interaction;
mod layout;
mod reconcile;
mod render;
mod state;
mod types;

pub use builder::{BuildContext, Direction, build_render_model, format_age, relations_of};
pub use component::FamilyGraphCanvas;
pub use interaction::{InteractionEvent, InteractionState};
pub use reconcile::{LocalPlacements, apply_reload, drag_stop, persist, reset_layout};
