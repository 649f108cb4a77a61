//! Saved positions versus computed ones, and their persistence.

use super::interaction::{InteractionEvent, InteractionState};
use super::layout::{Positions, layout_source};
use super::types::GraphNode;
use crate::api::DataService;
use crate::config::GraphConfig;
use crate::error::ApiError;
use crate::model::{PersonId, Placement, Point, SourceData};
use crate::reload::{ReloadSequencer, ReloadToken};

/// A position to write back to the data service.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionUpdate {
	pub id: PersonId,
	pub at: Point,
}

/// A saved position wins; anything else takes the computed one.
pub fn resolve(stored: Placement, computed: Option<Point>) -> Placement {
	match stored {
		Placement::Saved(p) => Placement::Saved(p),
		Placement::Unset | Placement::Computed(_) => Placement::Computed(computed.unwrap_or_default()),
	}
}

/// Overlays `computed` on nodes that have no saved position.
pub fn apply_layout(nodes: &mut [GraphNode], computed: &Positions) {
	for node in nodes {
		node.placement = resolve(node.placement, computed.get(&node.id).copied());
	}
}

/// Records a finished drag in the cache and returns the write to issue.
pub fn drag_stop(source: &mut SourceData, id: PersonId, at: Point) -> Option<PositionUpdate> {
	source
		.save_placement(id, at)
		.then_some(PositionUpdate { id, at })
}

/// Recomputes ideal positions for everyone, saves them in the cache and
/// returns one write per person. The only bulk overwrite of saved positions.
pub fn reset_layout(source: &mut SourceData, config: &GraphConfig) -> Vec<PositionUpdate> {
	let computed = layout_source(source, config);
	let mut updates = Vec::with_capacity(source.people.len());
	for person in &mut source.people {
		if let Some(&at) = computed.get(&person.id.to_string()) {
			person.placement = Placement::Saved(at);
			updates.push(PositionUpdate { id: person.id, at });
		}
	}
	log::info!("Layout reset: {} positions to persist", updates.len());
	updates
}

/// Issues every write in order. Failures do not stop the burst; they are
/// logged and returned.
pub async fn persist<S: DataService>(service: &S, updates: &[PositionUpdate]) -> Vec<(PersonId, ApiError)> {
	let mut failures = Vec::new();
	for update in updates {
		if let Err(err) = service.save_position(update.id, update.at).await {
			log::error!("Failed to save position of {}: {err}", update.id);
			failures.push((update.id, err));
		}
	}
	failures
}

/// Position writes made locally, each tagged with the newest reload issued
/// when it was made.
#[derive(Clone, Debug, Default)]
pub struct LocalPlacements {
	writes: Vec<(ReloadToken, PositionUpdate)>,
}

impl LocalPlacements {
	pub fn record(&mut self, issued: ReloadToken, updates: &[PositionUpdate]) {
		self.writes.extend(updates.iter().map(|&update| (issued, update)));
	}

	/// Re-applies the writes a reload issued at `token` may predate and
	/// forgets the ones it already reflects.
	fn reapply(&mut self, token: ReloadToken, data: &mut SourceData) {
		self.writes.retain(|(issued, _)| *issued >= token);
		for (_, update) in &self.writes {
			data.save_placement(update.id, update.at);
		}
	}
}

/// Accepts the result of the reload issued as `token`, or `None` when a
/// newer reload has been issued since. Accepted data keeps local position
/// writes it may predate, and selection resets.
pub fn apply_reload(
	sequencer: &ReloadSequencer,
	token: ReloadToken,
	mut incoming: SourceData,
	local: &mut LocalPlacements,
	ui: &mut InteractionState,
) -> Option<SourceData> {
	if !sequencer.is_current(token) {
		log::debug!("Discarding stale reload {token:?}");
		return None;
	}
	local.reapply(token, &mut incoming);
	log::info!(
		"Loaded {} people and {} relationships",
		incoming.people.len(),
		incoming.relationships.len()
	);
	ui.apply(InteractionEvent::DataReloaded);
	Some(incoming)
}
