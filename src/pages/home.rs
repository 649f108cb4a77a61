use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{DataService, HttpDataService, load_source};
use crate::components::family_graph::{
	BuildContext, Direction, FamilyGraphCanvas, InteractionEvent, InteractionState,
	LocalPlacements, apply_reload, build_render_model, drag_stop, format_age, persist,
	relations_of, reset_layout,
};
use crate::config::AppConfig;
use crate::model::{PersonId, Point, RecordedDate, RelationshipId, SourceData};
use crate::reload::ReloadSequencer;

const CONFIG_ELEMENT_ID: &str = "app-config";

/// Reads `<script id="app-config" type="application/json">` when the host
/// page provides one.
fn load_config() -> AppConfig {
	let raw = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
		.and_then(|el| el.text_content());
	let Some(raw) = raw else {
		return AppConfig::default();
	};
	AppConfig::from_json(&raw).unwrap_or_else(|err| {
		log::warn!("Ignoring malformed app config: {err}");
		AppConfig::default()
	})
}

/// Family graph page: toolbar, canvas and the selected person's panel.
#[component]
pub fn Home() -> impl IntoView {
	let config = load_config();
	let service = HttpDataService::new(config.api.clone());
	let graph_config = config.graph;

	let source = RwSignal::new(SourceData::default());
	let ui = RwSignal::new(InteractionState::default());
	let notice = RwSignal::new(None::<String>);
	let refresh = RwSignal::new(0u32);
	let sequencer = ReloadSequencer::new();
	let local = StoredValue::new(LocalPlacements::default());
	let today = chrono::Local::now().date_naive();

	let ctx = BuildContext {
		today,
		config: graph_config.clone(),
	};
	let model = Memo::new(move |_| {
		source.with(|data| ui.with(|state| build_render_model(data, state, &ctx)))
	});

	// People and relationships land together; an older reload never
	// overwrites a newer one or a position written after it was issued.
	let reload_service = service.clone();
	let reload_sequencer = sequencer.clone();
	Effect::new(move |_| {
		refresh.track();
		let token = reload_sequencer.begin();
		let (service, sequencer) = (reload_service.clone(), reload_sequencer.clone());
		log::info!("Reloading family data");
		spawn_local(async move {
			let data = load_source(&service).await;
			let mut state = ui.get_untracked();
			let applied = local
				.try_update_value(|local| apply_reload(&sequencer, token, data, local, &mut state))
				.flatten();
			if let Some(data) = applied {
				source.set(data);
				ui.set(state);
			}
		});
	});

	let on_select = Callback::new(move |id: Option<String>| {
		let event = match id {
			Some(id) => InteractionEvent::NodeClicked(id),
			None => InteractionEvent::CanvasClicked,
		};
		ui.update(|state| state.apply(event));
	});

	let drag_service = service.clone();
	let drag_sequencer = sequencer.clone();
	let on_drag_stop = Callback::new(move |(id, at): (String, Point)| {
		let Ok(id) = id.parse::<PersonId>() else {
			log::warn!("Dragged node has a non-numeric id: {id}");
			return;
		};
		let Some(update) = source.try_update(|data| drag_stop(data, id, at)).flatten() else {
			return;
		};
		local.update_value(|local| local.record(drag_sequencer.latest(), &[update]));
		let service = drag_service.clone();
		spawn_local(async move {
			if let Err(err) = service.save_position(update.id, update.at).await {
				log::error!("Failed to save position of {}: {err}", update.id);
				notice.set(Some(format!("Не удалось сохранить позицию: {err}")));
			}
		});
	});

	let reset_service = service.clone();
	let reset_config = graph_config.clone();
	let on_reset = move |_| {
		let updates = source
			.try_update(|data| reset_layout(data, &reset_config))
			.unwrap_or_default();
		local.update_value(|local| local.record(sequencer.latest(), &updates));
		let service = reset_service.clone();
		spawn_local(async move {
			let failures = persist(&service, &updates).await;
			if !failures.is_empty() {
				notice.set(Some(format!(
					"Не удалось сохранить позиции: {} из {}",
					failures.len(),
					updates.len()
				)));
			}
		});
	};

	let on_search = move |ev: leptos::ev::Event| {
		let query = event_target_value(&ev);
		ui.update(|state| state.apply(InteractionEvent::SearchChanged(query)));
	};

	let person_service = service.clone();
	let delete_person = move |id: PersonId| {
		let service = person_service.clone();
		spawn_local(async move {
			match service.delete_person(id).await {
				Ok(()) => {
					source.update(|data| data.remove_person(id));
					ui.update(|state| state.apply(InteractionEvent::CanvasClicked));
				}
				Err(err) => {
					log::error!("Failed to delete person {id}: {err}");
					notice.set(Some(format!("Не удалось удалить человека: {err}")));
				}
			}
		});
	};

	let delete_service = service;
	let delete_relationship = move |id: RelationshipId| {
		let service = delete_service.clone();
		spawn_local(async move {
			match service.delete_relationship(id).await {
				Ok(()) => source.update(|data| data.remove_relationship(id)),
				Err(err) => {
					log::error!("Failed to delete relationship {id}: {err}");
					notice.set(Some(format!("Не удалось удалить связь: {err}")));
				}
			}
		});
	};

	let selected_person = Signal::derive(move || {
		let id = ui.with(|state| state.selected().and_then(|id| id.parse::<PersonId>().ok()))?;
		source.with(|data| data.person(id).cloned())
	});

	let person_panel = move || {
		let person = selected_person.get()?;
		let relations = source.with(|data| relations_of(person.id, data));
		let age = person.age_on(today).map(format_age);
		let lifespan = person.is_deceased().then(|| {
			let shown = |date: &Option<RecordedDate>| {
				date.as_ref().map_or_else(|| "?".to_string(), RecordedDate::display)
			};
			format!("{} – {}", shown(&person.birth_date), shown(&person.death_date))
		});
		let delete_relationship = delete_relationship.clone();
		let delete_person = delete_person.clone();
		let person_id = person.id;
		Some(view! {
			<aside class="person-panel">
				{person
					.photo_url
					.clone()
					.map(|src| view! { <img class="person-photo" src=src alt="" /> })}
				<h2>{person.full_name()}</h2>
				{lifespan.map(|text| view! { <p class="person-lifespan">{text}</p> })}
				{age.map(|age| view! { <p class="person-age">{age}</p> })}
				<ul class="person-relations">
					{relations
						.into_iter()
						.map(|entry| {
							let arrow = match entry.direction {
								Direction::Outgoing => "→",
								Direction::Incoming => "←",
							};
							let delete_relationship = delete_relationship.clone();
							let id = entry.relationship_id;
							let other = entry.other_id.to_string();
							view! {
								<li>
									{format!("{arrow} {}: ", entry.label)}
									<a on:click=move |_| on_select.run(Some(other.clone()))>
										{entry.other_name}
									</a>
									<button on:click=move |_| delete_relationship(id)>"×"</button>
								</li>
							}
						})
						.collect_view()}
				</ul>
				<button on:click=move |_| delete_person(person_id)>"Удалить"</button>
				<button on:click=move |_| on_select.run(None)>"Закрыть"</button>
			</aside>
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Что-то пошло не так"</h1>

				<p>"Ошибки: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<FamilyGraphCanvas
					model=model
					on_select=on_select
					on_drag_stop=on_drag_stop
					config=graph_config
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Семейное древо"</h1>
					<div class="toolbar">
						<input
							type="search"
							placeholder="Поиск по имени"
							prop:value=move || ui.with(|state| state.query().to_string())
							on:input=on_search
						/>
						<button on:click=move |_| refresh.update(|n| *n += 1)>"Обновить"</button>
						<button on:click=on_reset>"Расставить заново"</button>
					</div>
					{move || {
						notice
							.get()
							.map(|text| {
								view! {
									<p class="notice" on:click=move |_| notice.set(None)>
										{text}
									</p>
								}
							})
					}}
					<p class="subtitle">
						"Перетаскивайте карточки, колесо мыши меняет масштаб, двойной щелчок показывает всё древо."
					</p>
				</div>
				{person_panel}
			</div>
		</ErrorBoundary>
	}
}
