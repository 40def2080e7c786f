use leptos::prelude::*;
use log::warn;

use crate::components::graph_view::KnowledgeGraphCanvas;
use crate::graph::{GroupMode, Page, PageCorpus, RawBlock};

/// A small documentation project used until a real one is opened.
fn sample_corpus() -> PageCorpus {
	PageCorpus::new(vec![
		Page::new("guard", "Guard")
			.with_category("NPC")
			.with_tags(["AI", "Combat"])
			.with_body(
				"The [[Blueprint'/Game/NPC/BP_Guard.BP_Guard']] patrols the [[Courtyard]]. \
				 See [[Patrol Routes|patrol logic]].",
			)
			.documenting("Blueprint'/Game/NPC/BP_Guard.BP_Guard'"),
		Page::new("patrol", "Patrol Routes")
			.with_category("NPC")
			.with_tags(["AI"])
			.with_body("Waypoints live in [[Blueprint'/Game/NPC/BP_Waypoint.BP_Waypoint']].")
			.with_block(RawBlock::new(
				"link",
				serde_json::json!({"pageId": "guard"}),
			)),
		Page::new("courtyard", "Courtyard")
			.with_category("Levels")
			.with_tags(["Environment"])
			.with_body("[[World'/Game/Maps/Courtyard.Courtyard']] dressed with [[Rocks]].")
			.with_block(RawBlock::new(
				"asset",
				serde_json::json!({"reference": "StaticMesh'/Game/Env/SM_Fountain.SM_Fountain'"}),
			)),
		Page::new("rocks", "Rocks")
			.with_category("Art")
			.with_tags(["Environment"])
			.with_body(
				"[[StaticMesh'/Game/Env/SM_Rock.SM_Rock']] uses [[Texture2D'/Game/Env/T_Rock.T_Rock']] \
				 and [[Material'/Game/Env/M_Stone.M_Stone']].",
			),
		Page::new("style", "Art Style")
			.with_category("Art")
			.with_body("Applies to [[Rocks]] and the [[Courtyard]]."),
	])
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let corpus = Signal::derive(sample_corpus);
	let (mode, set_mode) = signal(GroupMode::Category);
	let (query, set_query) = signal(String::new());
	let (selected, set_selected) = signal(None::<String>);
	let (hits, set_hits) = signal(Vec::<(String, String)>::new());

	let on_mode = move |ev| match event_target_value(&ev).parse::<GroupMode>() {
		Ok(next) => set_mode.set(next),
		Err(err) => warn!("{err}"),
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
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
				<KnowledgeGraphCanvas
					project_id="sample"
					corpus=corpus
					mode=mode
					selected=selected
					query=query
					hits=set_hits
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Project Knowledge Graph"</h1>
					<p class="subtitle">
						"Click a node to focus it. Double-click to collapse its group. Drag nodes to reposition."
					</p>
					<label>
						"Group by "
						<select on:change=on_mode>
							{GroupMode::ALL
								.into_iter()
								.map(|m| {
									view! {
										<option value=m.as_str() selected=move || mode.get() == m>
											{m.as_str()}
										</option>
									}
								})
								.collect_view()}
						</select>
					</label>
					<input
						type="search"
						placeholder="Search pages and assets"
						prop:value=query
						on:input=move |ev| set_query.set(event_target_value(&ev))
					/>
					<ul class="search-hits">
						{move || {
							hits
								.get()
								.into_iter()
								.map(|(id, title)| {
									view! {
										<li on:click=move |_| set_selected.set(Some(id.clone()))>
											{title}
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</div>
			</div>
		</ErrorBoundary>
	}
}
