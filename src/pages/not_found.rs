use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Страница не найдена"</h1>
			<a href="/">"К семейному древу"</a>
		</div>
	}
}
