use leptos::prelude::*;
use leptos_router::components::A;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Page not found"</h1>
			<p>
				<A href="/">"Back to the route graph"</A>
				" or "
				<A href="/sample">"open the test data"</A>
			</p>
		</div>
	}
}
