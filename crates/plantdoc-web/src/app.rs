//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::{AboutPage, HomePage, PredictPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main class="app">
                <nav class="top">
                    <A href="/">"plantdoc"</A>
                    <A href="/diagnose">"Diagnose"</A>
                    <A href="/about">"About"</A>
                </nav>
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/diagnose") view=PredictPage />
                    <Route path=path!("/about") view=AboutPage />
                </Routes>
            </main>
        </Router>
    }
}
