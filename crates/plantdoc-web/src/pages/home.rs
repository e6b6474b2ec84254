//! Home Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"plantdoc"</h1>
                <p class="tagline">"Photograph a leaf, get a diagnosis"</p>
                <div class="cta">
                    <a href="/diagnose" class="btn btn-primary">"Diagnose a Plant"</a>
                    <a href="/about" class="btn">"How it Works"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"📷 Upload"</h3>
                    <p>"Pick or drop a clear photo of a single leaf."</p>
                </div>
                <div class="feature">
                    <h3>"🔬 Classify"</h3>
                    <p>"A trained model recognises the plant and its condition."</p>
                </div>
                <div class="feature">
                    <h3>"🌱 Act"</h3>
                    <p>"See at a glance whether the plant is healthy or diseased."</p>
                </div>
            </section>
        </div>
    }
}
