//! About Page

use leptos::prelude::*;

#[component]
pub fn AboutPage() -> impl IntoView {
    view! {
        <div class="about">
            <h1>"About plantdoc"</h1>
            <p>
                "plantdoc sends your photo to an image classifier trained on leaves of "
                "common crops such as tomato, potato, pepper, apple and grape. The model "
                "answers with the plant and either "
                <em>"healthy"</em>
                " or the disease it recognises."
            </p>
            <p>
                "Results are a first indication, not a replacement for an agronomist. "
                "Photos work best in daylight with one leaf filling most of the frame."
            </p>
            <a href="/diagnose" class="btn btn-primary">"Try it"</a>
        </div>
    }
}
