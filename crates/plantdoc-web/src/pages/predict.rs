//! Diagnose Page

use leptos::prelude::*;
use leptos::task::spawn_local;
use plantdoc_core::{Controller, Phase};

use crate::api;
use crate::components::{DropZone, ResultCard, Spinner};

#[component]
pub fn PredictPage() -> impl IntoView {
    let controller = RwSignal::new(Controller::new());
    let snapshot = Memo::new(move |_| controller.with(Controller::snapshot));
    let phase = move || snapshot.with(|s| s.phase);

    let analyze = move |_| {
        let Some(submission) = controller.try_update(Controller::begin_submission).flatten() else {
            return;
        };

        spawn_local(async move {
            let outcome = api::classify(&submission.image).await;
            if let Err(e) = &outcome {
                web_sys::console::error_1(&format!("Prediction {} failed: {e}", submission.id).into());
            }
            controller.try_update(|c| c.resolve(submission.id, outcome));
        });
    };

    view! {
        <div class="predict">
            <h1>"Diagnose a Plant"</h1>

            <DropZone controller=controller />

            {move || snapshot.with(|s| s.preview_url.clone()).map(|url| view! {
                <div class="preview">
                    <img src=url alt="Selected leaf" />
                    <p class="file-name">{snapshot.with(|s| s.file_name.clone())}</p>
                </div>
            })}

            <button
                class="btn btn-primary"
                on:click=analyze
                disabled=move || !snapshot.with(|s| s.can_submit)
            >
                {move || if phase() == Phase::Submitting { "Analyzing..." } else { "Analyze" }}
            </button>
            <button
                class="btn"
                on:click=move |_| controller.update(Controller::clear)
                disabled=move || phase() == Phase::Idle
            >
                "Clear"
            </button>

            {move || (phase() == Phase::Submitting)
                .then(|| view! { <Spinner message="Analyzing your plant..." /> })}

            {move || snapshot.with(|s| s.error.clone())
                .map(|error| view! { <p class="error">{error}</p> })}

            {move || snapshot.with(|s| s.result.clone())
                .map(|result| view! { <ResultCard result=result /> })}
        </div>
    }
}
