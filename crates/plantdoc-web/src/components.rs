//! UI Components

use leptos::prelude::*;
use leptos::task::spawn_local;
use plantdoc_core::{ClassificationResult, Controller, ImageFile, PreviewHandle};
use web_sys::File;

use crate::preview::{read_image, ObjectUrl, Picks};

/// Hand a picked or dropped file to the controller
///
/// Reads finish in any order; a read overtaken by a newer pick is dropped.
fn select(controller: RwSignal<Controller>, picks: StoredValue<Picks>, file: File) {
    let Some(ticket) = picks.try_update_value(Picks::next) else {
        return;
    };

    spawn_local(async move {
        let image = match read_image(&file).await {
            Ok(image) => image,
            Err(e) => {
                web_sys::console::error_1(&e.into());
                return;
            }
        };

        if !picks.try_with_value(|p| p.is_latest(ticket)).unwrap_or(false) {
            web_sys::console::warn_1(&format!("Ignoring superseded pick {}", file.name()).into());
            return;
        }

        controller.try_update(move |c| {
            let selected = c.select_file(image, move |_: &ImageFile| -> Box<dyn PreviewHandle> {
                Box::new(ObjectUrl::for_file(&file))
            });
            if let Err(e) = selected {
                web_sys::console::warn_1(&e.to_string().into());
            }
        });
    });
}

/// File picker with drag-and-drop
#[component]
pub fn DropZone(controller: RwSignal<Controller>) -> impl IntoView {
    let (is_over, set_is_over) = signal(false);
    let picks = StoredValue::new(Picks::default());
    let file_input_id = "leaf-file-input";

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        set_is_over.set(false);

        if let Some(file) = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0))
        {
            select(controller, picks, file);
        }
    };

    let on_change = move |ev: web_sys::Event| {
        let input: web_sys::HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            select(controller, picks, file);
        }
        // Picking the same file again should still fire `change`
        input.set_value("");
    };

    view! {
        <div
            class="drop-zone"
            class:drop-zone-active=move || is_over.get()
            on:dragover=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                set_is_over.set(true);
            }
            on:dragleave=move |_| set_is_over.set(false)
            on:drop=on_drop
        >
            <p>"Drop a photo of a leaf here"</p>
            <p class="hint">"or"</p>
            <label for=file_input_id class="btn">"Browse Files"</label>
            <input
                type="file"
                id=file_input_id
                accept="image/*"
                style="display: none"
                on:change=on_change
            />
            <p class="hint">"JPEG, PNG or WebP"</p>
        </div>
    }
}

/// Loading indicator
#[component]
pub fn Spinner(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="loading">
            <div class="spinner"></div>
            <p>{message}</p>
        </div>
    }
}

/// Diagnosis for one classification
#[component]
pub fn ResultCard(result: ClassificationResult) -> impl IntoView {
    let health = result.health();
    let parts = result.parts();
    let label = result.display_label();
    let confidence = result.confidence_text();
    let image_url = result.image_url;
    let class = format!("result-card {}", health.css_class());

    view! {
        <div class=class>
            <p class="status">{health.headline()}</p>
            <h2 class="label">{label}</h2>
            <dl>
                <dt>"Plant"</dt>
                <dd>{parts.plant}</dd>
                {parts.condition.map(|condition| view! {
                    <dt>"Condition"</dt>
                    <dd>{condition}</dd>
                })}
            </dl>
            {confidence.map(|confidence| view! {
                <p class="confidence">"Confidence: " {confidence}</p>
            })}
            {image_url.map(|url| view! {
                <p class="stored"><a href=url target="_blank">"Stored image"</a></p>
            })}
        </div>
    }
}
