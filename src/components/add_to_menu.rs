use crate::actions::PlaylistPicker;
use crate::api::{ActionsClient, PlaylistSummary, ServerActions};
use dioxus::prelude::*;
use tracing::debug;

/// Opens the playlist dialog with this song staged.
#[component]
pub fn AddToPlaylistButton(song_id: String) -> Element {
    let mut picker = use_context::<Signal<PlaylistPicker>>();
    let staged = song_id.clone();

    rsx! {
        button {
            class: "add-to-playlist",
            r#type: "button",
            "data-song-id": "{song_id}",
            aria_label: "Add to playlist",
            onclick: move |_| {
                if let Err(err) = picker.write().open_for(staged.clone()) {
                    debug!(%err, "add to playlist click ignored");
                }
            },
            i { class: "fas fa-plus" }
        }
    }
}

#[component]
pub fn PlaylistModal() -> Element {
    let mut picker = use_context::<Signal<PlaylistPicker>>();
    let playlists = use_context::<Signal<Vec<PlaylistSummary>>>();
    let client = use_context::<ActionsClient>();
    let state = picker();
    let staged = state.staged_song().unwrap_or_default().to_string();
    let selected = state.selected_playlist().unwrap_or_default().to_string();
    let open = state.is_open();
    let busy = state.in_flight();
    let error = state.last_error().map(str::to_string);

    let on_confirm = move |_| {
        let request = match picker.write().begin_confirm() {
            Ok(request) => request,
            Err(err) => {
                debug!(%err, "playlist confirm not sent");
                return;
            }
        };
        let client = client.clone();
        spawn(async move {
            let result = client.add_to_playlist(&request).await;
            let _ = picker.write().finish(result);
        });
    };

    rsx! {
        div {
            id: "playlistModal",
            class: if open { "modal show" } else { "modal" },
            role: "dialog",
            "aria-hidden": if open { "false" } else { "true" },
            hidden: !open,
            div { class: "modal-dialog",
                div { class: "modal-header",
                    h5 { class: "modal-title", "Add to playlist" }
                    button {
                        class: "modal-close",
                        r#type: "button",
                        aria_label: "Close",
                        onclick: move |_| picker.write().close(),
                        i { class: "fas fa-times" }
                    }
                }
                div { class: "modal-body",
                    if playlists().is_empty() {
                        p { class: "playlist-empty", "You have no playlists yet." }
                    } else {
                        select {
                            class: "playlist-select",
                            value: "{selected}",
                            onchange: move |evt: Event<FormData>| picker.write().select(evt.value()),
                            option { value: "", "Choose a playlist" }
                            for playlist in playlists() {
                                option { key: "{playlist.id}", value: "{playlist.id}", "{playlist.name}" }
                            }
                        }
                    }
                    if let Some(message) = error {
                        p { class: "playlist-error", role: "alert", "{message}" }
                    }
                }
                div { class: "modal-footer",
                    button {
                        class: "add-to-playlist-btn",
                        r#type: "button",
                        "data-song-id": "{staged}",
                        disabled: busy,
                        onclick: on_confirm,
                        if busy { "Adding..." } else { "Add" }
                    }
                }
            }
        }
    }
}
