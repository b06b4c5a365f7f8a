use crate::actions::LikeToggle;
use crate::api::{ActionsClient, ServerActions};
use crate::utils::{class_list, sleep_ms, ERROR_FLASH_MS};
use dioxus::prelude::*;
use tracing::debug;

/// Like/unlike toggle for one song. The button flips only after the server confirms.
#[component]
pub fn LikeButton(song_id: String, liked: bool, likes_count: u64) -> Element {
    let client = use_context::<ActionsClient>();
    let mut state = use_signal(|| LikeToggle::new(song_id.clone(), liked, likes_count));
    let current = state();
    let id = current.song_id().to_string();
    let is_liked = current.liked();
    let count = current.likes_count();
    let busy = current.in_flight();
    let error = current.last_error().map(str::to_string);

    let on_click = move |_| {
        let request = match state.write().begin() {
            Ok(request) => request,
            Err(err) => {
                debug!(%err, "like click ignored");
                return;
            }
        };
        let client = client.clone();
        spawn(async move {
            let result = client.toggle_like(&request).await;
            if state.write().finish(result).is_err() {
                let generation = state.peek().error_generation();
                sleep_ms(ERROR_FLASH_MS).await;
                state.write().clear_error(generation);
            }
        });
    };

    rsx! {
        button {
            class: class_list(
                "like-button",
                &[("liked", is_liked), ("like-error", error.is_some())],
            ),
            r#type: "button",
            "data-song-id": "{id}",
            "aria-pressed": "{is_liked}",
            "aria-busy": "{busy}",
            title: error.unwrap_or_default(),
            onclick: on_click,
            i { class: if is_liked { "fas fa-heart" } else { "far fa-heart" } }
            span { class: "like-count", "{count}" }
        }
    }
}
