use crate::api::models::Track;
use crate::components::{AddToPlaylistButton, LikeButton, PlayerHandle, SignalPlayerView};
use dioxus::prelude::*;
use tracing::warn;

/// The page's tracks. Picking one makes the whole list the playlist.
#[component]
pub fn TrackList(player: PlayerHandle, tracks: Vec<Track>) -> Element {
    let view = use_context::<SignalPlayerView>();
    // The list is the controller's playlist, so its position is the row index.
    let position = (view.position)();

    if tracks.is_empty() {
        return rsx! {
            p { class: "track-list-empty", "Nothing to play yet." }
        };
    }

    rsx! {
        ol { class: "track-list",
            for (index, track) in tracks.iter().enumerate() {
                li {
                    key: "{index}-{track.id}",
                    class: if position == Some(index) { "track-row current" } else { "track-row" },
                    button {
                        class: "track-play",
                        r#type: "button",
                        aria_label: "Play {track.title}",
                        onclick: {
                            let player = player.clone();
                            let tracks = tracks.clone();
                            move |_| {
                                player.with(|c| match c.set_playlist(tracks.clone(), index) {
                                    Ok(()) => c.play(),
                                    Err(err) => warn!(%err, "could not start track"),
                                });
                            }
                        },
                        i { class: "fas fa-play" }
                    }
                    div { class: "track-meta",
                        span { class: "track-title", "{track.title}" }
                        span { class: "track-artist", "{track.artist}" }
                    }
                    LikeButton {
                        song_id: track.id.clone(),
                        liked: track.liked,
                        likes_count: track.likes_count,
                    }
                    AddToPlaylistButton { song_id: track.id.clone() }
                }
            }
        }
    }
}
