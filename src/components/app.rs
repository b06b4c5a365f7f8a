use crate::actions::PlaylistPicker;
use crate::api::{ActionsClient, PageContext};
use crate::bootstrap::load_page_context;
use crate::components::{
    attach_audio_listeners, AudioBackend, PlayerBar, PlayerHandle, PlaylistModal,
    SignalPlayerView, TrackList,
};
use crate::db::{load_settings, PlayerSettings};
use crate::player::{BindError, PlaybackController};
use dioxus::prelude::*;
use tracing::{error, info, warn};

#[cfg(target_arch = "wasm32")]
fn attach_backend() -> Result<AudioBackend, BindError> {
    AudioBackend::attach()
}

#[cfg(not(target_arch = "wasm32"))]
fn attach_backend() -> Result<AudioBackend, BindError> {
    Ok(AudioBackend::default())
}

fn build_player(view: SignalPlayerView, settings: &PlayerSettings) -> Result<PlayerHandle, BindError> {
    let backend = attach_backend()?;
    let mut controller =
        PlaybackController::new(backend, view).with_skip_on_error(settings.skip_on_error);
    controller.set_volume_percent(settings.volume * 100.0);

    let player = PlayerHandle::new(controller);
    attach_audio_listeners(&player);
    Ok(player)
}

#[component]
pub fn AppShell() -> Element {
    let settings = use_signal(load_settings);
    let view = use_hook(SignalPlayerView::new);
    let context = use_hook(|| {
        load_page_context().unwrap_or_else(|err| {
            warn!(%err, "ignoring player context");
            PageContext::default()
        })
    });
    let playlists = use_signal(|| context.playlists.clone());
    let picker = use_signal(PlaylistPicker::default);
    let client = use_hook(|| ActionsClient::new(&settings.peek()));
    let player = use_hook(|| {
        build_player(view, &settings.peek()).inspect_err(|err| {
            error!(%err, "audio element unavailable");
        })
    });

    use_context_provider(|| view);
    use_context_provider(|| settings);
    use_context_provider(|| playlists);
    use_context_provider(|| picker);
    use_context_provider(|| client.clone());

    // Load the page's playlist once the view signals are mounted.
    {
        let player = player.clone();
        let context = context.clone();
        use_effect(move || {
            let Ok(player) = &player else {
                return;
            };
            player.with(|c| {
                match c.set_playlist(context.tracks.clone(), context.start_index) {
                    Ok(()) => info!(tracks = context.tracks.len(), "player ready"),
                    Err(err) => warn!(%err, "initial playlist rejected"),
                }
            });
        });
    }

    let player = match player {
        Ok(player) => player,
        Err(err) => {
            return rsx! {
                div { class: "player-error", role: "alert", "Player unavailable: {err}" }
            };
        }
    };

    rsx! {
        div { class: "rustyplayer",
            main { class: "player-page",
                TrackList { player: player.clone(), tracks: context.tracks.clone() }
            }
            PlayerBar { player: player.clone() }
            PlaylistModal {}
        }
    }
}
