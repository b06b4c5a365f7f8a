use crate::components::{PlayerHandle, SignalPlayerView};
use crate::db::{save_settings, PlayerSettings};
use dioxus::prelude::*;
use std::rc::Rc;
use tracing::{debug, warn};

#[component]
pub fn PlayerBar(player: PlayerHandle) -> Element {
    let view = use_context::<SignalPlayerView>();
    let now_playing = (view.now_playing)();
    let cover = (view.cover)();
    let playback_error = (view.playback_error)();

    rsx! {
        div { class: "player-bar",
            div { class: "now-playing",
                if let Some(cover) = cover {
                    img { class: "now-playing-cover", src: "{cover}", alt: "" }
                } else {
                    div { class: "now-playing-cover now-playing-cover--empty" }
                }
                div { class: "now-playing-text",
                    span { class: "now-playing-title",
                        {now_playing.as_ref().map(|t| t.title.clone()).unwrap_or_default()}
                    }
                    span { class: "now-playing-artist",
                        {now_playing.as_ref().map(|t| t.artist.clone()).unwrap_or_default()}
                    }
                }
            }

            div { class: "player-center",
                div { class: "player-controls",
                    PrevButton { player: player.clone() }
                    PlayPauseButton { player: player.clone() }
                    NextButton { player: player.clone() }
                }
                ProgressBar { player: player.clone() }
                if let Some(message) = playback_error {
                    div { class: "playback-error", role: "alert", "{message}" }
                }
            }

            VolumeControl { player: player.clone() }
        }
    }
}

#[component]
fn PlayPauseButton(player: PlayerHandle) -> Element {
    let view = use_context::<SignalPlayerView>();
    let playing = (view.is_playing)();

    rsx! {
        button {
            class: "play-pause",
            r#type: "button",
            aria_label: if playing { "Pause" } else { "Play" },
            onclick: move |_| {
                player.with(|c| c.toggle_play());
            },
            i { class: if playing { "fas fa-pause" } else { "fas fa-play" } }
        }
    }
}

#[component]
fn PrevButton(player: PlayerHandle) -> Element {
    rsx! {
        button {
            class: "prev",
            r#type: "button",
            aria_label: "Previous track",
            onclick: move |_| {
                player.with(|c| c.previous());
            },
            i { class: "fas fa-step-backward" }
        }
    }
}

#[component]
fn NextButton(player: PlayerHandle) -> Element {
    rsx! {
        button {
            class: "next",
            r#type: "button",
            aria_label: "Next track",
            onclick: move |_| {
                player.with(|c| c.next());
            },
            i { class: "fas fa-step-forward" }
        }
    }
}

/// Seek bar with elapsed and total time labels.
#[component]
fn ProgressBar(player: PlayerHandle) -> Element {
    let view = use_context::<SignalPlayerView>();
    let mut bar = use_signal(|| None::<Rc<MountedData>>);
    let progress = (view.progress)();

    let on_seek = move |evt: MouseEvent| {
        let offset_x = evt.element_coordinates().x;
        let Some(element) = bar.peek().clone() else {
            return;
        };
        let player = player.clone();
        spawn(async move {
            match element.get_client_rect().await {
                Ok(rect) => {
                    player.with(|c| c.seek(offset_x, rect.size.width));
                }
                Err(err) => debug!("progress bar has no layout yet: {err:?}"),
            }
        });
    };

    rsx! {
        div { class: "progress-row",
            span { class: "current-time", "{progress.current}" }
            div {
                class: "progress-bar",
                onmounted: move |evt| bar.set(Some(evt.data())),
                onclick: on_seek,
                div {
                    class: "progress-fill",
                    style: "width: {progress.percent}%",
                }
            }
            span { class: "duration", "{progress.duration}" }
        }
    }
}

#[component]
fn VolumeControl(player: PlayerHandle) -> Element {
    let mut settings = use_context::<Signal<PlayerSettings>>();
    let percent = (settings().volume * 100.0).round() as u32;

    let on_input = move |evt: Event<FormData>| {
        let Ok(value) = evt.value().parse::<f64>() else {
            return;
        };
        let Some(volume) = player.with(|c| {
            c.set_volume_percent(value);
            c.volume()
        }) else {
            return;
        };
        settings.write().volume = volume;
        if let Err(err) = save_settings(&settings.peek()) {
            warn!(%err, "failed to persist volume");
        }
    };

    rsx! {
        div { class: "volume",
            i { class: "fas fa-volume-up" }
            input {
                class: "volume-control",
                r#type: "range",
                min: "0",
                max: "100",
                value: "{percent}",
                oninput: on_input,
            }
        }
    }
}
