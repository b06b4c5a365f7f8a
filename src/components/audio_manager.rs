//! Audio Manager - keeps the playback controller outside the render cycle.
//! Components reach it through `PlayerHandle`; it pushes state back through
//! signals so only the bound elements re-render.

use crate::api::models::Track;
use crate::player::{PlaybackController, PlayerView, Progress};
use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

#[cfg(target_arch = "wasm32")]
use crate::player::{rejection_detail, PlaybackError, PLAY_REJECTED_EVENT};
#[cfg(target_arch = "wasm32")]
use dioxus::core::{Runtime, RuntimeGuard};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[cfg(target_arch = "wasm32")]
pub type AudioBackend = crate::player::WebAudioBackend;
#[cfg(not(target_arch = "wasm32"))]
pub type AudioBackend = crate::player::DetachedBackend;

pub type Controller = PlaybackController<AudioBackend, SignalPlayerView>;

/// Display state the player bar renders from.
#[derive(Clone, Copy, PartialEq)]
pub struct SignalPlayerView {
    pub now_playing: Signal<Option<Track>>,
    pub position: Signal<Option<usize>>,
    pub cover: Signal<Option<String>>,
    pub is_playing: Signal<bool>,
    pub progress: Signal<Progress>,
    pub playback_error: Signal<Option<String>>,
}

impl SignalPlayerView {
    pub fn new() -> Self {
        Self {
            now_playing: Signal::new(None),
            position: Signal::new(None),
            cover: Signal::new(None),
            is_playing: Signal::new(false),
            progress: Signal::new(Progress::default()),
            playback_error: Signal::new(None),
        }
    }
}

impl PlayerView for SignalPlayerView {
    fn show_track(&mut self, track: &Track) {
        self.now_playing.set(Some(track.clone()));
        // Tracks without artwork keep the previous cover.
        if let Some(cover) = &track.cover_url {
            self.cover.set(Some(cover.clone()));
        }
    }

    fn clear_track(&mut self) {
        self.now_playing.set(None);
        self.cover.set(None);
    }

    fn show_position(&mut self, index: Option<usize>) {
        if *self.position.peek() != index {
            self.position.set(index);
        }
    }

    fn show_play_state(&mut self, playing: bool) {
        self.is_playing.set(playing);
    }

    fn show_progress(&mut self, progress: Progress) {
        if *self.progress.peek() != progress {
            self.progress.set(progress);
        }
    }

    fn show_error(&mut self, message: Option<String>) {
        if *self.playback_error.peek() != message {
            self.playback_error.set(message);
        }
    }
}

/// Shared access to the page's controller.
#[derive(Clone)]
pub struct PlayerHandle {
    inner: Rc<RefCell<Controller>>,
}

impl PartialEq for PlayerHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PlayerHandle {
    pub fn new(controller: Controller) -> Self {
        Self {
            inner: Rc::new(RefCell::new(controller)),
        }
    }

    /// Run `f` against the controller. Re-entrant calls are dropped with a warning.
    pub fn with<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => Some(f(&mut controller)),
            Err(_) => {
                warn!("player controller busy; dropping event");
                None
            }
        }
    }
}

/// Route the audio element's events into the controller.
#[cfg(target_arch = "wasm32")]
pub fn attach_audio_listeners(player: &PlayerHandle) {
    let Some(audio) = player.with(|c| c.backend().element().clone()) else {
        return;
    };
    let runtime = Runtime::current();

    let bind = |action: fn(&mut Controller)| {
        let runtime = runtime.clone();
        let player = player.clone();
        Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime.clone());
            player.with(action);
        }) as Box<dyn FnMut()>)
    };

    let listeners = [
        ("timeupdate", bind(|c| c.on_time_update())),
        ("loadedmetadata", bind(|c| c.on_time_update())),
        ("ended", bind(|c| c.on_ended())),
        (
            "error",
            bind(|c| {
                let err = c.backend().last_error().unwrap_or(PlaybackError::Unknown(0));
                c.on_playback_error(err);
            }),
        ),
    ];
    for (event, callback) in listeners {
        let _ = audio.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        callback.forget();
    }

    let rejected = {
        let runtime = runtime.clone();
        let player = player.clone();
        Closure::wrap(Box::new(move |event: web_sys::Event| {
            let _guard = RuntimeGuard::new(runtime.clone());
            let Some((generation, message)) = event
                .dyn_ref::<web_sys::CustomEvent>()
                .and_then(|e| rejection_detail(&e.detail()))
            else {
                warn!("play rejection without a source generation");
                return;
            };
            player.with(|c| c.on_play_rejected(generation, PlaybackError::Rejected(message)));
        }) as Box<dyn FnMut(_)>)
    };
    let _ = audio
        .add_event_listener_with_callback(PLAY_REJECTED_EVENT, rejected.as_ref().unchecked_ref());
    rejected.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn attach_audio_listeners(_player: &PlayerHandle) {}
