// Playback primitives the controller drives.
use super::PlaybackError;
#[cfg(target_arch = "wasm32")]
use super::BindError;
use tracing::debug;
#[cfg(target_arch = "wasm32")]
use tracing::warn;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

pub const AUDIO_ELEMENT_ID: &str = "rustyplayer-audio";
/// Event re-dispatched on the audio element when a `play()` promise rejects.
pub const PLAY_REJECTED_EVENT: &str = "playrejected";

/// The native audio capability. Elapsed time and duration belong to the
/// backend; the controller only reads them or requests a seek.
pub trait MediaBackend {
    fn set_source(&mut self, url: &str);
    fn clear_source(&mut self);
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn current_time(&self) -> f64;
    /// NaN until metadata has loaded.
    fn duration(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    /// Bumped on every source change. A rejected `play()` reports the
    /// generation it was issued under.
    fn source_generation(&self) -> u64;
}

/// Browser `<audio>` element, shared by every controller on the page.
#[cfg(target_arch = "wasm32")]
pub struct WebAudioBackend {
    audio: HtmlAudioElement,
    generation: u64,
}

#[cfg(target_arch = "wasm32")]
impl WebAudioBackend {
    /// Find the player's audio element, creating it on first use.
    pub fn attach() -> Result<Self, BindError> {
        let document = window()
            .ok_or(BindError::NoWindow)?
            .document()
            .ok_or(BindError::NoDocument)?;

        if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
            let audio = existing
                .dyn_into::<HtmlAudioElement>()
                .map_err(|_| BindError::WrongElementType(AUDIO_ELEMENT_ID.to_string()))?;
            return Ok(Self { audio, generation: 0 });
        }

        let audio: HtmlAudioElement = document
            .create_element("audio")
            .map_err(|_| BindError::MissingElement("audio".to_string()))?
            .dyn_into()
            .map_err(|_| BindError::WrongElementType("audio".to_string()))?;
        audio.set_id(AUDIO_ELEMENT_ID);
        // Stream instead of buffering whole files up front.
        let _ = audio.set_attribute("preload", "metadata");
        document
            .body()
            .ok_or_else(|| BindError::MissingElement("body".to_string()))?
            .append_child(&audio)
            .map_err(|_| BindError::MissingElement("body".to_string()))?;

        Ok(Self {
            audio,
            generation: 0,
        })
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.audio
    }

    /// The element's current `MediaError`, if any.
    pub fn last_error(&self) -> Option<PlaybackError> {
        self.audio
            .error()
            .map(|err| PlaybackError::from_media_error_code(err.code()))
    }
}

#[cfg(target_arch = "wasm32")]
impl MediaBackend for WebAudioBackend {
    fn set_source(&mut self, url: &str) {
        self.generation += 1;
        self.audio.set_src(url);
    }

    fn clear_source(&mut self) {
        self.generation += 1;
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let promise = self
            .audio
            .play()
            .map_err(|err| PlaybackError::Rejected(js_error_message(&err)))?;
        let audio = self.audio.clone();
        let generation = self.generation;
        wasm_bindgen_futures::spawn_local(async move {
            let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await else {
                return;
            };
            // A newer source interrupted this play request.
            if js_error_name(&err).as_deref() == Some("AbortError") {
                debug!("play() superseded by a new load");
                return;
            }
            let message = js_error_message(&err);
            warn!(%message, "audio play() was rejected");
            dispatch_rejection(&audio, generation, &message);
        });
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.audio.pause();
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn duration(&self) -> f64 {
        self.audio.duration()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume);
    }

    fn source_generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error_name(err: &JsValue) -> Option<String> {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.name()))
}

#[cfg(target_arch = "wasm32")]
fn js_error_message(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Split the `[generation, message]` detail of a play rejection event.
#[cfg(target_arch = "wasm32")]
pub fn rejection_detail(detail: &JsValue) -> Option<(u64, String)> {
    let pair = detail.dyn_ref::<js_sys::Array>()?;
    let generation = pair.get(0).as_f64()? as u64;
    let message = pair
        .get(1)
        .as_string()
        .unwrap_or_else(|| "playback was refused".to_string());
    Some((generation, message))
}

#[cfg(target_arch = "wasm32")]
fn dispatch_rejection(audio: &HtmlAudioElement, generation: u64, message: &str) {
    let detail = js_sys::Array::of2(
        &JsValue::from_f64(generation as f64),
        &JsValue::from_str(message),
    );
    let init = web_sys::CustomEventInit::new();
    init.set_detail(&detail);
    if let Ok(event) =
        web_sys::CustomEvent::new_with_event_init_dict(PLAY_REJECTED_EVENT, &init)
    {
        let _ = audio.dispatch_event(&event);
    }
}

/// In-memory stand-in used when no browser audio element exists.
#[derive(Debug, Clone)]
pub struct DetachedBackend {
    source: Option<String>,
    playing: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    generation: u64,
}

impl Default for DetachedBackend {
    fn default() -> Self {
        Self {
            source: None,
            playing: false,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            generation: 0,
        }
    }
}

#[allow(dead_code)]
impl DetachedBackend {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Pretend metadata arrived for the current source.
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds;
    }
}

impl MediaBackend for DetachedBackend {
    fn set_source(&mut self, url: &str) {
        debug!(url, "detached backend source set");
        self.source = Some(url.to_string());
        self.generation += 1;
        self.playing = false;
        self.current_time = 0.0;
        self.duration = f64::NAN;
    }

    fn clear_source(&mut self) {
        *self = Self {
            volume: self.volume,
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::SourceNotSupported);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn source_generation(&self) -> u64 {
        self.generation
    }
}
