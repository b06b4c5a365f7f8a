//! Playback controller - owns the playlist and keeps the view in step with the
//! audio backend. It holds no DOM references of its own; the backend and the
//! view are injected, so several players can coexist and tests need no browser.

mod backend;
mod error;

pub use backend::*;
pub use error::*;

use crate::api::models::{format_time, Track};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Progress display state derived from the backend clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: f64,
    pub current: String,
    pub duration: String,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            percent: 0.0,
            current: format_time(0.0),
            duration: format_time(f64::NAN),
        }
    }
}

impl Progress {
    pub fn from_clock(current_time: f64, duration: f64) -> Self {
        let percent = if duration.is_finite() && duration > 0.0 && current_time.is_finite() {
            (current_time / duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            percent,
            current: format_time(current_time),
            duration: format_time(duration),
        }
    }
}

/// Where the controller pushes display state.
pub trait PlayerView {
    fn show_track(&mut self, track: &Track);
    fn clear_track(&mut self);
    /// Playlist position of the loaded track, `None` when nothing is loaded.
    fn show_position(&mut self, index: Option<usize>);
    fn show_play_state(&mut self, playing: bool);
    fn show_progress(&mut self, progress: Progress);
    fn show_error(&mut self, message: Option<String>);
}

pub struct PlaybackController<B, V> {
    backend: B,
    view: V,
    playlist: Vec<Rc<Track>>,
    current_index: usize,
    current: Option<Rc<Track>>,
    is_playing: bool,
    volume: f64,
    skip_on_error: bool,
    reported_generation: Option<u64>,
}

impl<B: MediaBackend, V: PlayerView> PlaybackController<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self {
            backend,
            view,
            playlist: Vec::new(),
            current_index: 0,
            current: None,
            is_playing: false,
            volume: 1.0,
            skip_on_error: false,
            reported_generation: None,
        }
    }

    /// Advance past tracks that fail to play instead of stopping.
    pub fn with_skip_on_error(mut self, skip: bool) -> Self {
        self.skip_on_error = skip;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[allow(dead_code)]
    pub fn view(&self) -> &V {
        &self.view
    }

    #[allow(dead_code)]
    pub fn playlist(&self) -> &[Rc<Track>] {
        &self.playlist
    }

    #[allow(dead_code)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[allow(dead_code)]
    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_deref()
    }

    #[allow(dead_code)]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Point the backend at `track` and show its metadata. Does not start playback.
    pub fn load_track(&mut self, track: Rc<Track>) {
        debug!(song_id = %track.id, url = %track.audio_url, "loading track");
        self.backend.set_source(&track.audio_url);
        // Changing the source halts the primitive.
        if self.is_playing {
            self.is_playing = false;
            self.view.show_play_state(false);
        }
        self.view.show_track(&track);
        self.view.show_progress(Progress::default());
        self.view.show_error(None);
        self.current = Some(track);
    }

    pub fn play(&mut self) {
        if self.current.is_none() {
            debug!("play requested with nothing loaded");
            return;
        }
        self.reported_generation = None;
        match self.backend.play() {
            Ok(()) => {
                self.is_playing = true;
                self.view.show_play_state(true);
            }
            Err(err) => self.on_playback_error(err),
        }
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.is_playing = false;
        self.view.show_play_state(false);
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn next(&mut self) {
        if self.current_index + 1 < self.playlist.len() {
            self.step_to(self.current_index + 1);
        }
    }

    pub fn previous(&mut self) {
        if self.current_index > 0 && !self.playlist.is_empty() {
            self.step_to(self.current_index - 1);
        }
    }

    fn step_to(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index).cloned() else {
            return;
        };
        self.current_index = index;
        self.load_track(track);
        self.view.show_position(Some(index));
        self.play();
    }

    /// Replace the playlist and load (without playing) the track at `start_index`.
    pub fn set_playlist(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
    ) -> Result<(), PlayerError> {
        if tracks.is_empty() {
            info!("playlist cleared");
            self.playlist.clear();
            self.current_index = 0;
            self.current = None;
            self.backend.clear_source();
            self.is_playing = false;
            self.view.show_play_state(false);
            self.view.clear_track();
            self.view.show_position(None);
            self.view.show_progress(Progress::default());
            return Ok(());
        }
        if start_index >= tracks.len() {
            return Err(PlayerError::StartIndexOutOfRange {
                index: start_index,
                len: tracks.len(),
            });
        }

        info!(tracks = tracks.len(), start_index, "playlist replaced");
        self.playlist = tracks.into_iter().map(Rc::new).collect();
        self.current_index = start_index;
        let track = Rc::clone(&self.playlist[start_index]);
        self.load_track(track);
        self.view.show_position(Some(start_index));
        Ok(())
    }

    pub fn on_time_update(&mut self) {
        let progress = Progress::from_clock(self.backend.current_time(), self.backend.duration());
        self.view.show_progress(progress);
    }

    pub fn on_ended(&mut self) {
        if self.current_index + 1 < self.playlist.len() {
            self.next();
        } else if self.is_playing {
            debug!("reached end of playlist");
            self.is_playing = false;
            self.view.show_play_state(false);
        }
    }

    pub fn on_playback_error(&mut self, err: PlaybackError) {
        let Some(track) = self.current.clone() else {
            debug!(%err, "ignoring playback error with nothing loaded");
            return;
        };
        warn!(song_id = %track.id, %err, "playback failed");
        self.reported_generation = Some(self.backend.source_generation());
        self.backend.pause();
        self.is_playing = false;
        self.view.show_play_state(false);
        self.view.show_error(Some(err.to_string()));

        if self.skip_on_error && self.current_index + 1 < self.playlist.len() {
            info!(song_id = %track.id, "skipping to next track after failure");
            self.next();
        }
    }

    /// A `play()` promise rejected after the call returned. Rejections for a
    /// source that has since been replaced, or already reported through the
    /// backend's error signal, are dropped.
    pub fn on_play_rejected(&mut self, generation: u64, err: PlaybackError) {
        if generation != self.backend.source_generation() {
            debug!(%err, generation, "dropping rejection for a replaced source");
            return;
        }
        if self.reported_generation == Some(generation) {
            debug!(%err, generation, "failure already reported");
            return;
        }
        self.on_playback_error(err);
    }

    /// Seek to the fraction of the track under a click at `offset_x` on a bar `width` wide.
    pub fn seek(&mut self, offset_x: f64, width: f64) {
        let duration = self.backend.duration();
        if !(width > 0.0) || !duration.is_finite() || !offset_x.is_finite() {
            return;
        }
        let fraction = (offset_x / width).clamp(0.0, 1.0);
        self.backend.set_current_time(fraction * duration);
    }

    /// Apply a 0-100 volume control value.
    pub fn set_volume_percent(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.volume = (value / 100.0).clamp(0.0, 1.0);
        self.backend.set_volume(self.volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Source(String),
        Clear,
        Play,
        Pause,
        Seek(f64),
        Volume(f64),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
        current_time: f64,
        duration: f64,
        failing_urls: Vec<String>,
        source: Option<String>,
        generation: u64,
    }

    impl RecordingBackend {
        fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl MediaBackend for RecordingBackend {
        fn set_source(&mut self, url: &str) {
            self.source = Some(url.to_string());
            self.generation += 1;
            self.calls.push(Call::Source(url.to_string()));
        }

        fn clear_source(&mut self) {
            self.source = None;
            self.generation += 1;
            self.calls.push(Call::Clear);
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.calls.push(Call::Play);
            match &self.source {
                Some(url) if self.failing_urls.contains(url) => Err(PlaybackError::Decode),
                _ => Ok(()),
            }
        }

        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }

        fn current_time(&self) -> f64 {
            self.current_time
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.current_time = seconds;
            self.calls.push(Call::Seek(seconds));
        }

        fn set_volume(&mut self, volume: f64) {
            self.calls.push(Call::Volume(volume));
        }

        fn source_generation(&self) -> u64 {
            self.generation
        }
    }

    #[derive(Default)]
    struct RecordingView {
        title: Option<String>,
        artist: Option<String>,
        cover: Option<String>,
        playing: bool,
        progress: Progress,
        error: Option<String>,
        position: Option<usize>,
    }

    impl PlayerView for RecordingView {
        fn show_track(&mut self, track: &Track) {
            self.title = Some(track.title.clone());
            self.artist = Some(track.artist.clone());
            if let Some(cover) = &track.cover_url {
                self.cover = Some(cover.clone());
            }
        }

        fn clear_track(&mut self) {
            self.title = None;
            self.artist = None;
            self.cover = None;
        }

        fn show_position(&mut self, index: Option<usize>) {
            self.position = index;
        }

        fn show_play_state(&mut self, playing: bool) {
            self.playing = playing;
        }

        fn show_progress(&mut self, progress: Progress) {
            self.progress = progress;
        }

        fn show_error(&mut self, message: Option<String>) {
            self.error = message;
        }
    }

    type TestController = PlaybackController<RecordingBackend, RecordingView>;

    fn track(n: usize) -> Track {
        Track {
            id: n.to_string(),
            title: format!("Track {n}"),
            artist: "Artist".to_string(),
            audio_url: format!("/media/{n}.mp3"),
            cover_url: (n % 2 == 0).then(|| format!("/covers/{n}.jpg")),
            ..Track::default()
        }
    }

    fn tracks(count: usize) -> Vec<Track> {
        (0..count).map(track).collect()
    }

    fn controller() -> TestController {
        PlaybackController::new(RecordingBackend::default(), RecordingView::default())
    }

    #[test]
    fn set_playlist_loads_without_playing() {
        let mut player = controller();
        player.set_playlist(tracks(3), 1).unwrap();

        assert_eq!(player.current_index(), 1);
        assert_eq!(player.current_track(), Some(&track(1)));
        assert_eq!(player.backend().source.as_deref(), Some("/media/1.mp3"));
        assert!(!player.is_playing());
        assert_eq!(player.backend().count(&Call::Play), 0);
        assert_eq!(player.view().title.as_deref(), Some("Track 1"));
        assert_eq!(player.view().artist.as_deref(), Some("Artist"));
    }

    #[test]
    fn set_playlist_rejects_out_of_range_start() {
        let mut player = controller();
        player.set_playlist(tracks(2), 0).unwrap();

        let err = player.set_playlist(tracks(3), 3).unwrap_err();
        assert_eq!(err, PlayerError::StartIndexOutOfRange { index: 3, len: 3 });
        assert_eq!(player.playlist().len(), 2);
        assert_eq!(player.current_track(), Some(&track(0)));
    }

    #[test]
    fn empty_playlist_unloads_everything() {
        let mut player = controller();
        player.set_playlist(tracks(2), 0).unwrap();
        player.play();

        player.set_playlist(Vec::new(), 0).unwrap();
        assert!(player.current_track().is_none());
        assert!(!player.is_playing());
        assert_eq!(player.current_index(), 0);
        assert_eq!(player.view().title, None);
        assert_eq!(player.backend().calls.last(), Some(&Call::Clear));
    }

    #[test]
    fn toggle_twice_restores_flag_with_one_play_and_one_pause() {
        let mut player = controller();
        player.set_playlist(tracks(1), 0).unwrap();

        player.toggle_play();
        assert!(player.is_playing());
        assert!(player.view().playing);
        player.toggle_play();
        assert!(!player.is_playing());
        assert!(!player.view().playing);

        assert_eq!(player.backend().count(&Call::Play), 1);
        assert_eq!(player.backend().count(&Call::Pause), 1);
    }

    #[test]
    fn play_with_nothing_loaded_is_a_no_op() {
        let mut player = controller();
        player.play();
        assert!(!player.is_playing());
        assert!(player.backend().calls.is_empty());
    }

    #[test]
    fn next_and_previous_clamp_at_the_ends() {
        let mut player = controller();
        player.set_playlist(tracks(3), 0).unwrap();

        player.previous();
        assert_eq!(player.current_index(), 0);
        assert_eq!(player.current_track(), Some(&track(0)));
        assert_eq!(player.backend().count(&Call::Play), 0);

        player.next();
        player.next();
        assert_eq!(player.current_index(), 2);
        assert!(player.is_playing());

        let calls_before = player.backend().calls.len();
        player.next();
        assert_eq!(player.current_index(), 2);
        assert_eq!(player.current_track(), Some(&track(2)));
        assert_eq!(player.backend().calls.len(), calls_before);

        player.previous();
        assert_eq!(player.current_index(), 1);
        assert_eq!(player.backend().source.as_deref(), Some("/media/1.mp3"));
    }

    #[test]
    fn navigation_on_empty_playlist_does_nothing() {
        let mut player = controller();
        player.next();
        player.previous();
        player.on_ended();
        assert_eq!(player.current_index(), 0);
        assert!(player.current_track().is_none());
        assert!(player.backend().calls.is_empty());
    }

    #[test]
    fn ended_advances_and_plays() {
        let mut player = controller();
        player.set_playlist(tracks(2), 0).unwrap();
        player.play();

        player.on_ended();
        assert_eq!(player.current_index(), 1);
        assert!(player.is_playing());
        assert_eq!(player.view().title.as_deref(), Some("Track 1"));
    }

    #[test]
    fn ended_on_last_track_stops() {
        let mut player = controller();
        player.set_playlist(tracks(2), 1).unwrap();
        player.play();

        player.on_ended();
        assert_eq!(player.current_index(), 1);
        assert!(!player.is_playing());
        assert!(!player.view().playing);
    }

    #[test]
    fn cover_is_kept_when_next_track_has_none() {
        let mut player = controller();
        player.set_playlist(tracks(2), 0).unwrap();
        player.next();
        assert_eq!(player.view().title.as_deref(), Some("Track 1"));
        assert_eq!(player.view().cover.as_deref(), Some("/covers/0.jpg"));
    }

    #[test]
    fn volume_control_scales_to_unit_range() {
        let mut player = controller();
        player.set_volume_percent(50.0);
        assert_eq!(player.volume(), 0.5);
        player.set_volume_percent(100.0);
        assert_eq!(player.volume(), 1.0);
        assert_eq!(
            player.backend().calls,
            vec![Call::Volume(0.5), Call::Volume(1.0)]
        );
    }

    #[test]
    fn seek_maps_click_fraction_onto_duration() {
        let mut player = controller();
        player.set_playlist(tracks(1), 0).unwrap();
        player.backend.duration = 200.0;

        player.seek(75.0, 300.0);
        assert_eq!(player.backend().current_time, 50.0);
    }

    #[test]
    fn seek_ignores_unknown_duration_and_zero_width() {
        let mut player = controller();
        player.set_playlist(tracks(1), 0).unwrap();
        player.backend.duration = f64::NAN;
        player.seek(10.0, 100.0);

        player.backend.duration = 200.0;
        player.seek(10.0, 0.0);

        assert!(!player
            .backend()
            .calls
            .iter()
            .any(|c| matches!(c, Call::Seek(_))));
    }

    #[test]
    fn time_update_pushes_progress_and_labels() {
        let mut player = controller();
        player.set_playlist(tracks(1), 0).unwrap();
        player.backend.current_time = 65.0;
        player.backend.duration = 260.0;

        player.on_time_update();
        assert_eq!(
            player.view().progress,
            Progress {
                percent: 25.0,
                current: "1:05".to_string(),
                duration: "4:20".to_string(),
            }
        );
    }

    #[test]
    fn time_update_before_metadata_shows_zero() {
        let mut player = controller();
        player.set_playlist(tracks(1), 0).unwrap();
        player.backend.current_time = 3.0;
        player.backend.duration = f64::NAN;

        player.on_time_update();
        assert_eq!(player.view().progress.percent, 0.0);
        assert_eq!(player.view().progress.duration, "0:00");
        assert_eq!(player.view().progress.current, "0:03");
    }

    #[test]
    fn playback_failure_is_reported_and_stops() {
        let mut player = controller();
        player.backend.failing_urls.push("/media/0.mp3".to_string());
        player.set_playlist(tracks(2), 0).unwrap();

        player.play();
        assert!(!player.is_playing());
        assert_eq!(player.current_index(), 0);
        assert_eq!(
            player.view().error.as_deref(),
            Some("Audio playback failed due to a decode error.")
        );
    }

    #[test]
    fn playback_failure_skips_ahead_when_enabled() {
        let mut player = controller().with_skip_on_error(true);
        player.backend.failing_urls.push("/media/0.mp3".to_string());
        player.set_playlist(tracks(3), 0).unwrap();

        player.play();
        assert_eq!(player.current_index(), 1);
        assert!(player.is_playing());
        assert_eq!(player.view().error, None);
    }

    #[test]
    fn async_failure_on_last_track_leaves_player_stopped() {
        let mut player = controller().with_skip_on_error(true);
        player.set_playlist(tracks(1), 0).unwrap();
        player.play();

        player.on_playback_error(PlaybackError::Network);
        assert!(!player.is_playing());
        assert_eq!(player.current_index(), 0);
        assert_eq!(
            player.view().error.as_deref(),
            Some("Network error while loading this track.")
        );
    }

    #[test]
    fn source_failure_with_late_rejection_skips_one_track() {
        let mut player = controller().with_skip_on_error(true);
        player.set_playlist(tracks(3), 0).unwrap();
        player.play();
        let generation = player.backend().source_generation();

        player.on_playback_error(PlaybackError::SourceNotSupported);
        player.on_play_rejected(
            generation,
            PlaybackError::Rejected("The element has no supported sources.".to_string()),
        );

        assert_eq!(player.current_index(), 1);
        assert!(player.is_playing());
        assert_eq!(player.backend().source.as_deref(), Some("/media/1.mp3"));
        assert_eq!(player.view().error, None);
    }

    #[test]
    fn late_rejection_after_error_event_is_not_reported_twice() {
        let mut player = controller().with_skip_on_error(true);
        player.set_playlist(tracks(1), 0).unwrap();
        player.play();
        let generation = player.backend().source_generation();

        player.on_playback_error(PlaybackError::SourceNotSupported);
        let pauses = player.backend().count(&Call::Pause);
        player.on_play_rejected(
            generation,
            PlaybackError::Rejected("The element has no supported sources.".to_string()),
        );

        assert_eq!(player.backend().count(&Call::Pause), pauses);
        assert_eq!(
            player.view().error.as_deref(),
            Some("Failed to load audio because no supported source was found.")
        );
    }

    #[test]
    fn rejection_for_current_source_is_reported() {
        let mut player = controller();
        player.set_playlist(tracks(2), 0).unwrap();
        player.play();

        let generation = player.backend().source_generation();
        player.on_play_rejected(
            generation,
            PlaybackError::Rejected("play() needs a user gesture".to_string()),
        );
        assert!(!player.is_playing());
        assert_eq!(
            player.view().error.as_deref(),
            Some("Playback was refused: play() needs a user gesture")
        );
    }

    #[test]
    fn retrying_a_failed_source_reports_the_new_rejection() {
        let mut player = controller();
        player.set_playlist(tracks(1), 0).unwrap();
        player.play();
        let generation = player.backend().source_generation();
        player.on_playback_error(PlaybackError::Network);

        player.play();
        assert!(player.is_playing());
        player.on_play_rejected(generation, PlaybackError::Rejected("offline".to_string()));
        assert!(!player.is_playing());
        assert_eq!(
            player.view().error.as_deref(),
            Some("Playback was refused: offline")
        );
    }

    #[test]
    fn position_follows_the_playlist_index_with_repeated_songs() {
        let mut player = controller();
        player.set_playlist(vec![track(5), track(5), track(6)], 0).unwrap();
        assert_eq!(player.view().position, Some(0));

        player.next();
        assert_eq!(player.view().position, Some(1));
        player.on_ended();
        assert_eq!(player.view().position, Some(2));

        player.set_playlist(Vec::new(), 0).unwrap();
        assert_eq!(player.view().position, None);
    }

    #[test]
    fn loading_a_new_source_clears_the_playing_flag() {
        let mut player = controller();
        player.set_playlist(tracks(2), 0).unwrap();
        player.play();

        player.load_track(Rc::new(track(7)));
        assert!(!player.is_playing());
        assert_eq!(player.current_track(), Some(&track(7)));
        assert_eq!(player.backend().source.as_deref(), Some("/media/7.mp3"));
    }
}
