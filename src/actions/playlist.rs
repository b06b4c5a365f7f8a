use crate::api::{ActionError, AddToPlaylistRequest};
use tracing::{debug, info, warn};

/// State of the playlist selection dialog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaylistPicker {
    open: bool,
    staged_song: Option<String>,
    selected_playlist: Option<String>,
    in_flight: bool,
    last_error: Option<String>,
}

impl PlaylistPicker {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Identifier carried by the dialog's confirm control.
    pub fn staged_song(&self) -> Option<&str> {
        self.staged_song.as_deref()
    }

    pub fn selected_playlist(&self) -> Option<&str> {
        self.selected_playlist.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stage `song_id` on the dialog. Refused while a confirm is outstanding,
    /// so its answer always belongs to the staged song.
    pub fn open_for(&mut self, song_id: impl Into<String>) -> Result<(), ActionError> {
        let song_id = song_id.into();
        if self.in_flight {
            debug!(%song_id, "playlist dialog busy; not restaging");
            return Err(ActionError::RequestInFlight);
        }
        debug!(%song_id, "opening playlist dialog");
        self.open = true;
        self.staged_song = Some(song_id);
        self.last_error = None;
        Ok(())
    }

    pub fn select(&mut self, playlist_id: impl Into<String>) {
        let playlist_id = playlist_id.into();
        self.selected_playlist = (!playlist_id.is_empty()).then_some(playlist_id);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.last_error = None;
    }

    pub fn begin_confirm(&mut self) -> Result<AddToPlaylistRequest, ActionError> {
        if self.in_flight {
            return Err(ActionError::RequestInFlight);
        }
        let request = match (&self.staged_song, &self.selected_playlist) {
            (None, _) => Err(ActionError::NothingStaged),
            (Some(_), None) => Err(ActionError::NoPlaylistSelected),
            (Some(song_id), Some(playlist_id)) => Ok(AddToPlaylistRequest {
                song_id: song_id.clone(),
                playlist_id: playlist_id.clone(),
            }),
        };
        match &request {
            Ok(_) => {
                self.in_flight = true;
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
        request
    }

    pub fn finish(&mut self, result: Result<(), ActionError>) -> Result<(), ActionError> {
        self.in_flight = false;
        match result {
            Ok(()) => {
                info!(
                    song_id = self.staged_song.as_deref().unwrap_or_default(),
                    playlist_id = self.selected_playlist.as_deref().unwrap_or_default(),
                    "song added to playlist"
                );
                self.open = false;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "adding song to playlist failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
