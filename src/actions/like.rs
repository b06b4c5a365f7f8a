use crate::api::{ActionError, LikeAction, LikeRequest, LikeResponse};
use tracing::{debug, warn};

/// State behind one like button.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeToggle {
    song_id: String,
    liked: bool,
    likes_count: u64,
    in_flight: bool,
    last_error: Option<String>,
    error_generation: u64,
}

impl LikeToggle {
    pub fn new(song_id: impl Into<String>, liked: bool, likes_count: u64) -> Self {
        Self {
            song_id: song_id.into(),
            liked,
            likes_count,
            in_flight: false,
            last_error: None,
            error_generation: 0,
        }
    }

    pub fn song_id(&self) -> &str {
        &self.song_id
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    pub fn likes_count(&self) -> u64 {
        self.likes_count
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Bumped each time a failure is recorded.
    pub fn error_generation(&self) -> u64 {
        self.error_generation
    }

    /// Clear the error recorded under `generation`. A newer failure is kept.
    pub fn clear_error(&mut self, generation: u64) -> bool {
        if self.error_generation != generation || self.last_error.is_none() {
            return false;
        }
        self.last_error = None;
        true
    }

    /// Start a toggle. Only one request per button may be outstanding.
    pub fn begin(&mut self) -> Result<LikeRequest, ActionError> {
        if self.in_flight {
            return Err(ActionError::RequestInFlight);
        }
        self.in_flight = true;
        self.last_error = None;
        let action = if self.liked {
            LikeAction::Unlike
        } else {
            LikeAction::Like
        };
        Ok(LikeRequest {
            song_id: self.song_id.clone(),
            action,
        })
    }

    /// Apply the server's answer. The button only changes on a successful response.
    pub fn finish(&mut self, result: Result<LikeResponse, ActionError>) -> Result<(), ActionError> {
        self.in_flight = false;
        let outcome = match result {
            Ok(response) if response.success => {
                self.liked = response.is_liked.unwrap_or(!self.liked);
                self.likes_count = response.likes_count;
                debug!(song_id = %self.song_id, liked = self.liked, likes = self.likes_count, "like toggled");
                Ok(())
            }
            Ok(response) => Err(ActionError::Unsuccessful(
                response
                    .error
                    .unwrap_or_else(|| "the server did not accept the change".to_string()),
            )),
            Err(err) => Err(err),
        };

        if let Err(err) = &outcome {
            warn!(song_id = %self.song_id, %err, "like toggle failed");
            self.last_error = Some(err.to_string());
            self.error_generation += 1;
        }
        outcome
    }
}
