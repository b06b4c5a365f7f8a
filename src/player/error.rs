use thiserror::Error;

/// Failure reported by the playback primitive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Playback was aborted before the stream loaded.")]
    Aborted,
    #[error("Network error while loading this track.")]
    Network,
    #[error("Audio playback failed due to a decode error.")]
    Decode,
    #[error("Failed to load audio because no supported source was found.")]
    SourceNotSupported,
    #[error("Playback was refused: {0}")]
    Rejected(String),
    #[error("Unable to load this audio source (code {0}).")]
    Unknown(u16),
}

impl PlaybackError {
    /// Map a `MediaError.code` value.
    pub fn from_media_error_code(code: u16) -> Self {
        match code {
            1 => Self::Aborted,
            2 => Self::Network,
            3 => Self::Decode,
            4 => Self::SourceNotSupported,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    #[error("Start index {index} is outside a playlist of {len} tracks")]
    StartIndexOutOfRange { index: usize, len: usize },
}

/// A host element the player needs could not be obtained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("No browser window")]
    NoWindow,
    #[error("No document attached to the window")]
    NoDocument,
    #[error("Required element \"{0}\" is missing")]
    MissingElement(String),
    #[error("Element \"{0}\" has an unexpected type")]
    WrongElementType(String),
}
