use serde::{Deserialize, Deserializer, Serialize};

/// A single playable item as the host page describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Track {
    #[serde(alias = "songId", alias = "song_id", deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(alias = "audioUrl")]
    pub audio_url: String,
    #[serde(default, alias = "coverUrl", alias = "cover")]
    pub cover_url: Option<String>,
    #[serde(default, alias = "isLiked", alias = "is_liked")]
    pub liked: bool,
    #[serde(default, alias = "likesCount")]
    pub likes_count: u64,
}

/// One of the signed-in user's playlists, offered by the add-to-playlist dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaylistSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// Bootstrap document embedded in the host page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PageContext {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default, alias = "startIndex")]
    pub start_index: usize,
    #[serde(default)]
    pub playlists: Vec<PlaylistSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Unlike => "unlike",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikeRequest {
    #[serde(serialize_with = "numeric_when_possible")]
    pub song_id: String,
    pub action: LikeAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct LikeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub is_liked: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddToPlaylistRequest {
    pub song_id: String,
    pub playlist_id: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text.trim().to_string(),
        Raw::Unsigned(value) => value.to_string(),
        Raw::Signed(value) => value.to_string(),
    })
}

// Data attributes holding digits reach the server as JSON numbers.
fn numeric_when_possible<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value.parse::<u64>() {
        Ok(number) => serializer.serialize_u64(number),
        Err(_) => serializer.serialize_str(value),
    }
}

/// Format a seconds value as `M:SS`. Unknown durations (NaN, infinite) and
/// negative values render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    let mins = whole / 60;
    let secs = whole % 60;
    format!("{}:{:02}", mins, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_time_pads_seconds_only() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.4), "0:05");
        assert_eq!(format_time(59.99), "0:59");
        assert_eq!(format_time(60.0), "1:00");
        assert_eq!(format_time(754.0), "12:34");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn format_time_handles_unknown_durations() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn format_time_is_pure() {
        for value in [0.0, 1.5, 61.0, 199.9, f64::NAN] {
            assert_eq!(format_time(value), format_time(value));
        }
    }

    #[test]
    fn track_accepts_page_spellings() {
        let track: Track = serde_json::from_str(
            r#"{"songId": 42, "title": "Intro", "artist": "Band",
                "audioUrl": "/media/intro.mp3", "cover": "/media/intro.jpg"}"#,
        )
        .unwrap();

        assert_eq!(track.id, "42");
        assert_eq!(track.audio_url, "/media/intro.mp3");
        assert_eq!(track.cover_url.as_deref(), Some("/media/intro.jpg"));
        assert!(!track.liked);
        assert_eq!(track.likes_count, 0);
    }

    #[test]
    fn like_request_sends_numeric_ids_as_numbers() {
        let numeric = LikeRequest {
            song_id: "42".to_string(),
            action: LikeAction::Like,
        };
        assert_eq!(
            serde_json::to_value(&numeric).unwrap(),
            serde_json::json!({"song_id": 42, "action": "like"})
        );

        let slug = LikeRequest {
            song_id: "intro-7".to_string(),
            action: LikeAction::Unlike,
        };
        assert_eq!(
            serde_json::to_value(&slug).unwrap(),
            serde_json::json!({"song_id": "intro-7", "action": "unlike"})
        );
    }

    #[test]
    fn like_response_tolerates_error_payload() {
        let response: LikeResponse =
            serde_json::from_str(r#"{"success": false, "error": "Song matching query does not exist."}"#)
                .unwrap();
        assert!(!response.success);
        assert_eq!(response.likes_count, 0);
        assert_eq!(
            response.error.as_deref(),
            Some("Song matching query does not exist.")
        );
    }

    #[test]
    fn page_context_defaults_missing_sections() {
        let context: PageContext = serde_json::from_str(r#"{"tracks": []}"#).unwrap();
        assert_eq!(context, PageContext::default());
    }
}
