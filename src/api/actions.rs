// Server round trips for the like toggle and the add-to-playlist confirm step.
use crate::api::csrf::{cookie_value, document_cookies};
use crate::api::models::*;
use crate::db::PlayerSettings;
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{debug, warn};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("No CSRF token found in cookie \"{0}\"")]
    MissingCsrfToken(String),
    #[error("A request for this item is already in flight")]
    RequestInFlight,
    #[error("No song is staged for the playlist dialog")]
    NothingStaged,
    #[error("Choose a playlist first")]
    NoPlaylistSelected,
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Server responded with status {0}")]
    Status(u16),
    #[error("Server rejected the action: {0}")]
    Unsuccessful(String),
    #[error("Unreadable server response: {0}")]
    Decode(String),
}

/// The two state-changing calls the widget makes against the host server.
#[allow(async_fn_in_trait)]
pub trait ServerActions {
    async fn toggle_like(&self, request: &LikeRequest) -> Result<LikeResponse, ActionError>;
    async fn add_to_playlist(&self, request: &AddToPlaylistRequest) -> Result<(), ActionError>;
}

#[derive(Debug, Clone, PartialEq)]
enum CookieSource {
    Document,
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionsClient {
    server_url: Option<String>,
    like_endpoint: String,
    add_to_playlist_endpoint: String,
    csrf_cookie_name: String,
    csrf_header: String,
    cookies: CookieSource,
}

impl ActionsClient {
    pub fn new(settings: &PlayerSettings) -> Self {
        Self {
            server_url: settings
                .server_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            like_endpoint: settings.like_endpoint.clone(),
            add_to_playlist_endpoint: settings.add_to_playlist_endpoint.clone(),
            csrf_cookie_name: settings.csrf_cookie_name.clone(),
            csrf_header: settings.csrf_header.clone(),
            cookies: CookieSource::Document,
        }
    }

    /// Use a fixed cookie string instead of `document.cookie`.
    #[allow(dead_code)]
    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = CookieSource::Fixed(cookies.into());
        self
    }

    fn csrf_token(&self) -> Result<String, ActionError> {
        let cookies = match &self.cookies {
            CookieSource::Document => document_cookies().unwrap_or_default(),
            CookieSource::Fixed(cookies) => cookies.clone(),
        };
        cookie_value(&cookies, &self.csrf_cookie_name)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ActionError::MissingCsrfToken(self.csrf_cookie_name.clone()))
    }

    fn endpoint_url(&self, path: &str) -> Result<String, ActionError> {
        let base = self.server_url.clone().or_else(page_origin);
        resolve_endpoint(base.as_deref(), path)
    }

    fn add_to_playlist_url(&self, song_id: &str) -> Result<String, ActionError> {
        let path = self
            .add_to_playlist_endpoint
            .replace("{song_id}", &urlencoding::encode(song_id));
        self.endpoint_url(&path)
    }
}

impl ServerActions for ActionsClient {
    async fn toggle_like(&self, request: &LikeRequest) -> Result<LikeResponse, ActionError> {
        let token = self.csrf_token()?;
        let url = self.endpoint_url(&self.like_endpoint)?;
        debug!(song_id = %request.song_id, action = request.action.as_str(), "sending like toggle");

        let response = HTTP_CLIENT
            .post(&url)
            .header(self.csrf_header.as_str(), token)
            .json(request)
            .send()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "like toggle failed");
            return Err(ActionError::Status(status.as_u16()));
        }

        response
            .json::<LikeResponse>()
            .await
            .map_err(|e| ActionError::Decode(e.to_string()))
    }

    async fn add_to_playlist(&self, request: &AddToPlaylistRequest) -> Result<(), ActionError> {
        let token = self.csrf_token()?;
        let url = self.add_to_playlist_url(&request.song_id)?;
        let body = format!("playlist_id={}", urlencoding::encode(&request.playlist_id));
        debug!(song_id = %request.song_id, playlist_id = %request.playlist_id, "adding song to playlist");

        let response = HTTP_CLIENT
            .post(&url)
            .header(self.csrf_header.as_str(), token)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;

        // The server answers a successful add with a redirect back to the song page.
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            warn!(%url, status = status.as_u16(), "add to playlist failed");
            Err(ActionError::Status(status.as_u16()))
        }
    }
}

/// Join a possibly-relative endpoint onto a server origin.
pub fn resolve_endpoint(base: Option<&str>, path: &str) -> Result<String, ActionError> {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(path.to_string());
    }
    let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) else {
        return Err(ActionError::Transport(format!(
            "cannot resolve \"{path}\" without a server origin"
        )));
    };
    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> Option<String> {
    None
}
