// Initial playlist and dialog options handed over by the host page.
use crate::api::models::PageContext;
use thiserror::Error;
use tracing::debug;

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub const CONTEXT_ELEMENT_ID: &str = "player-context";

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Malformed player context: {0}")]
    Malformed(String),
    #[error("Could not read player context: {0}")]
    Io(String),
}

pub fn parse_context(raw: &str) -> Result<PageContext, BootstrapError> {
    if raw.trim().is_empty() {
        return Ok(PageContext::default());
    }
    let mut context: PageContext =
        serde_json::from_str(raw).map_err(|e| BootstrapError::Malformed(e.to_string()))?;
    if context.start_index >= context.tracks.len() {
        context.start_index = 0;
    }
    Ok(context)
}

/// Read the `<script id="player-context" type="application/json">` block.
#[cfg(target_arch = "wasm32")]
pub fn load_page_context() -> Result<PageContext, BootstrapError> {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONTEXT_ELEMENT_ID))
        .and_then(|el| el.text_content());
    match raw {
        Some(raw) => parse_context(&raw),
        None => {
            debug!("no player context embedded in page");
            Ok(PageContext::default())
        }
    }
}

/// Read `context.json` from the config directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_page_context() -> Result<PageContext, BootstrapError> {
    let Ok(dir) = crate::db::config_dir() else {
        return Ok(PageContext::default());
    };
    let path = dir.join("context.json");
    match std::fs::read_to_string(&path) {
        Ok(raw) => parse_context(&raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no player context file");
            Ok(PageContext::default())
        }
        Err(err) => Err(BootstrapError::Io(err.to_string())),
    }
}
