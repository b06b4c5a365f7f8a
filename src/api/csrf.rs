//! CSRF token lookup from the document cookie string.

/// Find `name` in a `document.cookie` style string and return its decoded value.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    if cookies.trim().is_empty() || name.is_empty() {
        return None;
    }

    let prefix = format!("{name}=");
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
}

/// Current `document.cookie`, if the page exposes one.
#[cfg(target_arch = "wasm32")]
pub fn document_cookies() -> Option<String> {
    use wasm_bindgen::JsCast;

    let document = web_sys::window()?.document()?;
    document
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()?
        .cookie()
        .ok()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn document_cookies() -> Option<String> {
    None
}
