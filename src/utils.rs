/// Utility helpers for rustyplayer

/// How long a failed action stays flagged on its button.
pub const ERROR_FLASH_MS: u32 = 4000;

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u32) {
    tokio::time::sleep(std::time::Duration::from_millis(u64::from(ms))).await;
}

#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u32) {
    gloo_timers::future::TimeoutFuture::new(ms).await;
}

/// Join optional CSS modifier classes onto a base class.
pub fn class_list(base: &str, modifiers: &[(&str, bool)]) -> String {
    let mut out = String::from(base);
    for (class, enabled) in modifiers {
        if *enabled {
            out.push(' ');
            out.push_str(class);
        }
    }
    out
}
