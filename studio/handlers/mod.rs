pub mod dataset;
pub mod train;
pub mod train_sse;
pub mod test;
pub mod models;

use crate::state::{FlashKind, FlashMessage};

/// Escapes the five HTML-significant characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders a one-shot flash message, or nothing.
pub fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash flash-success",
                FlashKind::Error => "flash flash-error",
            };
            format!(r#"<div class="{}">{}</div>"#, class, html_escape(&f.text))
        }
        None => String::new(),
    }
}
