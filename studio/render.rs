/// Central template renderer for the graphite-nn studio.
///
/// The studio uses a single HTML template (`studio/assets/studio.html`) with
/// placeholder tokens like `{{TOKEN}}`. Global placeholders (tab unlock
/// mask, active tab, training flag) are resolved here; tab-specific ones are
/// filled by the caller's closure, and anything left over is blanked so raw
/// `{{TOKEN}}` strings never reach the browser.

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Which tab is active — controls the active CSS class and the JS
/// `ACTIVE_TAB` variable injected into the page.
#[derive(Clone, Copy)]
pub enum Page {
    Dataset = 0,
    Train = 1,
    Test = 2,
}

/// Renders the full studio page.
///
/// # Arguments
/// - `page`             — active tab index
/// - `tab_unlock`       — bitmask; see `StudioState::tab_unlock_mask()`
/// - `training_running` — whether a training job is currently active
/// - `fill`             — closure that fills tab-specific placeholders
pub fn render_page<F>(page: Page, tab_unlock: u8, training_running: bool, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{TAB_UNLOCK}}", &tab_unlock.to_string());
    html = html.replace("{{ACTIVE_TAB}}", &(page as u8).to_string());
    html = html.replace(
        "{{TRAINING_RUNNING}}",
        if training_running { "true" } else { "false" },
    );

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{UPPERCASE_TOKEN}}` that wasn't already substituted with
/// an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}
