//! Wry webview child of the winit window.
//!
//! Loads a static shell page whose bridge script swaps in the widget HTML
//! pushed from native code and posts user interactions back over IPC.

use std::sync::mpsc;

use wry::{dpi, Rect, WebView, WebViewBuilder};

use crate::options::RenderMode;
use crate::state::Action;

/// Interactions posted by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// A list entry was clicked.
    Select {
        /// Position in the filtered list.
        index: usize,
    },
    /// The render-mode selector changed.
    SetMode {
        /// Chosen mode.
        mode: RenderMode,
    },
    /// The search input changed.
    Search {
        /// Current input text.
        text: String,
    },
    /// The structure retry button was clicked.
    RetryStructure,
    /// The detail retry button was clicked.
    RetryDetail,
}

impl From<UiAction> for Action {
    fn from(action: UiAction) -> Self {
        match action {
            UiAction::Select { index } => Self::Select(index),
            UiAction::SetMode { mode } => Self::ChangeRenderMode(mode),
            UiAction::Search { text } => Self::Search(text),
            UiAction::RetryStructure => Self::RetryStructure,
            UiAction::RetryDetail => Self::RetryDetail,
        }
    }
}

/// Create the wry webview as a child of the given window, covering it.
///
/// Returns `(webview, action_rx)`; the receiver yields [`UiAction`]s from
/// the page.
pub fn create_webview<W: wry::raw_window_handle::HasWindowHandle>(
    window: &W,
    window_width: u32,
    window_height: u32,
) -> Result<(WebView, mpsc::Receiver<UiAction>), wry::Error> {
    let (tx, rx) = mpsc::channel();

    let webview = WebViewBuilder::new()
        .with_bounds(full_bounds(window_width, window_height))
        .with_html(SHELL_HTML)
        .with_initialization_script(BRIDGE_JS)
        .with_ipc_handler(move |req| {
            let body = req.body();
            if let Ok(msg) = serde_json::from_str::<serde_json::Value>(body) {
                match parse_action(&msg) {
                    Some(action) => {
                        let _ = tx.send(action);
                    }
                    None => log::debug!("ignoring ipc message: {body}"),
                }
            }
        })
        .build_as_child(window)?;

    Ok((webview, rx))
}

/// [`Rect`] covering the whole window.
#[must_use]
pub fn full_bounds(window_width: u32, window_height: u32) -> Rect {
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(0, 0)),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            window_width.max(1),
            window_height.max(1),
        )),
    }
}

/// Replace the page content with `html`.
pub fn push_view(webview: &WebView, html: &str) {
    // A JSON string is a valid JS string literal.
    let literal = serde_json::to_string(html).unwrap_or_default();
    if let Err(e) =
        webview.evaluate_script(&format!("window.__structview_push_view({literal})"))
    {
        log::warn!("failed to push view: {e}");
    }
}

// ── Internals ────────────────────────────────────────────────────────────

const SHELL_HTML: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<style>
body { margin: 0; font-family: sans-serif; font-size: 14px; }
.rootContainer { display: flex; gap: 12px; padding: 12px; }
.viz-container { flex: 1; min-height: 400px; border: 1px solid #ccc; display: flex; align-items: center; justify-content: center; }
.viz-container.error { color: #b00; padding: 12px; }
.select-box { width: 280px; display: flex; flex-direction: column; gap: 6px; }
.heading { font-weight: bold; }
.list { max-height: 300px; overflow: scroll; }
.option { padding: 4px 6px; cursor: pointer; }
.option.selected { background: #e0ecff; }
.details-panel { padding: 4px 12px; }
.error { color: #b00; }
.loading { color: #666; }
</style>
</head>
<body><div id="root"></div></body>
</html>"#;

/// JavaScript injected before page load. Defines the push function called
/// from native code and forwards `data-action` interactions over IPC.
///
/// Pushes that arrive before the page has loaded are buffered and applied
/// on `DOMContentLoaded`. Focus and caret of the search input survive a
/// push.
const BRIDGE_JS: &str = r#"
(function() {
    var pending = null;

    function apply(html) {
        var root = document.getElementById('root');
        if (!root) { pending = html; return; }
        var active = document.activeElement;
        var searching = active && active.dataset && active.dataset.action === 'search';
        var caret = searching ? active.selectionStart : 0;
        root.innerHTML = html;
        if (searching) {
            var input = root.querySelector('[data-action="search"]');
            if (input) { input.focus(); input.setSelectionRange(caret, caret); }
        }
    }

    function post(msg) { window.ipc.postMessage(JSON.stringify(msg)); }

    window.__structview_push_view = apply;

    document.addEventListener('DOMContentLoaded', function() {
        if (pending !== null) { var html = pending; pending = null; apply(html); }
    });
    document.addEventListener('click', function(ev) {
        var el = ev.target.closest('[data-action]');
        if (!el) return;
        var action = el.dataset.action;
        if (action === 'select') post({ action: 'select', index: Number(el.dataset.index) });
        if (action === 'retry-structure') post({ action: 'retry_structure' });
        if (action === 'retry-detail') post({ action: 'retry_detail' });
    });
    document.addEventListener('change', function(ev) {
        if (ev.target.dataset.action === 'mode') post({ action: 'set_mode', mode: ev.target.value });
    });
    document.addEventListener('input', function(ev) {
        if (ev.target.dataset.action === 'search') post({ action: 'search', text: ev.target.value });
    });
})();
"#;

/// Parse an IPC message from the page into a [`UiAction`].
fn parse_action(msg: &serde_json::Value) -> Option<UiAction> {
    let action = msg.get("action")?.as_str()?;
    match action {
        "select" => {
            let index = usize::try_from(msg.get("index")?.as_u64()?).ok()?;
            Some(UiAction::Select { index })
        }
        "set_mode" => {
            let mode = msg.get("mode")?.as_str()?.parse().ok()?;
            Some(UiAction::SetMode { mode })
        }
        "search" => {
            let text = msg.get("text")?.as_str()?.to_owned();
            Some(UiAction::Search { text })
        }
        "retry_structure" => Some(UiAction::RetryStructure),
        "retry_detail" => Some(UiAction::RetryDetail),
        _ => None,
    }
}
