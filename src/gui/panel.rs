//! Widget panel controller: owns the wry webview and keeps it in sync with
//! the widget.

use std::sync::mpsc;

use winit::window::Window;

use super::webview::{self, UiAction};
use crate::engine::RenderEngine;
use crate::service::Backend;
use crate::widget::Widget;

/// Owns the webview and the last HTML pushed to it.
pub(crate) struct WidgetPanel {
    webview: Option<wry::WebView>,
    action_rx: Option<mpsc::Receiver<UiAction>>,
    last_html: String,
}

impl WidgetPanel {
    /// Create a controller with no webview yet.
    pub(crate) fn new() -> Self {
        Self {
            webview: None,
            action_rx: None,
            last_html: String::new(),
        }
    }

    /// Create the wry webview covering `window`.
    pub(crate) fn init_webview(&mut self, window: &Window) {
        let inner = window.inner_size();
        match webview::create_webview(window, inner.width, inner.height) {
            Ok((wv, rx)) => {
                self.webview = Some(wv);
                self.action_rx = Some(rx);
            }
            Err(e) => {
                log::error!("Failed to create webview: {e}");
            }
        }
    }

    /// Stretch the webview over the window.
    pub(crate) fn apply_layout(&self, window: &Window) {
        let Some(ref wv) = self.webview else {
            return;
        };
        let inner = window.inner_size();
        if let Err(e) =
            wv.set_bounds(webview::full_bounds(inner.width, inner.height))
        {
            log::warn!("failed to resize webview: {e}");
        }
    }

    /// Drain page interactions into the widget. Returns how many were
    /// dispatched.
    pub(crate) fn drain_and_apply<B, E>(
        &self,
        widget: &mut Widget<B, E>,
    ) -> usize
    where
        B: Backend + 'static,
        E: RenderEngine,
    {
        let Some(ref rx) = self.action_rx else {
            return 0;
        };
        let mut dispatched = 0;
        while let Ok(action) = rx.try_recv() {
            log::debug!("ui action: {action:?}");
            widget.dispatch(action.into());
            dispatched += 1;
        }
        dispatched
    }

    /// Push the widget's HTML if it differs from what the page shows.
    pub(crate) fn push_if_changed<B, E>(&mut self, widget: &Widget<B, E>)
    where
        B: Backend + 'static,
        E: RenderEngine,
    {
        let Some(ref wv) = self.webview else {
            return;
        };
        let html = widget.view().to_html();
        if html != self.last_html {
            webview::push_view(wv, &html);
            self.last_html = html;
        }
    }
}
