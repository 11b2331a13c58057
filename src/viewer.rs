//! Standalone browser window backed by winit, with the widget shown in a
//! wry webview.
//!
//! ```no_run
//! # use structview::Viewer;
//! Viewer::builder()
//!     .with_gene("1007446")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    engine::SceneEngine, error::StructviewError, gui::panel::WidgetPanel,
    options::Options, service::HttpBackend, state::Props, widget::Widget,
};

/// Default gene lookup service.
pub const DEFAULT_SERVICE_URL: &str = "https://www.flymine.org/flymine";

/// How often completions and page interactions are polled while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    gene_id: String,
    service_url: String,
    options: Option<Options>,
    testing: bool,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            gene_id: String::new(),
            service_url: DEFAULT_SERVICE_URL.into(),
            options: None,
            testing: false,
            title: "structview".into(),
        }
    }

    /// Set the gene to resolve.
    #[must_use]
    pub fn with_gene(mut self, gene_id: impl Into<String>) -> Self {
        self.gene_id = gene_id.into();
        self
    }

    /// Override the gene lookup service root.
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Run without touching the network.
    #[must_use]
    pub fn with_testing(mut self, testing: bool) -> Self {
        self.testing = testing;
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            props: Props {
                gene_id: self.gene_id,
                service_url: self.service_url,
                testing: self.testing,
            },
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window browsing the structures of one gene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    props: Props,
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    pub fn run(self) -> Result<(), StructviewError> {
        #[cfg(target_os = "linux")]
        gtk::init().map_err(|e| StructviewError::Viewer(e.to_string()))?;

        let event_loop = EventLoop::new()
            .map_err(|e| StructviewError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let backend = Arc::new(HttpBackend::new(self.options.endpoints.clone()));
        let widget =
            Widget::new(self.props, backend, SceneEngine::new(), self.options);

        let mut app = ViewerApp {
            window: None,
            widget,
            panel: WidgetPanel::new(),
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| StructviewError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Window>,
    widget: Widget<HttpBackend, SceneEngine>,
    panel: WidgetPanel,
    title: String,
}

impl ViewerApp {
    /// Apply pending completions and interactions, then refresh the page.
    fn sync(&mut self) {
        let completions = self.widget.pump();
        let interactions = self.panel.drain_and_apply(&mut self.widget);
        if completions + interactions > 0 {
            log::debug!(
                "applied {completions} completions, {interactions} interactions"
            );
        }
        self.panel.push_if_changed(&self.widget);
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.6) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.6) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.panel.init_webview(&window);
        self.widget.mount();
        self.panel.push_if_changed(&self.widget);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.panel.apply_layout(window);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        #[cfg(target_os = "linux")]
        while gtk::events_pending() {
            let _ = gtk::main_iteration_do(false);
        }

        self.sync();
        event_loop.set_control_flow(ControlFlow::WaitUntil(
            Instant::now() + POLL_INTERVAL,
        ));
    }
}
