//! What the widget shows for a given [`ViewState`].
//!
//! [`ViewModel::from_state`] is a pure projection of the state; it decides
//! which panes exist and what they say. [`ViewModel::to_html`] turns the
//! model into the HTML fragment the webview displays. Interactive controls
//! carry `data-action` attributes that the webview bridge translates back
//! into [`Action`](crate::state::Action)s.

use std::fmt::Write;

use crate::engine::{draw, Scene, SceneSummary};
use crate::options::{EndpointOptions, RenderMode};
use crate::state::ViewState;

/// Text shown while candidates are being resolved.
pub const RESOLVING_TEXT: &str = "Fetching associated PDB ids";
/// Text shown while a structure is being downloaded.
pub const VISUALIZER_LOADING_TEXT: &str = "Initialising Visualizer...";
/// Text shown when the search matches nothing.
pub const NO_RESULTS_TEXT: &str = "No search results!";
/// Label of the structure page link.
pub const PAGE_LINK_TEXT: &str = "open RCSB page";
/// Placeholder of the search input.
pub const SEARCH_PLACEHOLDER: &str = "Search and Select a PDB ID";
/// Prefix of the viewer caption naming the structure on the surface.
pub const SHOWING_TEXT: &str = "Showing";

/// Size of the scene drawing in the viewer pane, in pixels.
const DRAWING_SIZE: (u32, u32) = (640, 480);

/// Top-level rendering of the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewModel {
    /// Resolution failed; only the message is shown.
    Error(String),
    /// Candidates are not resolved yet.
    Loading(String),
    /// The browser with viewer, controls and list.
    Browser(BrowserView),
}

/// The browser layout.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserView {
    /// Structure viewer pane.
    pub viewer: ViewerPane,
    /// Identifier of the structure the viewer belongs to. It can differ
    /// from the selected entry after a search.
    pub showing: Option<String>,
    /// Render-mode selector entries, in display order.
    pub modes: Vec<ModeOption>,
    /// Search input text.
    pub search: String,
    /// Candidate list.
    pub list: ListPane,
}

/// Structure viewer pane.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerPane {
    /// Download or build in flight.
    Loading(String),
    /// The structure could not be loaded; retry offered.
    Failed(String),
    /// A scene is on the surface.
    Scene {
        /// Digest of the scene.
        summary: SceneSummary,
        /// SVG drawing of the scene, once attached.
        drawing: Option<String>,
    },
    /// Nothing selected.
    Empty,
}

/// One entry of the render-mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeOption {
    /// Mode offered.
    pub mode: RenderMode,
    /// Whether it is the current mode.
    pub selected: bool,
}

/// Candidate list pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPane {
    /// The search filter matched nothing.
    NoResults,
    /// Filtered candidates.
    Entries(Vec<Entry>),
}

/// One candidate in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position in the filtered list.
    pub index: usize,
    /// Structure identifier.
    pub id: String,
    /// Details, present only on the selected entry.
    pub details: Option<Details>,
}

/// Details panel of the selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Details {
    /// Title fetch in flight.
    Loading,
    /// Title fetch failed; retry offered.
    Failed(String),
    /// Title and link to the structure page.
    Ready {
        /// Deposited title.
        title: String,
        /// Structure page URL.
        link: String,
    },
}

impl ViewModel {
    /// Project `state` into a view model.
    #[must_use]
    pub fn from_state(state: &ViewState, endpoints: &EndpointOptions) -> Self {
        if let Some(message) = state.error() {
            return Self::Error(message.to_owned());
        }
        if state.candidates().is_none() {
            return Self::Loading(RESOLVING_TEXT.to_owned());
        }

        let structure = state.structure();
        let viewer = if !structure.ready {
            ViewerPane::Loading(VISUALIZER_LOADING_TEXT.to_owned())
        } else if let Some(message) = &structure.error {
            ViewerPane::Failed(message.clone())
        } else if let Some(summary) = &structure.summary {
            ViewerPane::Scene {
                summary: summary.clone(),
                drawing: None,
            }
        } else if structure.id.is_some() {
            // Downloaded; the scene is being built.
            ViewerPane::Loading(VISUALIZER_LOADING_TEXT.to_owned())
        } else {
            ViewerPane::Empty
        };

        let modes = RenderMode::ALL
            .iter()
            .map(|&mode| ModeOption {
                mode,
                selected: mode == state.mode(),
            })
            .collect();

        let list = if state.filtered().is_empty() {
            ListPane::NoResults
        } else {
            ListPane::Entries(
                state
                    .filtered()
                    .iter()
                    .enumerate()
                    .map(|(index, id)| Entry {
                        index,
                        id: id.clone(),
                        details: (state.selected() == Some(index))
                            .then(|| details(state, id, endpoints)),
                    })
                    .collect(),
            )
        };

        Self::Browser(BrowserView {
            viewer,
            showing: structure.id.clone(),
            modes,
            search: state.search().to_owned(),
            list,
        })
    }

    /// Attach the drawing of `scene` if it is the scene the viewer pane
    /// describes.
    pub fn attach_scene(&mut self, scene: &Scene) {
        let Self::Browser(BrowserView {
            viewer: ViewerPane::Scene { summary, drawing },
            ..
        }) = self
        else {
            return;
        };
        if summary.id == scene.id && summary.mode == scene.mode {
            let (width, height) = DRAWING_SIZE;
            *drawing = Some(draw::to_svg(scene, width, height));
        }
    }

    /// Render the model as an HTML fragment.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Error(message) => {
                let _ = write!(
                    out,
                    r#"<div class="viz-container error">{}</div>"#,
                    escape(message)
                );
            }
            Self::Loading(text) => {
                out.push_str(r#"<div class="rootContainer">"#);
                loading(&mut out, text);
                out.push_str("</div>");
            }
            Self::Browser(browser) => browser.write_html(&mut out),
        }
        out
    }
}

fn details(state: &ViewState, id: &str, endpoints: &EndpointOptions) -> Details {
    let info = state.detail();
    if info.loading {
        Details::Loading
    } else if let Some(message) = &info.error {
        Details::Failed(message.clone())
    } else {
        Details::Ready {
            title: info.title.clone(),
            link: endpoints.structure_page_url(id),
        }
    }
}

impl BrowserView {
    fn write_html(&self, out: &mut String) {
        out.push_str(r#"<div class="rootContainer">"#);

        out.push_str(r#"<div class="viz-container">"#);
        if let Some(id) = &self.showing {
            let _ = write!(
                out,
                r#"<div class="viewer-caption">{SHOWING_TEXT} {}</div>"#,
                escape(id)
            );
        }
        match &self.viewer {
            ViewerPane::Loading(text) => loading(out, text),
            ViewerPane::Failed(message) => {
                let _ = write!(
                    out,
                    r#"<div class="error">{}</div><button data-action="retry-structure">Retry</button>"#,
                    escape(message)
                );
            }
            ViewerPane::Scene { summary, drawing } => {
                if let Some(svg) = drawing {
                    out.push_str(svg);
                }
                let _ = write!(
                    out,
                    r#"<div class="scene" data-id="{}" data-mode="{}">{} atoms, {} chains, {} copies</div>"#,
                    escape(&summary.id),
                    summary.mode,
                    summary.atoms,
                    summary.chains,
                    summary.copies,
                );
            }
            ViewerPane::Empty => {}
        }
        out.push_str("</div>");

        out.push_str(r#"<div class="select-box">"#);
        out.push_str(r#"<span class="heading">Select Viewer Mode</span>"#);
        out.push_str(r#"<select class="viewer-select" data-action="mode">"#);
        for option in &self.modes {
            let _ = write!(
                out,
                r#"<option value="{0}"{1}>{0}</option>"#,
                option.mode,
                if option.selected { " selected" } else { "" }
            );
        }
        out.push_str("</select>");
        let _ = write!(
            out,
            r#"<input class="heading" data-action="search" placeholder="{SEARCH_PLACEHOLDER}" value="{}">"#,
            escape(&self.search)
        );

        out.push_str(r#"<div class="list">"#);
        match &self.list {
            ListPane::NoResults => out.push_str(NO_RESULTS_TEXT),
            ListPane::Entries(entries) => {
                for entry in entries {
                    entry.write_html(out);
                }
            }
        }
        out.push_str("</div></div></div>");
    }
}

impl Entry {
    fn write_html(&self, out: &mut String) {
        let class = if self.details.is_some() {
            "option selected"
        } else {
            "option"
        };
        let _ = write!(
            out,
            r#"<div><div class="{class}" data-action="select" data-index="{}">{}</div>"#,
            self.index,
            escape(&self.id)
        );
        if let Some(details) = &self.details {
            out.push_str(r#"<div class="details-panel">"#);
            match details {
                Details::Loading => loading(out, ""),
                Details::Failed(message) => {
                    let _ = write!(
                        out,
                        r#"<div class="error">{}</div><button data-action="retry-detail">Retry</button>"#,
                        escape(message)
                    );
                }
                Details::Ready { title, link } => {
                    let _ = write!(
                        out,
                        r#"<h3>{}</h3><a href="{}" rel="noopener noreferrer" target="_blank" class="title-text">{PAGE_LINK_TEXT}</a>"#,
                        escape(title),
                        escape(link)
                    );
                }
            }
            out.push_str("</div>");
        }
        out.push_str("</div>");
    }
}

fn loading(out: &mut String, text: &str) {
    let _ = write!(
        out,
        r#"<div class="loading"><div class="spinner"></div>{}</div>"#,
        escape(text)
    );
}

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Action, Effect, Props};

    fn mounted() -> ViewState {
        ViewState::new(
            Props {
                gene_id: "G1".into(),
                service_url: "https://mine.example".into(),
                testing: false,
            },
            RenderMode::Cartoon,
        )
        .reduce(Action::Mount)
        .state
    }

    fn detail_ticket(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::FetchDetail { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap()
    }

    fn browser(model: ViewModel) -> BrowserView {
        match model {
            ViewModel::Browser(b) => b,
            other => panic!("expected browser, got {other:?}"),
        }
    }

    #[test]
    fn error_renders_only_the_message() {
        let state = mounted().reduce(Action::ResolveFailed("<gone>".into())).state;
        let model = ViewModel::from_state(&state, &EndpointOptions::default());
        assert_eq!(model, ViewModel::Error("<gone>".into()));
        assert_eq!(
            model.to_html(),
            r#"<div class="viz-container error">&lt;gone&gt;</div>"#
        );
    }

    #[test]
    fn unresolved_shows_fetching_text() {
        let model = ViewModel::from_state(&mounted(), &EndpointOptions::default());
        assert_eq!(model, ViewModel::Loading(RESOLVING_TEXT.into()));
        assert!(model.to_html().contains(RESOLVING_TEXT));
    }

    #[test]
    fn browser_lists_entries_with_selected_details() {
        let t = mounted().reduce(Action::ResolveSucceeded(vec![
            "1ABC".into(),
            "2XYZ".into(),
        ]));
        let ticket = detail_ticket(&t.effects);
        let state = t
            .state
            .reduce(Action::DetailFetched {
                ticket,
                result: Ok("Kinase & friends".into()),
            })
            .state;
        let view = browser(ViewModel::from_state(&state, &EndpointOptions::default()));

        assert_eq!(
            view.viewer,
            ViewerPane::Loading(VISUALIZER_LOADING_TEXT.into())
        );
        assert_eq!(view.modes.len(), 7);
        assert_eq!(
            view.modes.iter().filter(|m| m.selected).count(),
            1
        );
        let ListPane::Entries(entries) = &view.list else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].details,
            Some(Details::Ready {
                title: "Kinase & friends".into(),
                link: "https://www.rcsb.org/structure/1ABC".into(),
            })
        );
        assert!(entries[1].details.is_none());

        let html = ViewModel::Browser(view).to_html();
        assert!(html.contains(r#"<option value="cartoon" selected>cartoon</option>"#));
        assert!(html.contains(r#"class="option selected" data-action="select" data-index="0">1ABC<"#));
        assert!(html.contains("<h3>Kinase &amp; friends</h3>"));
        assert!(html.contains(PAGE_LINK_TEXT));
        assert!(html.contains(VISUALIZER_LOADING_TEXT));
    }

    #[test]
    fn empty_filter_shows_no_results() {
        let state = mounted()
            .reduce(Action::ResolveSucceeded(vec!["1ABC".into()]))
            .state
            .reduce(Action::Search("zz\"".into()))
            .state;
        let model = ViewModel::from_state(&state, &EndpointOptions::default());
        let html = model.to_html();
        assert!(html.contains(NO_RESULTS_TEXT));
        assert!(html.contains(r#"value="zz&quot;""#));
        assert_eq!(browser(model).list, ListPane::NoResults);
    }

    #[test]
    fn empty_resolution_leaves_viewer_empty() {
        let state = mounted().reduce(Action::ResolveSucceeded(Vec::new())).state;
        let view = browser(ViewModel::from_state(&state, &EndpointOptions::default()));
        assert_eq!(view.viewer, ViewerPane::Empty);
        assert_eq!(view.list, ListPane::NoResults);
    }

    #[test]
    fn failures_offer_retry_controls() {
        let t = mounted().reduce(Action::ResolveSucceeded(vec!["1ABC".into()]));
        let load = t
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::LoadStructure { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap();
        let detail = detail_ticket(&t.effects);
        let state = t
            .state
            .reduce(Action::StructureDownloaded {
                ticket: load,
                result: Err("download failed".into()),
            })
            .state
            .reduce(Action::DetailFetched {
                ticket: detail,
                result: Err("no title".into()),
            })
            .state;
        let html = ViewModel::from_state(&state, &EndpointOptions::default()).to_html();
        assert!(html.contains(r#"data-action="retry-structure""#));
        assert!(html.contains(r#"data-action="retry-detail""#));
        assert!(html.contains("download failed"));
    }

    #[test]
    fn viewer_caption_names_the_shown_structure() {
        let state = mounted()
            .reduce(Action::ResolveSucceeded(vec!["1ABC".into(), "2XYZ".into()]))
            .state
            .reduce(Action::Search("xyz".into()))
            .state;
        let view = browser(ViewModel::from_state(&state, &EndpointOptions::default()));
        assert_eq!(view.showing.as_deref(), Some("1ABC"));
        let ListPane::Entries(entries) = &view.list else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].id, "2XYZ");
        assert!(entries[0].details.is_some());

        let html = ViewModel::Browser(view).to_html();
        assert!(html.contains(r#"<div class="viewer-caption">Showing 1ABC</div>"#));
    }

    #[test]
    fn attached_scene_is_drawn_in_the_viewer() {
        use crate::engine::structure::Structure;
        use crate::engine::tests::tiny_pdb;
        use crate::options::ViewerOptions;

        let structure = Structure::parse(&tiny_pdb()).unwrap();
        let scene = Scene::build(
            "1ABC",
            &structure,
            RenderMode::Spheres,
            &ViewerOptions::default(),
        );
        let mut model = ViewModel::Browser(BrowserView {
            viewer: ViewerPane::Scene {
                summary: scene.summary(),
                drawing: None,
            },
            showing: Some("1ABC".into()),
            modes: Vec::new(),
            search: String::new(),
            list: ListPane::NoResults,
        });

        let other = Scene::build(
            "1ABC",
            &structure,
            RenderMode::Trace,
            &ViewerOptions::default(),
        );
        model.attach_scene(&other);
        assert!(!model.to_html().contains("<svg"));

        model.attach_scene(&scene);
        let html = model.to_html();
        assert!(html.contains(r#"<svg xmlns="http://www.w3.org/2000/svg" class="scene-drawing""#));
        assert_eq!(html.matches("<circle ").count(), 24);
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
