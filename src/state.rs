//! Widget view state and its reducer.
//!
//! [`ViewState`] is an immutable record. Every change, whether a user
//! interaction or an asynchronous completion, arrives as an [`Action`] and
//! goes through [`ViewState::reduce`], which returns the next state plus
//! the [`Effect`]s the runtime must perform. Nothing else mutates state.
//!
//! Requests are tagged with a [`Ticket`]: a per-role sequence number
//! (structure loads and detail fetches each have their own). A completion
//! carrying anything but the latest ticket of its role is discarded, so
//! only the most recently issued request can change what is shown.

use crate::engine::SceneSummary;
use crate::options::RenderMode;

/// Sequence number of an asynchronous request.
pub type Ticket = u64;

/// Caller-supplied inputs of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Props {
    /// Gene identifier to resolve.
    pub gene_id: String,
    /// Gene lookup service root.
    pub service_url: String,
    /// Inert mode: never touch the network.
    pub testing: bool,
}

/// State of the structure viewer pane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureView {
    /// False exactly while a download or build is in flight.
    pub ready: bool,
    /// Identifier of the structure being shown or loaded.
    pub id: Option<String>,
    /// Digest of the scene on the surface.
    pub summary: Option<SceneSummary>,
    /// Recoverable load failure.
    pub error: Option<String>,
}

/// Details of the selected structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailInfo {
    /// Deposited title; empty until fetched.
    pub title: String,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Recoverable fetch failure.
    pub error: Option<String>,
}

/// Everything that can happen to the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Widget attached; starts resolution unless inert.
    Mount,
    /// Resolution finished with the ordered candidate list.
    ResolveSucceeded(Vec<String>),
    /// Resolution failed; carries the user-facing message.
    ResolveFailed(String),
    /// User picked entry `index` of the filtered list.
    Select(usize),
    /// User picked a render mode.
    ChangeRenderMode(RenderMode),
    /// User typed into the search box.
    Search(String),
    /// Structure download finished.
    StructureDownloaded {
        /// Ticket of the load request.
        ticket: Ticket,
        /// File text, or the failure message.
        result: Result<String, String>,
    },
    /// Engine finished building the scene.
    LoadFinished {
        /// Ticket of the load request.
        ticket: Ticket,
        /// Scene digest, or the failure message.
        result: Result<SceneSummary, String>,
    },
    /// Detail fetch finished.
    DetailFetched {
        /// Ticket of the detail request.
        ticket: Ticket,
        /// Title, or the failure message.
        result: Result<String, String>,
    },
    /// User asked to reload the selected structure.
    RetryStructure,
    /// User asked to refetch the selected structure's details.
    RetryDetail,
}

/// Work the runtime performs on behalf of the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Resolve candidates for a gene.
    Resolve {
        /// Gene identifier.
        gene_id: String,
        /// Gene lookup service root.
        service_url: String,
    },
    /// Clear the rendered scene synchronously.
    TeardownScene,
    /// Download a structure file.
    LoadStructure {
        /// Request ticket.
        ticket: Ticket,
        /// Structure identifier.
        id: String,
        /// Mode the structure will be rendered in.
        mode: RenderMode,
    },
    /// Tear down and build the scene from a downloaded file.
    PresentStructure {
        /// Request ticket.
        ticket: Ticket,
        /// Structure identifier.
        id: String,
        /// Render mode.
        mode: RenderMode,
        /// File text.
        payload: String,
    },
    /// Fetch the title of a structure.
    FetchDetail {
        /// Request ticket.
        ticket: Ticket,
        /// Structure identifier.
        id: String,
    },
}

/// Result of reducing one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Next state.
    pub state: ViewState,
    /// Effects to run, in order.
    pub effects: Vec<Effect>,
}

/// Immutable widget state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    props: Props,
    candidates: Option<Vec<String>>,
    search: String,
    filtered: Vec<String>,
    selected: Option<usize>,
    mode: RenderMode,
    structure: StructureView,
    detail: DetailInfo,
    error: Option<String>,
    structure_ticket: Ticket,
    detail_ticket: Ticket,
}

impl ViewState {
    /// Initial state before mount.
    #[must_use]
    pub fn new(props: Props, mode: RenderMode) -> Self {
        Self {
            props,
            candidates: None,
            search: String::new(),
            filtered: Vec::new(),
            selected: None,
            mode,
            structure: StructureView::default(),
            detail: DetailInfo::default(),
            error: None,
            structure_ticket: 0,
            detail_ticket: 0,
        }
    }

    /// Widget inputs.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Resolved candidates, `None` until resolution succeeds.
    #[must_use]
    pub fn candidates(&self) -> Option<&[String]> {
        self.candidates.as_deref()
    }

    /// Current search text.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Candidates matching the search text, in candidate order.
    #[must_use]
    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    /// Selected index into [`filtered`](Self::filtered).
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Identifier of the selected entry.
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.filtered.get(i))
            .map(String::as_str)
    }

    /// Current render mode.
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Viewer pane state.
    #[must_use]
    pub fn structure(&self) -> &StructureView {
        &self.structure
    }

    /// Details of the selected entry.
    #[must_use]
    pub fn detail(&self) -> &DetailInfo {
        &self.detail
    }

    /// Terminal error, once resolution has failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reduce `action` into the next state and the effects it requires.
    /// `self` is left untouched.
    #[must_use]
    pub fn reduce(&self, action: Action) -> Transition {
        let mut state = self.clone();
        let effects = state.apply(action);
        Transition { state, effects }
    }

    fn apply(&mut self, action: Action) -> Vec<Effect> {
        if self.error.is_some() {
            return Vec::new();
        }
        let mut effects = Vec::new();
        match action {
            Action::Mount => self.on_mount(&mut effects),
            Action::ResolveSucceeded(ids) => {
                self.on_resolved(ids, &mut effects);
            }
            Action::ResolveFailed(message) => {
                log::error!("resolution failed: {message}");
                self.error = Some(message);
            }
            Action::Select(index) => self.on_select(index, &mut effects),
            Action::ChangeRenderMode(mode) => {
                self.mode = mode;
                self.reload_shown(&mut effects);
            }
            Action::Search(text) => self.on_search(text, &mut effects),
            Action::StructureDownloaded { ticket, result } => {
                self.on_downloaded(ticket, result, &mut effects);
            }
            Action::LoadFinished { ticket, result } => {
                self.on_load_finished(ticket, result);
            }
            Action::DetailFetched { ticket, result } => {
                self.on_detail(ticket, result);
            }
            Action::RetryStructure => self.reload_shown(&mut effects),
            Action::RetryDetail => self.refetch_detail(&mut effects),
        }
        effects
    }

    fn on_mount(&mut self, effects: &mut Vec<Effect>) {
        if self.props.testing || self.candidates.is_some() {
            return;
        }
        self.structure.ready = false;
        effects.push(Effect::Resolve {
            gene_id: self.props.gene_id.clone(),
            service_url: self.props.service_url.clone(),
        });
    }

    fn on_resolved(&mut self, ids: Vec<String>, effects: &mut Vec<Effect>) {
        self.search.clear();
        self.filtered.clone_from(&ids);
        self.candidates = Some(ids);
        self.selected = if self.filtered.is_empty() { None } else { Some(0) };
        if self.selected.is_none() {
            // Nothing to load; the list shows its empty message.
            self.structure = StructureView {
                ready: true,
                ..StructureView::default()
            };
            return;
        }
        self.reload_selected(effects);
        self.refetch_detail(effects);
    }

    fn on_select(&mut self, index: usize, effects: &mut Vec<Effect>) {
        if index >= self.filtered.len() {
            log::warn!(
                "ignoring selection {index} of {} entries",
                self.filtered.len()
            );
            return;
        }
        self.selected = Some(index);
        self.refetch_detail(effects);
        self.reload_selected(effects);
    }

    fn on_search(&mut self, text: String, effects: &mut Vec<Effect>) {
        let Some(candidates) = &self.candidates else {
            return;
        };
        let needle = text.to_lowercase();
        self.filtered = candidates
            .iter()
            .filter(|id| id.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        self.search = text;
        if self.filtered.is_empty() {
            self.selected = None;
            // Invalidate any fetch still in flight for the old selection.
            self.detail_ticket += 1;
            self.detail = DetailInfo::default();
        } else {
            self.selected = Some(0);
            self.refetch_detail(effects);
        }
    }

    fn on_downloaded(
        &mut self,
        ticket: Ticket,
        result: Result<String, String>,
        effects: &mut Vec<Effect>,
    ) {
        if ticket != self.structure_ticket {
            log::debug!("dropping stale download (ticket {ticket})");
            return;
        }
        self.structure.ready = true;
        match result {
            Ok(payload) => {
                let id = self.structure.id.clone().unwrap_or_default();
                effects.push(Effect::PresentStructure {
                    ticket,
                    id,
                    mode: self.mode,
                    payload,
                });
            }
            Err(message) => {
                log::warn!("structure download failed: {message}");
                self.structure.error = Some(message);
            }
        }
    }

    fn on_load_finished(
        &mut self,
        ticket: Ticket,
        result: Result<SceneSummary, String>,
    ) {
        if ticket != self.structure_ticket {
            log::debug!("dropping stale scene (ticket {ticket})");
            return;
        }
        self.structure.ready = true;
        match result {
            Ok(summary) => {
                self.structure.summary = Some(summary);
                self.structure.error = None;
            }
            Err(message) => {
                log::warn!("scene build failed: {message}");
                self.structure.summary = None;
                self.structure.error = Some(message);
            }
        }
    }

    fn on_detail(&mut self, ticket: Ticket, result: Result<String, String>) {
        if ticket != self.detail_ticket {
            log::debug!("dropping stale detail (ticket {ticket})");
            return;
        }
        self.detail.loading = false;
        match result {
            Ok(title) => self.detail.title = title,
            Err(message) => {
                log::warn!("detail fetch failed: {message}");
                self.detail.error = Some(message);
            }
        }
    }

    /// Load the selected entry.
    fn reload_selected(&mut self, effects: &mut Vec<Effect>) {
        if let Some(id) = self.selected_id().map(str::to_owned) {
            self.reload_structure(id, effects);
        }
    }

    /// Reload the structure the viewer is showing. Search moves the
    /// selection without loading, so this may differ from the selection.
    fn reload_shown(&mut self, effects: &mut Vec<Effect>) {
        let shown = self
            .structure
            .id
            .clone()
            .or_else(|| self.selected_id().map(str::to_owned));
        if let Some(id) = shown {
            self.reload_structure(id, effects);
        }
    }

    /// Tear down the scene and issue a fresh load for `id`.
    fn reload_structure(&mut self, id: String, effects: &mut Vec<Effect>) {
        self.structure_ticket += 1;
        self.structure = StructureView {
            ready: false,
            id: Some(id.clone()),
            summary: None,
            error: None,
        };
        effects.push(Effect::TeardownScene);
        effects.push(Effect::LoadStructure {
            ticket: self.structure_ticket,
            id,
            mode: self.mode,
        });
    }

    /// Reset details and issue a fresh fetch for the selection.
    fn refetch_detail(&mut self, effects: &mut Vec<Effect>) {
        let Some(id) = self.selected_id().map(str::to_owned) else {
            return;
        };
        self.detail_ticket += 1;
        self.detail = DetailInfo {
            title: String::new(),
            loading: true,
            error: None,
        };
        effects.push(Effect::FetchDetail {
            ticket: self.detail_ticket,
            id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(testing: bool) -> Props {
        Props {
            gene_id: "G1".into(),
            service_url: "https://mine.example".into(),
            testing,
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    /// Mounted and resolved with `list`; effects discarded.
    fn resolved(list: &[&str]) -> ViewState {
        let state = ViewState::new(props(false), RenderMode::Cartoon)
            .reduce(Action::Mount)
            .state;
        state.reduce(Action::ResolveSucceeded(ids(list))).state
    }

    fn loads(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::LoadStructure { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    fn fetches(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::FetchDetail { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    fn ticket_of(effects: &[Effect], detail: bool) -> Ticket {
        effects
            .iter()
            .find_map(|e| match (e, detail) {
                (Effect::LoadStructure { ticket, .. }, false)
                | (Effect::FetchDetail { ticket, .. }, true) => Some(*ticket),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn mount_requests_resolution() {
        let t = ViewState::new(props(false), RenderMode::Cartoon)
            .reduce(Action::Mount);
        assert_eq!(
            t.effects,
            vec![Effect::Resolve {
                gene_id: "G1".into(),
                service_url: "https://mine.example".into(),
            }]
        );
        assert!(t.state.candidates().is_none());
        assert!(!t.state.structure().ready);
    }

    #[test]
    fn inert_mount_does_nothing() {
        let t = ViewState::new(props(true), RenderMode::Cartoon)
            .reduce(Action::Mount);
        assert!(t.effects.is_empty());
        assert!(t.state.candidates().is_none());
    }

    #[test]
    fn resolve_populates_lists_and_loads_first() {
        let mounted = ViewState::new(props(false), RenderMode::Cartoon)
            .reduce(Action::Mount)
            .state;
        let t = mounted.reduce(Action::ResolveSucceeded(ids(&["1ABC", "2XYZ"])));
        assert_eq!(t.state.candidates(), Some(&ids(&["1ABC", "2XYZ"])[..]));
        assert_eq!(t.state.filtered(), &ids(&["1ABC", "2XYZ"])[..]);
        assert_eq!(t.state.selected(), Some(0));
        assert_eq!(loads(&t.effects), vec!["1ABC"]);
        assert_eq!(fetches(&t.effects), vec!["1ABC"]);
        assert!(t.state.detail().loading);
        assert!(!t.state.structure().ready);
    }

    #[test]
    fn empty_resolution_has_no_selection() {
        let mounted = ViewState::new(props(false), RenderMode::Cartoon)
            .reduce(Action::Mount)
            .state;
        let t = mounted.reduce(Action::ResolveSucceeded(Vec::new()));
        assert!(t.effects.is_empty());
        assert_eq!(t.state.selected(), None);
        assert!(t.state.structure().ready);
    }

    #[test]
    fn resolve_failure_is_terminal() {
        let state = ViewState::new(props(false), RenderMode::Cartoon)
            .reduce(Action::ResolveFailed("boom".into()))
            .state;
        assert_eq!(state.error(), Some("boom"));
        for action in [
            Action::Mount,
            Action::ResolveSucceeded(ids(&["1ABC"])),
            Action::Select(0),
            Action::Search("a".into()),
            Action::RetryStructure,
        ] {
            let t = state.reduce(action);
            assert!(t.effects.is_empty());
            assert_eq!(t.state, state);
        }
    }

    #[test]
    fn select_issues_one_fetch_teardown_and_load() {
        let state = resolved(&["1ABC", "2XYZ"]);
        let t = state.reduce(Action::Select(1));
        assert_eq!(t.state.selected(), Some(1));
        assert_eq!(fetches(&t.effects), vec!["2XYZ"]);
        assert_eq!(loads(&t.effects), vec!["2XYZ"]);
        assert_eq!(
            t.effects
                .iter()
                .filter(|e| **e == Effect::TeardownScene)
                .count(),
            1
        );
        assert!(t.state.detail().loading);
        assert!(t.state.detail().title.is_empty());
        assert!(!t.state.structure().ready);

        // Same shape when repeated; each call issues its own requests.
        let again = t.state.reduce(Action::Select(1));
        assert_eq!(again.state.selected(), Some(1));
        assert_eq!(again.state.filtered(), t.state.filtered());
        assert_eq!(loads(&again.effects), vec!["2XYZ"]);
        assert_eq!(fetches(&again.effects), vec!["2XYZ"]);
    }

    #[test]
    fn out_of_bounds_select_is_ignored() {
        let state = resolved(&["1ABC"]);
        let t = state.reduce(Action::Select(5));
        assert!(t.effects.is_empty());
        assert_eq!(t.state, state);
    }

    #[test]
    fn render_mode_change_reloads_without_touching_lists() {
        let state = resolved(&["1ABC", "2XYZ"]).reduce(Action::Select(1)).state;
        let t = state.reduce(Action::ChangeRenderMode(RenderMode::Spheres));
        assert_eq!(t.state.mode(), RenderMode::Spheres);
        assert_eq!(t.state.candidates(), state.candidates());
        assert_eq!(t.state.filtered(), state.filtered());
        assert_eq!(t.state.selected(), state.selected());
        assert_eq!(t.state.detail(), state.detail());
        assert_eq!(t.effects[0], Effect::TeardownScene);
        assert!(matches!(
            &t.effects[1],
            Effect::LoadStructure { id, mode: RenderMode::Spheres, .. } if id == "2XYZ"
        ));
        assert!(fetches(&t.effects).is_empty());
    }

    #[test]
    fn search_filters_case_insensitively_and_keeps_order() {
        let state = resolved(&["1ABC", "2XYZ", "3XYA", "4abd"]);
        let t = state.reduce(Action::Search("Ab".into()));
        assert_eq!(t.state.filtered(), &ids(&["1ABC", "4abd"])[..]);
        assert_eq!(t.state.selected(), Some(0));
        assert_eq!(fetches(&t.effects), vec!["1ABC"]);
        assert!(loads(&t.effects).is_empty());

        let cleared = t.state.reduce(Action::Search(String::new()));
        assert_eq!(cleared.state.filtered(), state.filtered());
    }

    #[test]
    fn search_with_no_match_clears_selection() {
        let state = resolved(&["1ABC", "2XYZ"]).reduce(Action::Select(1)).state;
        let t = state.reduce(Action::Search("zzz".into()));
        assert!(t.state.filtered().is_empty());
        assert_eq!(t.state.selected(), None);
        assert!(t.effects.is_empty());
        assert!(!t.state.detail().loading);
        // Selecting into an empty list is a no-op.
        assert!(t.state.reduce(Action::Select(0)).effects.is_empty());
    }

    #[test]
    fn search_keeps_the_shown_structure_for_reloads() {
        let state = resolved(&["1ABC", "2XYZ"])
            .reduce(Action::Search("xyz".into()))
            .state;
        assert_eq!(state.selected_id(), Some("2XYZ"));
        assert_eq!(state.structure().id.as_deref(), Some("1ABC"));

        let retry = state.reduce(Action::RetryStructure);
        assert_eq!(loads(&retry.effects), vec!["1ABC"]);
        let mode = state.reduce(Action::ChangeRenderMode(RenderMode::Tube));
        assert_eq!(loads(&mode.effects), vec!["1ABC"]);

        let select = state.reduce(Action::Select(0));
        assert_eq!(loads(&select.effects), vec!["2XYZ"]);
        assert_eq!(select.state.structure().id.as_deref(), Some("2XYZ"));
    }

    #[test]
    fn stale_detail_completion_is_dropped() {
        let state = resolved(&["1ABC", "2XYZ"]);
        let first = state.reduce(Action::Select(0));
        let old = ticket_of(&first.effects, true);
        let second = first.state.reduce(Action::Select(1));
        let new = ticket_of(&second.effects, true);
        assert!(new > old);

        // The newer request completes first, then the older one.
        let s = second
            .state
            .reduce(Action::DetailFetched {
                ticket: new,
                result: Ok("Second".into()),
            })
            .state
            .reduce(Action::DetailFetched {
                ticket: old,
                result: Ok("First".into()),
            })
            .state;
        assert_eq!(s.detail().title, "Second");
        assert!(!s.detail().loading);
    }

    #[test]
    fn stale_download_is_dropped() {
        let state = resolved(&["1ABC", "2XYZ"]);
        let old = state
            .reduce(Action::RetryStructure)
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::LoadStructure { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .unwrap();
        let newer = state.reduce(Action::RetryStructure).state.reduce(Action::Select(1));
        let t = newer.state.reduce(Action::StructureDownloaded {
            ticket: old,
            result: Ok("ATOM".into()),
        });
        assert!(t.effects.is_empty());
        assert!(!t.state.structure().ready);
    }

    #[test]
    fn download_then_build_marks_ready() {
        let t = resolved(&["1ABC"]).reduce(Action::RetryStructure);
        let ticket = ticket_of(&t.effects, false);
        let downloaded = t.state.reduce(Action::StructureDownloaded {
            ticket,
            result: Ok("payload".into()),
        });
        assert!(downloaded.state.structure().ready);
        assert!(matches!(
            &downloaded.effects[..],
            [Effect::PresentStructure { id, payload, .. }] if id == "1ABC" && payload == "payload"
        ));

        let summary = SceneSummary {
            id: "1ABC".into(),
            mode: RenderMode::Cartoon,
            atoms: 10,
            residues: 2,
            chains: 1,
            copies: 1,
            primitives: 1,
            camera_distance: 30.0,
            radius: 8.0,
        };
        let done = downloaded.state.reduce(Action::LoadFinished {
            ticket,
            result: Ok(summary.clone()),
        });
        assert_eq!(done.state.structure().summary, Some(summary));
        assert!(done.state.structure().error.is_none());
    }

    #[test]
    fn load_failure_is_scoped_and_retryable() {
        let t = resolved(&["1ABC"]).reduce(Action::RetryStructure);
        let ticket = ticket_of(&t.effects, false);
        let failed = t
            .state
            .reduce(Action::StructureDownloaded {
                ticket,
                result: Err("404".into()),
            })
            .state;
        assert!(failed.structure().ready);
        assert_eq!(failed.structure().error.as_deref(), Some("404"));
        assert!(failed.error().is_none());

        let retry = failed.reduce(Action::RetryStructure);
        assert_eq!(loads(&retry.effects), vec!["1ABC"]);
        assert!(retry.state.structure().error.is_none());
        assert!(!retry.state.structure().ready);
    }

    #[test]
    fn detail_failure_is_scoped_and_retryable() {
        let t = resolved(&["1ABC"]).reduce(Action::RetryDetail);
        let ticket = ticket_of(&t.effects, true);
        let failed = t
            .state
            .reduce(Action::DetailFetched {
                ticket,
                result: Err("timeout".into()),
            })
            .state;
        assert!(!failed.detail().loading);
        assert_eq!(failed.detail().error.as_deref(), Some("timeout"));

        let retry = failed.reduce(Action::RetryDetail);
        assert_eq!(fetches(&retry.effects), vec!["1ABC"]);
        assert!(retry.state.detail().loading);
    }
}
