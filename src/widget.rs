//! Widget runtime: runs reducer effects and feeds completions back.
//!
//! The [`Widget`] is owned by a single thread. Remote lookups run on named
//! background threads that report back through an mpsc channel as
//! [`Action`]s; the owner drains that channel with [`Widget::pump`] (or
//! blocks on it with [`Widget::settle`]). Scene teardown and presentation
//! touch the engine and therefore run synchronously on the owner thread.

use std::collections::VecDeque;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::RenderEngine;
use crate::error::StructviewError;
use crate::options::Options;
use crate::service::Backend;
use crate::state::{Action, Effect, Props, ViewState};
use crate::view::ViewModel;
use crate::{detail, loader, resolver};

/// A mounted structure browser.
pub struct Widget<B, E> {
    state: ViewState,
    engine: E,
    backend: Arc<B>,
    options: Options,
    tx: mpsc::Sender<Action>,
    rx: mpsc::Receiver<Action>,
    in_flight: usize,
}

impl<B: Backend + 'static, E: RenderEngine> Widget<B, E> {
    /// Create an unmounted widget. The initial render mode comes from
    /// `options.viewer`.
    #[must_use]
    pub fn new(props: Props, backend: Arc<B>, engine: E, options: Options) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: ViewState::new(props, options.viewer.render_mode),
            engine,
            backend,
            options,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Attach the widget; starts resolution unless in testing mode.
    pub fn mount(&mut self) {
        self.dispatch(Action::Mount);
    }

    /// Reduce `action` and run every effect it produces, including
    /// synchronous follow-ups.
    pub fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let transition = self.state.reduce(action);
            self.state = transition.state;
            for effect in transition.effects {
                if let Some(next) = self.run(effect) {
                    queue.push_back(next);
                }
            }
        }
    }

    /// Apply every completion that has arrived. Returns how many were
    /// applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Block until no request is in flight or `timeout` elapses. Returns
    /// `true` when the widget went idle.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(action) => {
                    self.in_flight -= 1;
                    self.dispatch(action);
                }
                Err(_) => return false,
            }
        }
        true
    }

    /// Number of background requests not yet applied.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Current view state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Engine owning the scene.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Widget options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// View model of the current state, with the engine's scene drawn
    /// into the viewer pane.
    #[must_use]
    pub fn view(&self) -> ViewModel {
        let mut model = ViewModel::from_state(&self.state, &self.options.endpoints);
        if let Some(scene) = self.engine.scene() {
            model.attach_scene(scene);
        }
        model
    }

    fn run(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::Resolve {
                gene_id,
                service_url,
            } => {
                let backend = Arc::clone(&self.backend);
                self.spawn("structview-resolve", move || {
                    match resolver::resolve(backend.as_ref(), &gene_id, &service_url) {
                        Ok(ids) => Action::ResolveSucceeded(ids),
                        Err(e) => {
                            log::error!("resolve failed for {gene_id}: {e}");
                            Action::ResolveFailed(e.user_message())
                        }
                    }
                })
                .err()
                .map(|e| Action::ResolveFailed(e.user_message()))
            }
            Effect::TeardownScene => {
                self.engine.teardown();
                None
            }
            Effect::LoadStructure { ticket, id, .. } => {
                let backend = Arc::clone(&self.backend);
                self.spawn("structview-load", move || Action::StructureDownloaded {
                    ticket,
                    result: loader::download(backend.as_ref(), &id)
                        .map_err(|e| e.to_string()),
                })
                .err()
                .map(|e| Action::StructureDownloaded {
                    ticket,
                    result: Err(e.to_string()),
                })
            }
            Effect::PresentStructure {
                ticket,
                id,
                mode,
                payload,
            } => {
                let result = loader::present(
                    &mut self.engine,
                    &id,
                    &payload,
                    mode,
                    &self.options.viewer,
                )
                .map_err(|e| e.to_string());
                Some(Action::LoadFinished { ticket, result })
            }
            Effect::FetchDetail { ticket, id } => {
                let backend = Arc::clone(&self.backend);
                self.spawn("structview-detail", move || Action::DetailFetched {
                    ticket,
                    result: detail::fetch_title(backend.as_ref(), &id)
                        .map_err(|e| e.to_string()),
                })
                .err()
                .map(|e| Action::DetailFetched {
                    ticket,
                    result: Err(e.to_string()),
                })
            }
        }
    }

    fn spawn(
        &mut self,
        name: &str,
        job: impl FnOnce() -> Action + Send + 'static,
    ) -> Result<(), StructviewError> {
        let tx = self.tx.clone();
        let _handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                // The receiver is gone once the widget is dropped.
                let _ = tx.send(job());
            })
            .map_err(StructviewError::ThreadSpawn)?;
        self.in_flight += 1;
        Ok(())
    }
}
