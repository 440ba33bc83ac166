//! Engine cache and active-page bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{Error, Result};

use super::{BrowserEngine, BrowserLauncher, BrowserPage, EngineKind};

#[derive(Default)]
struct SessionState {
    engines: HashMap<EngineKind, Arc<dyn BrowserEngine>>,
    page: Option<Arc<dyn BrowserPage>>,
    current: EngineKind,
}

/// Holds at most one engine per kind and at most one active page.
pub struct SessionController {
    launcher: Arc<dyn BrowserLauncher>,
    state: Mutex<SessionState>,
}

impl SessionController {
    /// Create an empty controller.
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Cached engine of `kind`, launching it on first use.
    pub async fn engine(&self, kind: EngineKind) -> Result<Arc<dyn BrowserEngine>> {
        let mut state = self.state.lock().await;
        Self::engine_locked(&self.launcher, &mut state, kind).await
    }

    async fn engine_locked(
        launcher: &Arc<dyn BrowserLauncher>,
        state: &mut SessionState,
        kind: EngineKind,
    ) -> Result<Arc<dyn BrowserEngine>> {
        if let Some(engine) = state.engines.get(&kind) {
            tracing::debug!(engine = %kind, "reusing browser engine");
            return Ok(Arc::clone(engine));
        }

        let engine = launcher.launch(kind).await?;
        tracing::info!(engine = %kind, "launched browser engine");
        state.engines.insert(kind, Arc::clone(&engine));
        Ok(engine)
    }

    /// Replace the active page with a fresh one on an engine of `kind`.
    pub async fn open_page(&self, kind: EngineKind) -> Result<Arc<dyn BrowserPage>> {
        let mut state = self.state.lock().await;
        let engine = Self::engine_locked(&self.launcher, &mut state, kind).await?;

        if let Some(previous) = state.page.take() {
            if let Err(e) = previous.close().await {
                tracing::warn!(error = %e, "failed to close previous page");
            }
        }

        let page: Arc<dyn BrowserPage> = Arc::from(engine.new_page().await?);
        state.page = Some(Arc::clone(&page));
        state.current = kind;
        Ok(page)
    }

    /// The active page.
    pub async fn page(&self) -> Result<Arc<dyn BrowserPage>> {
        self.state
            .lock()
            .await
            .page
            .as_ref()
            .map(Arc::clone)
            .ok_or(Error::NoActivePage)
    }

    /// Engine kind of the most recent navigation.
    pub async fn current_engine(&self) -> EngineKind {
        self.state.lock().await.current
    }

    /// Whether an engine of `kind` is cached.
    pub async fn is_running(&self, kind: EngineKind) -> bool {
        self.state.lock().await.engines.contains_key(&kind)
    }

    /// Whether a page is active.
    pub async fn has_page(&self) -> bool {
        self.state.lock().await.page.is_some()
    }

    /// Close the engine of `kind`. A no-op when none is cached.
    ///
    /// Clears the active page when it belongs to `kind`.
    pub async fn close_engine(&self, kind: EngineKind) -> Result<()> {
        let engine = {
            let mut state = self.state.lock().await;
            if state.current == kind {
                state.page = None;
            }
            state.engines.remove(&kind)
        };

        if let Some(engine) = engine {
            engine.close().await?;
            tracing::info!(engine = %kind, "closed browser engine");
        }
        Ok(())
    }

    /// Close every cached engine and forget the active page.
    ///
    /// Keeps going past individual failures; returns the first one.
    pub async fn close_all(&self) -> Result<()> {
        let engines: Vec<_> = {
            let mut state = self.state.lock().await;
            state.page = None;
            state.engines.drain().collect()
        };

        let mut first_error = None;
        for (kind, engine) in engines {
            match engine.close().await {
                Ok(()) => tracing::info!(engine = %kind, "closed browser engine"),
                Err(e) => {
                    tracing::warn!(engine = %kind, error = %e, "failed to close browser engine");
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
