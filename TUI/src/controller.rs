//! Layer selection and checklist generation.
//!
//! The controller owns the only mutable state in the application. Each transition
//! replaces the published [`ControllerState`] snapshot, and observers receive it
//! through a `watch` channel.
//!
//! Results are written back when a request settles regardless of what happened to
//! the selection in the meantime, unless [`ControllerOptions::discard_stale_results`]
//! is set. Requests are never cancelled and have no timeout of their own.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::{ChecklistGenerator, GenerationError};
use crate::catalog::{DefenseLayer, LayerCatalog};

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Snapshot of the controller's observable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    pub selected_layer: Option<Arc<DefenseLayer>>,
    pub generated_checklist: Option<Vec<String>>,
    pub is_loading: bool,
    pub error: Option<String>,
    // Advances on every selection change and every started request.
    epoch: u64,
    // Epoch of the most recently started request.
    request_epoch: u64,
}

impl ControllerState {
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_layer.as_ref().map(|l| l.id.as_str())
    }

    pub fn checklist(&self) -> &[String] {
        self.generated_checklist.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    /// Drop a result if the selection changed or a newer request started
    /// while it was in flight.
    pub discard_stale_results: bool,
}

pub struct Controller {
    catalog: Arc<LayerCatalog>,
    generator: Arc<dyn ChecklistGenerator>,
    options: ControllerOptions,
    state: watch::Sender<ControllerState>,
}

impl Controller {
    pub fn new(catalog: Arc<LayerCatalog>, generator: Arc<dyn ChecklistGenerator>) -> Self {
        Self::with_options(catalog, generator, ControllerOptions::default())
    }

    pub fn with_options(
        catalog: Arc<LayerCatalog>,
        generator: Arc<dyn ChecklistGenerator>,
        options: ControllerOptions,
    ) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            catalog,
            generator,
            options,
            state,
        }
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Change the selection. Selecting the already-selected id (or clearing an
    /// empty selection) changes nothing and publishes nothing.
    pub fn select_layer(&self, layer: Option<Arc<DefenseLayer>>) {
        self.state.send_if_modified(|state| {
            let next_id = layer.as_ref().map(|l| l.id.as_str());
            if state.selected_id() == next_id {
                return false;
            }

            debug!(from = ?state.selected_id(), to = ?next_id, "selection changed");
            state.selected_layer = layer;
            state.generated_checklist = None;
            state.error = None;
            state.epoch += 1;
            true
        });
    }

    /// Resolve `id` in the catalog and select it. An unknown id clears the
    /// selection. Returns whether the id was found.
    pub fn select_by_id(&self, id: &str) -> bool {
        let layer = self.catalog.lookup(id);
        let found = layer.is_some();
        if !found {
            debug!(id, "layer not found");
        }
        self.select_layer(layer);
        found
    }

    /// Generate a checklist for the selected layer. Does nothing without a
    /// selection. Never fails: every outcome ends in a state write.
    pub async fn generate_checklist(&self) {
        let mut request = None;
        self.state.send_if_modified(|state| {
            let Some(layer) = state.selected_layer.clone() else {
                return false;
            };
            state.is_loading = true;
            state.error = None;
            state.generated_checklist = None;
            state.epoch += 1;
            state.request_epoch = state.epoch;
            request = Some((layer, state.epoch));
            true
        });

        let Some((layer, epoch)) = request else {
            debug!("generate requested with nothing selected");
            return;
        };

        info!(layer = %layer.id, "requesting security checklist");
        let result = self
            .generator
            .generate_checklist(&layer.name, &layer.description)
            .await;
        self.settle(&layer, epoch, result);
    }

    fn settle(
        &self,
        layer: &DefenseLayer,
        epoch: u64,
        result: Result<Vec<String>, GenerationError>,
    ) {
        let discard_stale = self.options.discard_stale_results;
        self.state.send_if_modified(|state| {
            if discard_stale && state.epoch != epoch {
                debug!(layer = %layer.id, "discarding stale checklist result");
                // A newer request owns the loading flag.
                if state.request_epoch != epoch || !state.is_loading {
                    return false;
                }
                state.is_loading = false;
                return true;
            }

            match &result {
                Ok(items) => {
                    info!(layer = %layer.id, items = items.len(), "checklist generated");
                    state.generated_checklist = Some(items.clone());
                    state.error = None;
                }
                Err(e) => {
                    warn!(layer = %layer.id, error = %e, "checklist generation failed");
                    let message = if e.message().trim().is_empty() {
                        UNKNOWN_ERROR_MESSAGE.to_string()
                    } else {
                        e.message().to_string()
                    };
                    state.error = Some(message);
                    state.generated_checklist = None;
                }
            }
            state.is_loading = false;
            true
        });
    }
}
