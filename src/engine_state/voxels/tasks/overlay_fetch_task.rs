//! # Overlay Fetch Task
//!
//! Resolves the configured address and downloads the footprints around it through the
//! shared overlay provider, off the main thread.

use log::{info, warn};

use crate::{
    core::MtResource,
    engine_state::{
        overlay::{fetch_overlay, OverlayData, OverlayError, OverlayProvider},
        task_management::task::{Task, TaskContext, TaskResult},
    },
};

/// Shared handle to the provider; its cache lives as long as the engine.
pub type SharedOverlayProvider = MtResource<Box<dyn OverlayProvider>>;

/// A task that fetches overlay data for one request.
pub struct OverlayFetchTask {
    /// Id handed out by the orchestrator; results of older ids are dropped
    request_id: u64,
    provider: SharedOverlayProvider,
    address: String,
    radius_metres: f64,
}

impl OverlayFetchTask {
    pub fn new(
        request_id: u64,
        provider: SharedOverlayProvider,
        address: String,
        radius_metres: f64,
    ) -> Self {
        OverlayFetchTask {
            request_id,
            provider,
            address,
            radius_metres,
        }
    }
}

impl Task for OverlayFetchTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let overlay = {
            let mut provider = self.provider.get_mut();
            fetch_overlay(&mut **provider, &self.address, self.radius_metres)
        };

        Box::new(OverlayFetchTaskResult {
            request_id: self.request_id,
            address: self.address.clone(),
            overlay,
        })
    }
}

/// The result of an overlay fetch.
pub struct OverlayFetchTaskResult {
    request_id: u64,
    address: String,
    overlay: Result<OverlayData, OverlayError>,
}

impl TaskResult for OverlayFetchTaskResult {
    /// Hands the overlay to the orchestrator. A failed fetch is recorded as "no overlay"
    /// so generation carries on with plain terrain.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        let overlay = match self.overlay {
            Ok(overlay) => {
                info!(
                    "Overlay for {:?} ready: {} buildings, {} roads",
                    self.address,
                    overlay.buildings.len(),
                    overlay.roads.len()
                );
                Some(overlay)
            }
            Err(e) => {
                warn!("Overlay for {:?} unavailable, using terrain only: {}", self.address, e);
                None
            }
        };
        context.orchestrator.accept_overlay(self.request_id, overlay);
        Vec::new()
    }
}
