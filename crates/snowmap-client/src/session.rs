//! Client session
//!
//! Wires the reconciler, the user's filter selection and the layer deriver
//! together, and re-renders whenever the dataset or the selection changes.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::identity::IdentityGate;
use crate::renderer::{MapRenderer, Viewport};
use snowmap_layers::LayerDeriver;
use snowmap_sync::{HttpRemoteSource, Poller, RemoteSource, SyncFailure, SyncReconciler};
use snowmap_types::{
    Dataset, FilterSelection, GeoPoint, IssueTypeId, LayerDescriptor, SegmentType,
};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// One user session of the map client
pub struct Session {
    config: ClientConfig,
    reconciler: Arc<SyncReconciler>,
    deriver: Arc<LayerDeriver>,
    selection: watch::Sender<FilterSelection>,
    viewport: watch::Sender<Viewport>,
    poller: Mutex<Option<Poller>>,
    render_task: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a session on top of any remote source
    pub fn new(config: ClientConfig, source: Arc<dyn RemoteSource>) -> ClientResult<Self> {
        config.catalog.validate()?;

        let deriver = LayerDeriver::new(config.catalog.clone())
            .with_line_style(config.map.line_style());

        let selection =
            FilterSelection::all(&config.catalog).with_from_days(config.map.from_days);
        let (selection, _) = watch::channel(selection);

        let (viewport, _) = watch::channel(Viewport {
            center: config.map.center,
            zoom: config.map.zoom,
        });

        Ok(Self {
            reconciler: SyncReconciler::new(source),
            deriver: Arc::new(deriver),
            selection,
            viewport,
            poller: Mutex::new(None),
            render_task: Mutex::new(None),
            config,
        })
    }

    /// Create a session talking HTTP to the configured endpoint
    pub fn connect(config: ClientConfig) -> ClientResult<Self> {
        let source = HttpRemoteSource::new(&config.sync.endpoint, config.sync.request_timeout())?;
        Self::new(config, Arc::new(source))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &Arc<SyncReconciler> {
        &self.reconciler
    }

    /// Wait for authentication, load the dataset, then start polling.
    ///
    /// If the first fetch fails the error is recorded and returned, polling
    /// does not start, and `start` may be called again.
    #[instrument(skip_all)]
    pub async fn start(&self, identity: &mut IdentityGate) -> ClientResult<()> {
        let mut poller = self.poller.lock().await;
        if poller.is_some() {
            return Err(ClientError::AlreadyStarted);
        }

        debug!("Waiting for identity");
        identity.wait_ready().await?;

        self.reconciler.initialize().await?;
        *poller = Some(Poller::spawn(self.reconciler.clone(), &self.config.sync));

        info!(
            endpoint = %self.config.sync.endpoint,
            period_secs = self.config.sync.poll_interval_secs,
            "Session started"
        );
        Ok(())
    }

    /// Render now and after every dataset or selection change
    pub async fn attach_renderer(&self, renderer: Arc<dyn MapRenderer>) {
        let task = tokio::spawn(render_loop(
            self.deriver.clone(),
            self.reconciler.subscribe(),
            self.selection.subscribe(),
            renderer,
        ));

        if let Some(previous) = self.render_task.lock().await.replace(task) {
            previous.abort();
        }
    }

    /// Derive the current layers, bottom layer first
    pub fn layers(&self) -> Vec<LayerDescriptor> {
        let dataset = self.reconciler.snapshot();
        let selection = self.selection.borrow().clone();
        self.deriver.derive(&dataset, &selection, chrono::Utc::now())
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        self.reconciler.snapshot()
    }

    /// Last sync failure, for display
    pub fn last_error(&self) -> Option<SyncFailure> {
        self.reconciler.last_error()
    }

    pub fn errors(&self) -> watch::Receiver<Option<SyncFailure>> {
        self.reconciler.errors()
    }

    // ========== Filter selection ==========

    pub fn selection(&self) -> FilterSelection {
        self.selection.borrow().clone()
    }

    pub fn set_segment_type(&self, segment_type: SegmentType, visible: bool) {
        self.selection
            .send_modify(|s| s.set_segment_type(segment_type, visible));
    }

    pub fn set_contribution_type(&self, id: IssueTypeId, visible: bool) {
        self.selection
            .send_modify(|s| s.set_contribution_type(id, visible));
    }

    pub fn set_from_days(&self, days: Option<u32>) {
        self.selection.send_modify(|s| s.set_from_days(days));
    }

    // ========== Viewport ==========

    pub fn viewport(&self) -> Viewport {
        *self.viewport.borrow()
    }

    pub fn watch_viewport(&self) -> watch::Receiver<Viewport> {
        self.viewport.subscribe()
    }

    pub fn on_center_changed(&self, center: GeoPoint) {
        if !center.is_valid() {
            debug!(lng = center.lng, lat = center.lat, "Ignoring invalid map center");
            return;
        }
        self.viewport.send_if_modified(|v| {
            let changed = v.center != center;
            v.center = center;
            changed
        });
    }

    pub fn on_zoom_changed(&self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        self.viewport.send_if_modified(|v| {
            let changed = v.zoom != zoom;
            v.zoom = zoom;
            changed
        });
    }

    /// Stop polling and rendering. A fetch in flight finishes but is dropped.
    pub async fn shutdown(&self) {
        self.reconciler.close();

        if let Some(poller) = self.poller.lock().await.take() {
            poller.shutdown().await;
        }
        if let Some(task) = self.render_task.lock().await.take() {
            task.abort();
        }

        info!("Session shut down");
    }
}

async fn render_loop(
    deriver: Arc<LayerDeriver>,
    mut dataset_rx: watch::Receiver<Arc<Dataset>>,
    mut selection_rx: watch::Receiver<FilterSelection>,
    renderer: Arc<dyn MapRenderer>,
) {
    loop {
        let dataset = dataset_rx.borrow_and_update().clone();
        let selection = selection_rx.borrow_and_update().clone();

        let layers = deriver.derive(&dataset, &selection, chrono::Utc::now());
        renderer.render(&layers);

        tokio::select! {
            changed = dataset_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = selection_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
