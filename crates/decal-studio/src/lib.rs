//! # Decal Studio
//!
//! An asynchronous editing session around a [`decal_canvas::Canvas`].
//!
//! The studio owns everything the engine deliberately leaves out: decoding uploads off the
//! runtime, the content-addressed image store history snapshots point into, the fusion service,
//! exports and user-facing notices. The canvas lives behind an `Arc<Mutex<_>>` and every async
//! flow releases the lock while it waits, so edits, restores and fusion completions can
//! interleave; the engine's generation counter sorts out which completion still applies.

pub mod config;
pub mod error;
pub mod fusion;
pub mod notice;
pub mod restore;
pub mod services;
pub mod store;

use decal_canvas::math::Rect;
use decal_canvas::model::DecalId;
use decal_canvas::render::RenderList;
use decal_canvas::view::CanvasLayout;
use decal_canvas::{
    Canvas, CanvasError, CursorIcon, DecodeError, ImageRef, LogicEvent, PointerEvent,
    RasterImage,
};
use glam::Vec2;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

pub use config::StudioConfig;
pub use error::{FusionError, StudioError};
pub use fusion::{FusionJob, FusionOutcome};
pub use notice::{Notice, NoticeLevel, NoticeLog};
pub use services::{
    BlockingDecoder, DirectoryExportSink, ExportSink, FusionRequest, FusionService, ImageDecoder,
};
pub use store::ImageStore;

/// Builder for a [`DecalStudio`] session.
pub struct DecalStudioBuilder {
    config: StudioConfig,
    layout: Option<CanvasLayout>,
    decoder: Option<Arc<dyn ImageDecoder>>,
    fusion: Option<Arc<dyn FusionService>>,
    export: Option<Arc<dyn ExportSink>>,
}

impl DecalStudioBuilder {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            config,
            layout: None,
            decoder: None,
            fusion: None,
            export: None,
        }
    }

    /// Where the canvas element sits on screen. Defaults to native size at the origin.
    pub fn with_layout(mut self, layout: CanvasLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn ImageDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn with_fusion(mut self, service: Arc<dyn FusionService>) -> Self {
        self.fusion = Some(service);
        self
    }

    pub fn with_export_sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.export = Some(sink);
        self
    }

    /// Decodes the background and starts the session.
    pub async fn build(self, background: &[u8]) -> Result<DecalStudio, StudioError> {
        let decoder = self
            .decoder
            .unwrap_or_else(|| Arc::new(BlockingDecoder) as Arc<dyn ImageDecoder>);
        let export = self.export.unwrap_or_else(|| {
            let sink = DirectoryExportSink::new(self.config.export_dir.clone());
            Arc::new(sink) as Arc<dyn ExportSink>
        });

        let store = ImageStore::new();
        let image = decoder.decode(Arc::from(background)).await?;
        let original = store.check_in(background);

        let layout = self
            .layout
            .unwrap_or_else(|| CanvasLayout::native(image.size()));
        let canvas = Canvas::new(self.config.canvas.clone(), image, layout)?;

        tracing::info!(fusion = self.fusion.is_some(), "Decal studio ready");
        Ok(DecalStudio {
            canvas: Arc::new(Mutex::new(canvas)),
            config: Arc::new(self.config),
            store,
            decoder,
            fusion: self.fusion,
            export,
            notices: NoticeLog::default(),
            navigating: Arc::new(AtomicBool::new(false)),
            original,
        })
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Undo,
    Redo,
}

/// Clears the in-flight flag however the navigation ends.
struct NavigationGuard(Arc<AtomicBool>);

impl Drop for NavigationGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An editing session. Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct DecalStudio {
    /// Handle to the underlying engine.
    pub canvas: Arc<Mutex<Canvas>>,
    config: Arc<StudioConfig>,
    store: ImageStore,
    decoder: Arc<dyn ImageDecoder>,
    fusion: Option<Arc<dyn FusionService>>,
    export: Arc<dyn ExportSink>,
    notices: NoticeLog,
    navigating: Arc<AtomicBool>,
    /// The photo the session was built with.
    original: ImageRef,
}

impl DecalStudio {
    pub fn builder(config: StudioConfig) -> DecalStudioBuilder {
        DecalStudioBuilder::new(config)
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn is_fusion_configured(&self) -> bool {
        self.fusion.is_some()
    }

    /// Drains the pending notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices.take()
    }

    // --- Scene ---

    /// Decodes an upload and places it centered on `drop_point`.
    ///
    /// On a decode failure nothing is placed and an error notice is recorded.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn place_decal(
        &self,
        source_id: &str,
        bytes: &[u8],
        drop_point: Vec2,
    ) -> Result<DecalId, StudioError> {
        let image = match self.decode_upload(bytes).await {
            Ok(image) => image,
            Err(e) => {
                self.notices
                    .error(format!("Could not load decal '{}': {}", source_id, e));
                return Err(e.into());
            }
        };
        self.store.check_in(bytes);

        let mut canvas = self.canvas.lock().await;
        let (id, _) = canvas.place_decal(source_id, image, drop_point)?;
        Ok(id)
    }

    async fn decode_upload(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        let limit = self.config.max_decal_bytes;
        if bytes.len() > limit {
            return Err(DecodeError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
        self.decoder.decode(Arc::from(bytes)).await
    }

    /// Replaces the background and starts over with an empty scene and history.
    #[tracing::instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn reset_scene(&self, bytes: &[u8]) -> Result<(), StudioError> {
        let image = match self.decoder.decode(Arc::from(bytes)).await {
            Ok(image) => image,
            Err(e) => {
                self.notices.error(format!("Could not load image: {}", e));
                return Err(e.into());
            }
        };
        self.store.check_in(bytes);
        self.canvas.lock().await.reset_scene(image)?;
        Ok(())
    }

    /// Starts over from the photo the session was built with, dropping fused results.
    #[tracing::instrument(skip(self))]
    pub async fn reset_to_original(&self) -> Result<(), StudioError> {
        let bytes = self.store.claim(&self.original)?;
        let image = self.decoder.decode(bytes).await?;
        self.canvas.lock().await.reset_scene(image)?;
        self.notices.info("Restored the original photo");
        Ok(())
    }

    pub async fn remove_selected(&self) -> Result<Vec<LogicEvent>, StudioError> {
        Ok(self.canvas.lock().await.remove_selected()?)
    }

    // --- History ---

    /// Steps back one snapshot. Returns false at the start of history.
    pub async fn undo(&self) -> Result<bool, StudioError> {
        self.navigate(Direction::Undo).await
    }

    /// Steps forward one snapshot. Returns false at the end of history.
    pub async fn redo(&self) -> Result<bool, StudioError> {
        self.navigate(Direction::Redo).await
    }

    #[tracing::instrument(skip(self))]
    async fn navigate(&self, direction: Direction) -> Result<bool, StudioError> {
        if self.navigating.swap(true, Ordering::AcqRel) {
            return Err(StudioError::HistoryBusy);
        }
        let _guard = NavigationGuard(self.navigating.clone());

        let result = self.restore(direction).await;
        match &result {
            Err(StudioError::Canvas(CanvasError::StaleRestore(_))) => {
                self.notices
                    .info("History step skipped because the canvas changed meanwhile");
            }
            Err(StudioError::Canvas(CanvasError::Capturing)) => {
                self.notices.info("Finish or cancel the capture first");
            }
            Err(e) => self.notices.error(format!("Could not restore history: {}", e)),
            Ok(_) => {}
        }
        result
    }

    async fn restore(&self, direction: Direction) -> Result<bool, StudioError> {
        let (request, live) = {
            let mut canvas = self.canvas.lock().await;
            let request = match direction {
                Direction::Undo => canvas.begin_undo()?,
                Direction::Redo => canvas.begin_redo()?,
            };
            let Some(request) = request else {
                return Ok(false);
            };
            (request, restore::live_images(canvas.scene()))
        };

        let images =
            restore::load_images(&request, live, &self.store, self.decoder.as_ref()).await?;

        self.canvas.lock().await.finish_restore(request, &images)?;
        Ok(true)
    }

    // --- Fusion ---

    /// Marks the canvas busy and prepares the composite for the fusion service.
    pub async fn begin_fusion(&self) -> Result<FusionJob, StudioError> {
        let composite = {
            let mut canvas = self.canvas.lock().await;
            if !canvas.begin_processing() {
                return Err(StudioError::FusionBusy);
            }
            canvas.clear_selection();
            match canvas.current_composite() {
                Ok(composite) => composite,
                Err(e) => {
                    canvas.end_processing();
                    return Err(e.into());
                }
            }
        };

        let config = self.config.clone();
        let image = composite.image.clone();
        let prepared =
            tokio::task::spawn_blocking(move || fusion::prepare_request(&image, &config)).await;
        let request = match prepared.map_err(StudioError::from).and_then(|r| r) {
            Ok(request) => request,
            Err(e) => {
                self.canvas.lock().await.end_processing();
                return Err(e);
            }
        };

        tracing::info!(
            width = request.width,
            height = request.height,
            bytes = request.data.len(),
            "Fusion request prepared"
        );
        Ok(FusionJob::new(
            composite,
            request,
            self.fusion.clone(),
            self.decoder.clone(),
        ))
    }

    /// Adopts the fused image, or the unmodified composite if fusion produced nothing, and
    /// clears the busy flag.
    pub async fn finish_fusion(&self, outcome: FusionOutcome) -> Result<(), StudioError> {
        let (width, height) = {
            let canvas = self.canvas.lock().await;
            let background = canvas.scene().background();
            (background.width(), background.height())
        };

        let FusionOutcome { composite, result } = outcome;
        let adopted = match result {
            Ok(fused) => {
                let fitted = tokio::task::spawn_blocking(move || {
                    fusion::fit_to_content(fused, width, height)
                })
                .await
                .map_err(StudioError::from)
                .and_then(|r| r);
                match fitted {
                    Ok(encoded) => {
                        self.notices.success("Fusion complete");
                        encoded
                    }
                    Err(e) => {
                        self.notices.error(format!(
                            "Fusion result could not be used ({}); kept the current layout",
                            e
                        ));
                        composite
                    }
                }
            }
            Err(FusionError::NotConfigured) => {
                self.notices
                    .info("Fusion service is not configured; kept the current layout");
                composite
            }
            Err(e) => {
                self.notices
                    .error(format!("Fusion failed ({}); kept the current layout", e));
                composite
            }
        };

        self.store.check_in_encoded(&adopted);
        let mut canvas = self.canvas.lock().await;
        let adopted = canvas.adopt_background(adopted.image);
        canvas.end_processing();
        adopted?;
        Ok(())
    }

    /// Runs a whole fusion request.
    pub async fn fuse(&self) -> Result<(), StudioError> {
        let job = self.begin_fusion().await?;
        let outcome = job.run().await;
        self.finish_fusion(outcome).await
    }

    // --- Capture & export ---

    pub async fn begin_region_capture(&self) -> Result<(), StudioError> {
        self.canvas.lock().await.begin_region_capture()?;
        self.notices.info("Drag to select the region to capture");
        Ok(())
    }

    pub async fn cancel_region_capture(&self) {
        self.canvas.lock().await.cancel_region_capture();
    }

    /// Captures a container-local rectangle and exports it as PNG.
    ///
    /// Returns the exported file name, or `None` if the rectangle was too small.
    #[tracing::instrument(skip(self))]
    pub async fn end_region_capture(&self, rect: Rect) -> Result<Option<String>, StudioError> {
        let crop = self.canvas.lock().await.end_region_capture(rect);
        match crop {
            Ok(None) => Ok(None),
            Ok(Some(encoded)) => {
                let name = self.export_name("crop", "png");
                self.export(&encoded.image, &name).await?;
                self.notices.success("Region captured");
                Ok(Some(name))
            }
            Err(e) => {
                self.notices.error(format!(
                    "Capture failed ({}); make sure the region lies on the image",
                    e
                ));
                Err(e.into())
            }
        }
    }

    /// Exports the composite with the selection hidden as JPEG.
    #[tracing::instrument(skip(self))]
    pub async fn download_composite(&self) -> Result<String, StudioError> {
        let composite = self.canvas.lock().await.current_composite()?;
        let name = self.export_name("preview", "jpg");
        self.export(&composite.image, &name).await?;
        self.notices.success("Preview downloaded");
        Ok(name)
    }

    fn export_name(&self, kind: &str, extension: &str) -> String {
        format!(
            "{}-{}-{}.{}",
            self.config.export_prefix,
            kind,
            chrono::Utc::now().timestamp_millis(),
            extension
        )
    }

    async fn export(&self, image: &RasterImage, name: &str) -> Result<(), StudioError> {
        if let Err(source) = self.export.emit(image, name).await {
            self.notices
                .error(format!("Export of '{}' failed: {:#}", name, source));
            return Err(StudioError::Export {
                name: name.to_string(),
                source,
            });
        }
        Ok(())
    }

    // --- Input & view ---

    /// Forwards a pointer event; a finished capture rectangle is extracted and exported.
    pub async fn handle_pointer(&self, event: PointerEvent) -> Vec<LogicEvent> {
        let events = self.canvas.lock().await.handle_pointer(event);
        for event in &events {
            if let LogicEvent::CaptureReady(rect) = event
                && let Err(e) = self.end_region_capture(*rect).await
            {
                tracing::debug!(error = %e, "Capture did not produce an export");
            }
        }
        events
    }

    pub async fn hover_cursor(&self, screen_pos: Vec2) -> CursorIcon {
        self.canvas.lock().await.hover_cursor(screen_pos)
    }

    pub async fn zoom_in(&self) -> bool {
        self.canvas.lock().await.zoom_in()
    }

    pub async fn zoom_out(&self) -> bool {
        self.canvas.lock().await.zoom_out()
    }

    pub async fn reset_zoom(&self) {
        self.canvas.lock().await.reset_zoom();
    }

    pub async fn set_layout(&self, layout: CanvasLayout) {
        self.canvas.lock().await.set_layout(layout);
    }

    pub async fn set_removal_target(&self, target: Option<Rect>) {
        self.canvas.lock().await.set_removal_target(target);
    }

    pub async fn render(&self) -> RenderList {
        self.canvas.lock().await.render()
    }

    pub async fn is_processing(&self) -> bool {
        self.canvas.lock().await.is_processing()
    }
}
