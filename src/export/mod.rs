//! Flattening the canvas and delivering it to the clipboard.
//!
//! ```text
//!   trigger ──► Armed (overlay detached) ──next frame──► rasterize ──► Idle
//!                                                           │
//!                                              delivery thread ──► clipboard
//! ```

mod debounce;
pub mod rasterize;

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, error, info};

pub use debounce::Debouncer;

use crate::canvas::CanvasHost;
use crate::bridge::NativeBridge;
use crate::config::EditorConfig;
use crate::data_url;
use crate::error::ExportError;

/// Why an export was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTrigger {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    /// The overlay has been detached; rasterize once `frames_left` reaches 0.
    Armed {
        trigger: ExportTrigger,
        frames_left: u8,
    },
}

/// What [`ExportPipeline::poll`] did this frame.
#[derive(Debug)]
pub enum ExportProgress {
    Nothing,
    /// Waiting for a frame without the overlay; repaint to continue.
    Waiting,
    /// Bitmap produced and handed to the delivery thread.
    Delivered {
        trigger: ExportTrigger,
        bytes: usize,
        handle: JoinHandle<()>,
    },
    Failed(ExportError),
}

#[derive(Debug)]
pub struct ExportPipeline {
    state: ExportState,
    debounce: Debouncer,
    auto_export: bool,
    pixel_ratio: f32,
    exports: u64,
}

impl ExportPipeline {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: ExportState::Idle,
            debounce: Debouncer::new(config.debounce()),
            auto_export: config.auto_export,
            pixel_ratio: config.export_pixel_ratio,
            exports: 0,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn exports(&self) -> u64 {
        self.exports
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debounce
    }

    pub fn auto_export(&self) -> bool {
        self.auto_export
    }

    pub fn set_auto_export(&mut self, enabled: bool) {
        self.auto_export = enabled;
        if !enabled {
            self.debounce.cancel();
        }
    }

    /// The shape list changed at `now`: restart the quiet period.
    pub fn shapes_changed(&mut self, now: f64) {
        if self.auto_export {
            self.debounce.schedule(now);
        }
    }

    /// Forget a pending auto export, e.g. when a new screenshot arrives.
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    /// Start an export: the overlay goes away and the bitmap is taken on the
    /// next poll after one more frame has been drawn.
    pub fn trigger(&mut self, trigger: ExportTrigger, host: &mut CanvasHost) {
        if let ExportState::Armed { .. } = self.state {
            debug!("Export already armed, ignoring {:?} trigger", trigger);
            return;
        }
        host.editor.selection_mut().detach_overlay();
        self.state = ExportState::Armed {
            trigger,
            frames_left: 1,
        };
        debug!("Export armed ({:?})", trigger);
    }

    /// Advance the pipeline. Call once per frame before drawing.
    pub fn poll(
        &mut self,
        now: f64,
        host: &mut CanvasHost,
        bridge: &Arc<dyn NativeBridge>,
    ) -> ExportProgress {
        if let ExportState::Idle = self.state {
            // Held back while a shape is drawn or dragged; fires on release.
            if self.debounce.is_pending() && !host.is_busy() && self.debounce.poll(now) {
                if !host.has_image() {
                    return ExportProgress::Nothing;
                }
                self.trigger(ExportTrigger::Auto, host);
            } else {
                return ExportProgress::Nothing;
            }
        }

        let ExportState::Armed {
            trigger,
            frames_left,
        } = self.state
        else {
            return ExportProgress::Nothing;
        };

        if frames_left > 0 {
            self.state = ExportState::Armed {
                trigger,
                frames_left: frames_left - 1,
            };
            return ExportProgress::Waiting;
        }

        self.state = ExportState::Idle;
        let result = self.render(host);
        host.editor.selection_mut().attach_overlay();

        match result {
            Ok(png) => {
                self.exports += 1;
                let bytes = png.len();
                info!("Exported {:?} canvas ({} bytes)", trigger, bytes);
                let handle = deliver(png, Arc::clone(bridge));
                ExportProgress::Delivered {
                    trigger,
                    bytes,
                    handle,
                }
            }
            Err(err) => {
                error!("Export failed: {}", err);
                ExportProgress::Failed(err)
            }
        }
    }

    /// Flatten screenshot and shapes, then run the PNG through its data-URL
    /// form and back to raw bytes for the clipboard.
    pub fn render(&self, host: &CanvasHost) -> Result<Vec<u8>, ExportError> {
        let image = host.image().ok_or(ExportError::NothingToExport)?;
        let flat = rasterize::flatten(
            image.pixels(),
            host.render_size(),
            host.editor.document().shapes(),
            self.pixel_ratio,
        );
        let png = rasterize::encode_png(&flat)?;
        let url = data_url::encode_png(&png);
        Ok(data_url::decode(&url)?)
    }
}

/// Write `png` to the clipboard off the UI thread. Failures are logged only.
pub fn deliver(png: Vec<u8>, bridge: Arc<dyn NativeBridge>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(err) = bridge.write_clipboard_image(&png) {
            error!("Failed to copy image to clipboard: {}", err);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ToolKind;
    use crate::error::BridgeError;
    use egui::Pos2;
    use image::RgbaImage;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingBridge {
        writes: Mutex<Vec<Vec<u8>>>,
        fail: bool,
    }

    impl NativeBridge for RecordingBridge {
        fn current_screenshot(&self) -> Option<String> {
            None
        }

        fn show_editor_window(&self) {}

        fn hide_preview_window(&self) {}

        fn write_clipboard_image(&self, png: &[u8]) -> Result<(), BridgeError> {
            if self.fail {
                return Err(BridgeError::Clipboard(arboard::Error::ClipboardNotSupported));
            }
            self.writes.lock().push(png.to_vec());
            Ok(())
        }
    }

    fn host_with_image() -> CanvasHost {
        let mut host = CanvasHost::new(&EditorConfig::default());
        host.replace_image(RgbaImage::from_pixel(40, 30, image::Rgba([255, 255, 255, 255])))
            .unwrap();
        host
    }

    fn run_to_completion(
        pipeline: &mut ExportPipeline,
        now: f64,
        host: &mut CanvasHost,
        bridge: &Arc<dyn NativeBridge>,
    ) -> Option<ExportTrigger> {
        for _ in 0..4 {
            match pipeline.poll(now, host, bridge) {
                ExportProgress::Delivered { trigger, handle, .. } => {
                    handle.join().unwrap();
                    return Some(trigger);
                }
                ExportProgress::Failed(err) => panic!("export failed: {err}"),
                _ => {}
            }
        }
        None
    }

    #[test]
    fn manual_export_waits_one_frame_without_overlay() {
        let recorder = Arc::new(RecordingBridge::default());
        let bridge: Arc<dyn NativeBridge> = recorder.clone();
        let mut host = host_with_image();
        let mut pipeline = ExportPipeline::new(&EditorConfig::default());

        pipeline.trigger(ExportTrigger::Manual, &mut host);
        assert!(host.editor.selection().overlay_detached());
        assert!(matches!(
            pipeline.poll(0.0, &mut host, &bridge),
            ExportProgress::Waiting
        ));
        assert_eq!(
            run_to_completion(&mut pipeline, 0.0, &mut host, &bridge),
            Some(ExportTrigger::Manual)
        );
        assert!(!host.editor.selection().overlay_detached());

        let writes = recorder.writes.lock();
        assert_eq!(writes.len(), 1);
        let png = image::load_from_memory(&writes[0]).unwrap();
        assert_eq!((png.width(), png.height()), (80, 60));
    }

    #[test]
    fn auto_export_is_debounced_and_waits_for_drawing() {
        let recorder = Arc::new(RecordingBridge::default());
        let bridge: Arc<dyn NativeBridge> = recorder.clone();
        let mut host = host_with_image();
        let mut pipeline = ExportPipeline::new(&EditorConfig::default());

        host.tools.set_tool(ToolKind::Pen, &mut host.editor);
        host.pointer_down(Pos2::new(5.0, 5.0));
        pipeline.shapes_changed(0.0);
        pipeline.shapes_changed(0.2);
        assert!(matches!(pipeline.poll(0.3, &mut host, &bridge), ExportProgress::Nothing));
        // Deadline passed, but the pen is still down.
        assert!(matches!(pipeline.poll(1.0, &mut host, &bridge), ExportProgress::Nothing));
        assert!(pipeline.debouncer().is_pending());

        host.pointer_up();
        assert_eq!(
            run_to_completion(&mut pipeline, 1.1, &mut host, &bridge),
            Some(ExportTrigger::Auto)
        );
        assert_eq!(recorder.writes.lock().len(), 1);
        assert!(!pipeline.debouncer().is_pending());
    }

    #[test]
    fn clipboard_failure_is_not_fatal() {
        let bridge: Arc<dyn NativeBridge> = Arc::new(RecordingBridge {
            fail: true,
            ..Default::default()
        });
        let mut host = host_with_image();
        let mut pipeline = ExportPipeline::new(&EditorConfig::default());
        pipeline.trigger(ExportTrigger::Manual, &mut host);
        assert!(run_to_completion(&mut pipeline, 0.0, &mut host, &bridge).is_some());
        assert_eq!(pipeline.state(), ExportState::Idle);
    }

    #[test]
    fn nothing_to_export_without_screenshot() {
        let host = CanvasHost::new(&EditorConfig::default());
        let pipeline = ExportPipeline::new(&EditorConfig::default());
        assert!(matches!(
            pipeline.render(&host),
            Err(ExportError::NothingToExport)
        ));
    }
}
