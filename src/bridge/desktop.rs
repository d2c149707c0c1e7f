use std::borrow::Cow;
use std::sync::Arc;

use egui::{Pos2, Vec2};
use parking_lot::Mutex;

use super::{NativeBridge, ScreenshotState};
use crate::config::EditorConfig;
use crate::error::BridgeError;

/// Room left for the window frame when placing the preview.
pub const PREVIEW_FRAME_ALLOWANCE: f32 = 20.0;

/// Window changes requested through the bridge, applied by the app on the
/// next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRequest {
    ShowEditor,
    HidePreview,
}

/// Bridge for a single eframe process: window requests are queued for the
/// app loop and the clipboard is reached through `arboard`.
pub struct DesktopBridge {
    screenshots: Arc<ScreenshotState>,
    requests: Mutex<Vec<WindowRequest>>,
    waker: Mutex<Option<egui::Context>>,
    /// Opened on first copy and kept, since X11 and Wayland drop the
    /// clipboard contents together with their owner.
    clipboard: Mutex<Option<arboard::Clipboard>>,
}

impl std::fmt::Debug for DesktopBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopBridge")
            .field("requests", &self.requests.lock().len())
            .field("holds_clipboard", &self.holds_clipboard())
            .finish()
    }
}

impl DesktopBridge {
    pub fn new(screenshots: Arc<ScreenshotState>) -> Self {
        Self {
            screenshots,
            requests: Mutex::new(Vec::new()),
            waker: Mutex::new(None),
            clipboard: Mutex::new(None),
        }
    }

    /// Whether a clipboard connection is currently open.
    pub fn holds_clipboard(&self) -> bool {
        self.clipboard.lock().is_some()
    }

    pub fn set_waker(&self, ctx: egui::Context) {
        *self.waker.lock() = Some(ctx);
    }

    pub fn screenshots(&self) -> &Arc<ScreenshotState> {
        &self.screenshots
    }

    /// Take the queued window requests in the order they were made.
    pub fn drain_requests(&self) -> Vec<WindowRequest> {
        std::mem::take(&mut *self.requests.lock())
    }

    fn push_request(&self, request: WindowRequest) {
        log::debug!("Queued window request {:?}", request);
        self.requests.lock().push(request);
        if let Some(ctx) = self.waker.lock().as_ref() {
            ctx.request_repaint();
        }
    }
}

impl NativeBridge for DesktopBridge {
    fn current_screenshot(&self) -> Option<String> {
        self.screenshots.current()
    }

    fn show_editor_window(&self) {
        self.push_request(WindowRequest::ShowEditor);
    }

    fn hide_preview_window(&self) {
        self.push_request(WindowRequest::HidePreview);
    }

    fn write_clipboard_image(&self, png: &[u8]) -> Result<(), BridgeError> {
        let rgba = image::load_from_memory(png)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let image = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(rgba.into_raw()),
        };

        let mut slot = self.clipboard.lock();
        let mut clipboard = match slot.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        // On failure the connection is dropped and reopened on the next copy.
        clipboard.set_image(image)?;
        *slot = Some(clipboard);
        log::info!("Copied {}x{} image to clipboard", width, height);
        Ok(())
    }
}

/// Top-left corner of the preview window: bottom-right of the monitor,
/// inset by the configured margins.
pub fn preview_position(monitor_size: Vec2, config: &EditorConfig) -> Pos2 {
    let x = monitor_size.x
        - config.preview_size.x
        - PREVIEW_FRAME_ALLOWANCE
        - config.preview_margin_right;
    let y = monitor_size.y
        - config.preview_size.y
        - PREVIEW_FRAME_ALLOWANCE
        - config.preview_margin_bottom;
    Pos2::new(x.max(0.0), y.max(0.0))
}
