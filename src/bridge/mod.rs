//! Boundary to the native side: window control, the clipboard and the
//! "screenshot-taken" notification stream.

mod desktop;
mod screenshot_state;

pub use desktop::{preview_position, DesktopBridge, WindowRequest, PREVIEW_FRAME_ALLOWANCE};
pub use screenshot_state::ScreenshotState;

use crate::error::BridgeError;

/// Commands the editor issues to the native layer.
///
/// Calls are fire-and-forget from the caller's point of view. Implementations
/// must be usable from the export delivery thread.
pub trait NativeBridge: Send + Sync {
    /// The last announced screenshot as a data URL, if any.
    fn current_screenshot(&self) -> Option<String>;

    fn show_editor_window(&self);

    fn hide_preview_window(&self);

    /// Put an encoded PNG on the system clipboard.
    fn write_clipboard_image(&self, png: &[u8]) -> Result<(), BridgeError>;
}
