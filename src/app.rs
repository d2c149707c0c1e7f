use std::sync::Arc;

use egui::{Key, Modifiers, ViewportCommand};
use futures::channel::mpsc::UnboundedReceiver;
use log::{debug, info};

use crate::bridge::{preview_position, DesktopBridge, NativeBridge, ScreenshotState, WindowRequest};
use crate::canvas::CanvasHost;
use crate::command::{Command, CommandContext};
use crate::config::{EditorConfig, PresentationMode};
use crate::event::{DirtyFlag, RepaintScheduler, ShapeListWatcher};
use crate::export::{ExportPipeline, ExportProgress};
use crate::file_handler::FileHandler;
use crate::gizmo::GizmoHandle;
use crate::input::InputHandler;
use crate::panels::{central_panel, preview_panel, tools_panel};
use crate::renderer::Renderer;
use crate::util::time::current_time_secs;

/// One eframe window that is either the floating preview or the editor.
pub struct ScreenshotApp {
    config: EditorConfig,
    surface: PresentationMode,
    pub(crate) host: CanvasHost,
    pub(crate) export: ExportPipeline,
    bridge: Arc<DesktopBridge>,
    notifications: UnboundedReceiver<String>,
    file_handler: FileHandler,
    pub(crate) input: InputHandler,
    pub(crate) renderer: Renderer,
    pub(crate) hovered_handle: Option<GizmoHandle>,
    repaint_pending: DirtyFlag,
    shapes_dirty: DirtyFlag,
    drawing_finished: DirtyFlag,
    preview_placed: bool,
}

impl ScreenshotApp {
    /// Called once before the first frame.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mode: PresentationMode,
        screenshots: Arc<ScreenshotState>,
    ) -> Self {
        let config: EditorConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_config(config, mode, screenshots, Some(cc.egui_ctx.clone()))
    }

    /// Build the app without an eframe window. `ctx`, when given, is woken
    /// by events and screenshot notifications.
    pub fn with_config(
        config: EditorConfig,
        mode: PresentationMode,
        screenshots: Arc<ScreenshotState>,
        ctx: Option<egui::Context>,
    ) -> Self {
        let config = config.sanitized();
        let bridge = Arc::new(DesktopBridge::new(Arc::clone(&screenshots)));
        if let Some(ctx) = &ctx {
            bridge.set_waker(ctx.clone());
            screenshots.set_waker(ctx.clone());
        }
        let notifications = screenshots.subscribe();

        let repaint_pending = DirtyFlag::new();
        let shapes_dirty = DirtyFlag::new();
        let drawing_finished = DirtyFlag::new();

        let mut host = CanvasHost::new(&config);
        host.editor
            .event_bus
            .subscribe(Box::new(RepaintScheduler::new(repaint_pending.clone(), ctx)));
        host.editor.event_bus.subscribe(Box::new(ShapeListWatcher::new(
            shapes_dirty.clone(),
            drawing_finished.clone(),
        )));

        // Recover the screenshot announced before this surface existed.
        if let Some(url) = bridge.current_screenshot() {
            host.handle_notification(&url);
        }

        info!("Starting {:?} surface", mode);
        Self {
            export: ExportPipeline::new(&config),
            config,
            surface: mode,
            host,
            bridge,
            notifications,
            file_handler: FileHandler::new(),
            input: InputHandler::new(),
            renderer: Renderer::new(),
            hovered_handle: None,
            repaint_pending,
            shapes_dirty,
            drawing_finished,
            preview_placed: false,
        }
    }

    pub fn surface(&self) -> PresentationMode {
        self.surface
    }

    pub fn host(&self) -> &CanvasHost {
        &self.host
    }

    pub fn export(&self) -> &ExportPipeline {
        &self.export
    }

    pub fn bridge(&self) -> &Arc<DesktopBridge> {
        &self.bridge
    }

    /// Run a UI command. Commands that do not apply leave everything as is.
    pub fn execute(&mut self, command: Command) {
        let name = command.name();
        let mut ctx = CommandContext::new(&mut self.host, &mut self.export);
        if let Err(err) = command.execute(&mut ctx) {
            debug!("{} skipped: {}", name, err);
        }
    }

    /// Load every screenshot announced since the last frame. Returns how
    /// many were received.
    pub fn drain_notifications(&mut self) -> usize {
        let mut received = 0;
        while let Ok(url) = self.notifications.try_recv() {
            received += 1;
            if self.host.handle_notification(&url) {
                // Annotations of the old screenshot are gone; nothing left to copy.
                self.export.cancel_pending();
                self.shapes_dirty.take();
            }
        }
        received
    }

    /// Ask the native side for the editor and hide the preview.
    pub fn open_editor(&mut self) {
        self.bridge.show_editor_window();
        self.bridge.hide_preview_window();
    }

    /// Feed shape-list changes seen this frame into the auto-export debounce.
    pub fn after_input(&mut self, now: f64) {
        if self.shapes_dirty.take() {
            self.export.shapes_changed(now);
        }
        if self.drawing_finished.take() {
            debug!("Drawing finished with {} shapes", self.host.editor.document().len());
        }
        self.repaint_pending.take();
    }

    fn apply_window_requests(&mut self, ctx: &egui::Context) {
        for request in self.bridge.drain_requests() {
            match request {
                WindowRequest::ShowEditor => {
                    if self.surface == PresentationMode::Editor {
                        ctx.send_viewport_cmd(ViewportCommand::Focus);
                        continue;
                    }
                    info!("Switching to the editor surface");
                    self.surface = PresentationMode::Editor;
                    // Room for the tools panel and the window chrome
                    let size = self.config.container_size + egui::vec2(160.0, 40.0);
                    ctx.send_viewport_cmd(ViewportCommand::Decorations(true));
                    ctx.send_viewport_cmd(ViewportCommand::WindowLevel(egui::viewport::WindowLevel::Normal));
                    ctx.send_viewport_cmd(ViewportCommand::Resizable(true));
                    ctx.send_viewport_cmd(ViewportCommand::InnerSize(size));
                    ctx.send_viewport_cmd(ViewportCommand::Title("Snapmark".to_owned()));
                    ctx.send_viewport_cmd(ViewportCommand::Visible(true));
                    ctx.send_viewport_cmd(ViewportCommand::Focus);
                }
                WindowRequest::HidePreview => {
                    // The editor took over the preview's window.
                    if self.surface == PresentationMode::Preview {
                        ctx.send_viewport_cmd(ViewportCommand::Visible(false));
                    }
                }
            }
        }
    }

    fn place_preview(&mut self, ctx: &egui::Context) {
        if self.surface != PresentationMode::Preview || self.preview_placed {
            return;
        }
        // Monitor size is unknown until the first frame has been shown.
        if let Some(monitor) = ctx.input(|i| i.viewport().monitor_size) {
            let position = preview_position(monitor, &self.config);
            debug!("Placing preview at {:?} on {:?} monitor", position, monitor);
            ctx.send_viewport_cmd(ViewportCommand::OuterPosition(position));
            self.preview_placed = true;
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let entering_text = self.host.editor.state().is_entering_text();

        if ctx.input_mut(|i| i.consume_key(Modifiers::COMMAND, Key::Z)) {
            self.execute(Command::Undo);
        }
        // Keys belong to the text field while typing
        if entering_text {
            if ctx.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Escape)) {
                self.execute(Command::CancelText);
            }
            return;
        }
        let delete = ctx.input_mut(|i| {
            i.consume_key(Modifiers::NONE, Key::Delete)
                || i.consume_key(Modifiers::NONE, Key::Backspace)
        });
        if delete {
            self.execute(Command::DeleteSelected);
        }
    }

    fn poll_export(&mut self, ctx: &egui::Context, now: f64) {
        let bridge: Arc<dyn NativeBridge> = self.bridge.clone();
        match self.export.poll(now, &mut self.host, &bridge) {
            // One more frame without the overlay before rasterizing
            ExportProgress::Waiting => ctx.request_repaint(),
            ExportProgress::Delivered { .. } | ExportProgress::Failed(_) => {}
            ExportProgress::Nothing => {
                if let Some(remaining) = self.export.debouncer().remaining(now) {
                    ctx.request_repaint_after(remaining);
                }
            }
        }
    }
}

impl eframe::App for ScreenshotApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.host.tools.settings().store_into(&mut self.config);
        self.config.auto_export = self.export.auto_export();
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = current_time_secs();

        self.drain_notifications();
        self.apply_window_requests(ctx);
        self.place_preview(ctx);

        // Handle dropped files
        if self.file_handler.check_for_dropped_files(ctx)
            && self.file_handler.process_dropped_files(self.bridge.screenshots()) > 0
        {
            self.drain_notifications();
        }
        self.file_handler.preview_files_being_dropped(ctx);

        match self.surface {
            PresentationMode::Preview => preview_panel(self, ctx),
            PresentationMode::Editor => {
                // Tools first so a copy click hides the overlay this frame
                tools_panel(self, ctx);
                self.handle_shortcuts(ctx);
                central_panel(self, ctx);
            }
        }

        self.after_input(now);
        self.poll_export(ctx, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url;
    use crate::element::ToolKind;
    use egui::Pos2;
    use std::io::Cursor;

    fn png_url(width: u32, height: u32) -> String {
        let image = image::RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        data_url::encode_png(&bytes)
    }

    fn app(mode: PresentationMode) -> (ScreenshotApp, Arc<ScreenshotState>) {
        let screenshots = Arc::new(ScreenshotState::new());
        let app = ScreenshotApp::with_config(
            EditorConfig::default(),
            mode,
            Arc::clone(&screenshots),
            None,
        );
        (app, screenshots)
    }

    #[test]
    fn startup_recovers_current_screenshot() {
        let screenshots = Arc::new(ScreenshotState::new());
        screenshots.store_and_emit(png_url(10, 8));
        let app = ScreenshotApp::with_config(
            EditorConfig::default(),
            PresentationMode::Editor,
            screenshots,
            None,
        );
        assert_eq!(app.host().image().map(|i| i.width()), Some(10));
    }

    #[test]
    fn notification_resets_annotations() {
        let (mut app, screenshots) = app(PresentationMode::Editor);
        screenshots.store_and_emit(png_url(10, 10));
        assert_eq!(app.drain_notifications(), 1);

        app.execute(Command::SetTool(ToolKind::Rectangle));
        app.host.pointer_down(Pos2::new(1.0, 1.0));
        app.host.pointer_move(Pos2::new(5.0, 5.0), false);
        app.host.pointer_up();
        app.after_input(0.0);
        assert_eq!(app.host().editor.document().len(), 1);
        assert!(app.export().debouncer().is_pending());

        screenshots.store_and_emit(png_url(12, 12));
        app.drain_notifications();
        assert!(app.host().editor.document().is_empty());
        assert!(!app.export().debouncer().is_pending());
    }

    #[test]
    fn preview_click_queues_window_requests() {
        let (mut app, _screenshots) = app(PresentationMode::Preview);
        app.open_editor();
        assert_eq!(
            app.bridge().drain_requests(),
            vec![WindowRequest::ShowEditor, WindowRequest::HidePreview]
        );
    }

    #[test]
    fn undecodable_notification_keeps_previous_image() {
        let (mut app, screenshots) = app(PresentationMode::Editor);
        screenshots.store_and_emit(png_url(10, 10));
        app.drain_notifications();
        screenshots.store_and_emit("data:image/png;base64,AAAA".to_owned());
        app.drain_notifications();
        assert_eq!(app.host().image().map(|i| i.width()), Some(10));
    }
}
