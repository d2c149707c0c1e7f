use egui::{CursorIcon, Key, Rect};

use crate::app::ScreenshotApp;
use crate::command::Command;
use crate::element::ToolKind;
use crate::gizmo::TransformGizmo;
use crate::input::route_event;

const TEXT_ENTRY_WIDTH: f32 = 240.0;

pub fn central_panel(app: &mut ScreenshotApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        app.host.set_container_size(ui.available_size());

        let size = if app.host.has_image() {
            app.host.render_size()
        } else {
            ui.available_size()
        };
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
        let canvas_rect = response.rect;

        // The text field lives on a foreground layer, so the canvas is not
        // hovered while the pointer is over it.
        let events = app
            .input
            .process_input(ctx, canvas_rect, response.hovered());
        for event in &events {
            route_event(event, &mut app.host);
        }

        text_entry(app, ctx, canvas_rect);

        app.hovered_handle = ctx
            .pointer_hover_pos()
            .and_then(|pos| app.host.hovered_handle((pos - canvas_rect.min).to_pos2()));
        if let Some(handle) = app.hovered_handle {
            ctx.set_cursor_icon(TransformGizmo::cursor_for(handle));
        } else if response.hovered() && app.host.tools.tool() != ToolKind::Select {
            ctx.set_cursor_icon(CursorIcon::Crosshair);
        }

        app.renderer
            .render(ctx, &painter, canvas_rect, &app.host, app.hovered_handle);
    });
}

/// Single-line field at the pending text position. Enter confirms.
fn text_entry(app: &mut ScreenshotApp, ctx: &egui::Context, canvas_rect: Rect) {
    let Some((position, _)) = app.host.editor.state().pending_text() else {
        return;
    };
    let font = egui::FontId::proportional(app.host.tools.settings().font_size());
    let color = app.host.tools.color();
    let mut confirmed = false;

    egui::Area::new(egui::Id::new("pending_text_entry"))
        .fixed_pos(canvas_rect.min + position.to_vec2())
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let Some(buffer) = app.host.editor.pending_text_mut() else {
                return;
            };
            let response = ui.add(
                egui::TextEdit::singleline(buffer)
                    .font(font)
                    .text_color(color)
                    .desired_width(TEXT_ENTRY_WIDTH)
                    .hint_text("Type, then Enter"),
            );
            if response.lost_focus() {
                confirmed = ui.input(|i| i.key_pressed(Key::Enter));
            } else if !response.has_focus() {
                response.request_focus();
            }
        });

    if confirmed {
        app.execute(Command::ConfirmText);
    }
}
