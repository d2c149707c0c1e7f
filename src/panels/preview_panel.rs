use egui::{Color32, Pos2, Rect, Sense};

use crate::app::ScreenshotApp;

/// The floating preview: the latest screenshot, click to annotate it.
pub fn preview_panel(app: &mut ScreenshotApp, ctx: &egui::Context) {
    let mut open_editor = false;

    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(Color32::from_gray(24)))
        .show(ctx, |ui| {
            let rect = ui.max_rect();
            let response = ui.allocate_rect(rect, Sense::click());
            let painter = ui.painter();

            match app.host.image() {
                Some(image) => {
                    let texture = app.renderer.textures_mut().texture_for(ctx, image);
                    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                    painter.image(texture, fit_rect(image.size(), rect), uv, Color32::WHITE);
                    if response.hovered() {
                        painter.rect_stroke(rect.shrink(1.0), 4.0, (2.0, Color32::from_rgb(59, 130, 246)));
                    }
                    open_editor = response
                        .on_hover_cursor(egui::CursorIcon::PointingHand)
                        .on_hover_text("Click to annotate")
                        .clicked();
                }
                None => {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "No screenshot yet",
                        egui::FontId::proportional(14.0),
                        Color32::GRAY,
                    );
                }
            }
        });

    if open_editor {
        app.open_editor();
    }
}

/// Largest rect with the aspect of `image` centered in `frame`.
fn fit_rect(image: egui::Vec2, frame: Rect) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return frame;
    }
    let scale = (frame.width() / image.x).min(frame.height() / image.y);
    Rect::from_center_size(frame.center(), image * scale)
}
