use crate::app::ScreenshotApp;
use crate::command::Command;
use crate::components::tool_button::{color_swatch, ToolButton};
use crate::element::ToolKind;
use egui::Color32;

const PALETTE: [Color32; 6] = [
    Color32::from_rgb(239, 68, 68),
    Color32::from_rgb(249, 115, 22),
    Color32::from_rgb(250, 204, 21),
    Color32::from_rgb(34, 197, 94),
    Color32::from_rgb(59, 130, 246),
    Color32::BLACK,
];

pub fn tools_panel(app: &mut ScreenshotApp, ctx: &egui::Context) {
    let mut commands = Vec::new();

    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(120.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.host.tools.tool();
            ui.horizontal_wrapped(|ui| {
                for tool in ToolKind::ALL {
                    if ToolButton::new(tool, tool == active).show(ui).clicked() {
                        commands.push(Command::SetTool(tool));
                    }
                }
            });
            ui.separator();

            let current = app.host.tools.color();
            ui.horizontal_wrapped(|ui| {
                for color in PALETTE {
                    if color_swatch(ui, color, color == current).clicked() {
                        commands.push(Command::SetColor(color));
                    }
                }
            });
            let mut color = current;
            if ui.color_edit_button_srgba(&mut color).changed() {
                commands.push(Command::SetColor(color));
            }

            let mut width = app.host.tools.stroke_width();
            if ui
                .add(egui::Slider::new(&mut width, 1.0..=20.0).text("Width"))
                .changed()
            {
                commands.push(Command::SetStrokeWidth(width));
            }
            ui.separator();

            let document = app.host.editor.document();
            let has_selection = app.host.editor.selection().selected().is_some();
            if ui
                .add_enabled(!document.is_empty(), egui::Button::new("Undo"))
                .clicked()
            {
                commands.push(Command::Undo);
            }
            if ui
                .add_enabled(has_selection, egui::Button::new("Delete"))
                .clicked()
            {
                commands.push(Command::DeleteSelected);
            }
            if ui
                .add_enabled(!document.is_empty(), egui::Button::new("Clear"))
                .clicked()
            {
                commands.push(Command::Clear);
            }
            ui.separator();

            if ui
                .add_enabled(app.host.has_image(), egui::Button::new("Copy"))
                .on_hover_text("Copy the annotated screenshot to the clipboard")
                .clicked()
            {
                commands.push(Command::CopyToClipboard);
            }
            let mut auto_export = app.export.auto_export();
            if ui.checkbox(&mut auto_export, "Auto copy").changed() {
                commands.push(Command::SetAutoExport(auto_export));
            }

            ui.separator();
            ui.small(format!("{} shapes", document.len()));
            ui.small(format!("{} copies", app.export.exports()));
        });

    for command in commands {
        app.execute(command);
    }
}
