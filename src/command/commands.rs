use egui::Color32;
use log::debug;

use super::{CommandContext, CommandError, CommandResult};
use crate::element::ToolKind;
use crate::export::ExportTrigger;

/// User actions coming from the toolbar, keyboard shortcuts and the text
/// entry field.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetTool(ToolKind),
    SetColor(Color32),
    SetStrokeWidth(f32),
    /// Remove the most recent shape
    Undo,
    /// Remove every shape
    Clear,
    DeleteSelected,
    /// Commit the pending text entry with its current buffer
    ConfirmText,
    CancelText,
    /// Flatten and copy to the clipboard now
    CopyToClipboard,
    SetAutoExport(bool),
}

impl Command {
    pub fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        debug!("Executing {:?}", self);
        let host = &mut *ctx.host;
        match self {
            Command::SetTool(tool) => {
                host.tools.set_tool(*tool, &mut host.editor);
            }
            Command::SetColor(color) => {
                host.tools.set_color(*color, &mut host.editor);
            }
            Command::SetStrokeWidth(width) => {
                if !(*width > 0.0) {
                    return Err(CommandError::InvalidStrokeWidth(*width));
                }
                host.tools.set_stroke_width(*width, &mut host.editor);
            }
            Command::Undo => {
                host.tools
                    .undo(&mut host.editor)
                    .ok_or(CommandError::NothingToUndo)?;
            }
            Command::Clear => {
                host.tools.clear(&mut host.editor);
            }
            Command::DeleteSelected => {
                host.tools
                    .delete_selected(&mut host.editor)
                    .ok_or(CommandError::NothingSelected)?;
            }
            Command::ConfirmText => {
                if !host.editor.state().is_entering_text() {
                    return Err(CommandError::NoPendingText);
                }
                host.tools
                    .confirm_pending_text(&mut host.editor)
                    .ok_or(CommandError::EmptyText)?;
            }
            Command::CancelText => {
                if !host.editor.state().is_entering_text() {
                    return Err(CommandError::NoPendingText);
                }
                host.tools.cancel_text(&mut host.editor);
            }
            Command::CopyToClipboard => {
                if !host.has_image() {
                    return Err(CommandError::NoScreenshot);
                }
                ctx.export.trigger(ExportTrigger::Manual, host);
            }
            Command::SetAutoExport(enabled) => {
                ctx.export.set_auto_export(*enabled);
            }
        }
        Ok(())
    }

    /// Label for logs and tooltips.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetTool(_) => "Set tool",
            Command::SetColor(_) => "Set color",
            Command::SetStrokeWidth(_) => "Set stroke width",
            Command::Undo => "Undo",
            Command::Clear => "Clear",
            Command::DeleteSelected => "Delete selected",
            Command::ConfirmText => "Confirm text",
            Command::CancelText => "Cancel text",
            Command::CopyToClipboard => "Copy to clipboard",
            Command::SetAutoExport(_) => "Toggle auto copy",
        }
    }
}
