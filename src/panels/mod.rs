mod central_panel;
mod preview_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use preview_panel::preview_panel;
pub use tools_panel::tools_panel;
