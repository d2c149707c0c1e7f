use crate::canvas::CanvasHost;
use crate::export::ExportPipeline;

/// What a command may touch: the canvas model and the export pipeline.
#[derive(Debug)]
pub struct CommandContext<'a> {
    pub host: &'a mut CanvasHost,
    pub export: &'a mut ExportPipeline,
}

impl<'a> CommandContext<'a> {
    pub fn new(host: &'a mut CanvasHost, export: &'a mut ExportPipeline) -> Self {
        Self { host, export }
    }
}
