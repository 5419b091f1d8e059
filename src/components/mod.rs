mod node_editor;
mod zoom_controls;

pub use node_editor::NodeEditor;
pub use zoom_controls::ZoomControls;
