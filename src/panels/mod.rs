pub mod editor_ui;
pub mod heatmap_ui;
pub mod panel_trait;

pub use editor_ui::EditorPanel;
pub use heatmap_ui::HeatmapPanel;
pub use panel_trait::{CardData, Panel, PanelState};
