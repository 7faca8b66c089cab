pub mod catalog_list;
pub mod catalog_view;
pub mod detail_panel;
pub mod palette;
pub mod search_overlay;
pub mod type_picker;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use catalog_list::{CatalogList, CatalogListProps};
pub use catalog_view::{CatalogView, CatalogViewProps};
pub use detail_panel::{DetailPanel, DetailPanelProps};
pub use search_overlay::{SearchOverlay, SearchOverlayProps, overlay_area};
pub use type_picker::{TypePicker, TypePickerProps, picker_area};
