pub mod popup;

pub use popup::{escape_html, station_content, Popup, PopupManager};
