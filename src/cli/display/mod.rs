//! Formatted CLI output: colors, icons and table rendering

pub mod colors;
pub mod icons;
pub mod table;

pub use colors::ColorTheme;
pub use icons::StatusIcon;
pub use table::TableRenderer;
