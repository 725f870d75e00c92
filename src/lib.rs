#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

pub use config::{Config, LayoutConfig, load_config};
pub use ir::{Corpus, InteractionState, PlacementError};
pub use layout::{compute_layout, date_to_x, equidistant_points, scale_to_y, visible_edges};
pub use parser::parse_corpus;
pub use render::render_svg;
pub use theme::Theme;

#[cfg(feature = "cli")]
pub use cli::run;
