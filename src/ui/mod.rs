pub mod app;
pub mod components;
pub mod state;
pub mod theme;

pub use app::PatterApp;
pub use state::{AppState, Mode, Phase};
pub use theme::Theme;
