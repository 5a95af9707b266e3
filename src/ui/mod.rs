pub mod app;
pub mod components;
pub mod directory;
pub mod state;

pub use app::ChatApp;
