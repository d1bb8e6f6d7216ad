//! UI layer: the station board window.

pub mod app;

pub use app::StationBoardApp;
