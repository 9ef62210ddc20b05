// Desktop UI

pub mod app;

pub use app::{AppMetronome, MetronomeApp};
