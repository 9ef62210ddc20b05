// Metronome module - the public control surface

pub mod facade;
pub mod observer;

pub use facade::Metronome;
pub use observer::{MetronomeObserver, Snapshot};
