// Command types - UI thread → audio callback

use crate::sound::{ClickBank, ClickType};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Command {
    /// Restart and play one click
    PlayClick(ClickType),
    /// Swap the preloaded click sounds (None unloads them)
    LoadBank(Option<Arc<ClickBank>>),
    SetVolume(f32),
    /// Cut the click currently sounding
    Silence,
}
