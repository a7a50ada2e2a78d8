mod engine;
mod phase;

pub use engine::CycleEngine;
pub use phase::{focus_until_long_break, minutes, BreakKind, Phase};
