//! Shared test doubles for the Memory Archive orchestration core.

mod clock;
mod media;
mod store;
mod surface;

pub use clock::FixedClock;
pub use media::{MediaCall, RecordingMediaDeck, RejectingMediaDeck};
pub use store::{CorruptStore, FailingStore, MemoryStore};
pub use surface::{MemoryBookmark, RecordingSurface, TargetlessSurface};
