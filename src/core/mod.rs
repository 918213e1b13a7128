//! The moderation pipeline
//!
//! Resolver fetches lyric text (cache-first, provider fallback), the
//! classifier scores it against a denylist, the gate fuses that score
//! with the catalog's explicit flag into a verdict, the lifecycle
//! rules apply the verdict to request rows, and the event bus fans
//! every state change out to subscribers. The pipeline module wires
//! it all together.

pub mod classifier;
pub mod events;
pub mod gate;
pub mod pipeline;
pub mod pool;
pub mod providers;
pub mod resolver;

pub use classifier::Denylist;
pub use events::{EventBus, JukeEvent};
pub use pipeline::Pipeline;
