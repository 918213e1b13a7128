//! Data models for jukegate
//!
//! This module contains all the core data structures used throughout the application.

mod lyric_record;
mod lyrics_check;
mod request;
mod song;

pub use lyric_record::LyricRecord;
pub use lyrics_check::LyricsCheck;
pub use request::{ModerationAction, RequestStatus, SongRequest};
pub use song::Song;
