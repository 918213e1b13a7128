//! Database table operations

mod like_table;
mod lyric_cache_table;
mod lyrics_check_table;
mod request_table;
mod song_table;

pub use like_table::LikeTable;
pub use lyric_cache_table::SqliteLyricStore;
pub use lyrics_check_table::LyricsCheckTable;
pub use request_table::{PendingRequestRow, RequestTable};
pub use song_table::{ApprovedSongRow, PopularSongRow, SongTable};
