//! REST API routes for jukegate

pub mod events;
pub mod lyrics;
pub mod requests;
pub mod songs;

use actix_web::web;

/// Configure all API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Request submission and moderation
        .service(web::scope("/requests").configure(requests::configure))
        // Lyrics checks, refresh, manual entry
        .service(web::scope("/lyrics").configure(lyrics::configure))
        // Approved list, popularity, likes
        .service(web::scope("/songs").configure(songs::configure))
        // Server-sent event stream
        .service(web::scope("/events").configure(events::configure));
}
