//! Pipeline orchestration
//!
//! Wires a request through catalog lookup, the gate, the request
//! lifecycle, background lyric resolution and the event fan-out.
//!
//! The submission path is synchronous over the database only: it
//! consults the explicit flag and any existing lyrics check, never the
//! network providers. Lyric retrieval happens on the worker pool and
//! re-evaluates still-Pending requests when it completes.
//!
//! Lifecycle invariants are enforced by guarded UPDATEs (see
//! `RequestTable`): once a moderator has decided a request, no
//! automatic transition can touch it.

use once_cell::sync::OnceCell;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::classifier::Denylist;
use super::events::{EventBus, JukeEvent};
use super::gate;
use super::pool::ResolvePool;
use super::resolver::{LyricResolver, ResolveOutcome};
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::db::{DbEngine, LyricsCheckTable, RequestTable, SongTable};
use crate::error::{DomainError, Result};
use crate::models::{LyricsCheck, ModerationAction, RequestStatus, Song, SongRequest};

/// The moderation pipeline, shared across handlers and workers
pub struct Pipeline {
    db: DbEngine,
    catalog: Arc<dyn Catalog>,
    resolver: LyricResolver,
    denylist: Denylist,
    bus: EventBus,
    excerpt_max_chars: usize,
    manual_excerpt_max_chars: usize,
    resolve_pool: OnceCell<ResolvePool>,
}

impl Pipeline {
    pub fn new(
        db: DbEngine,
        catalog: Arc<dyn Catalog>,
        resolver: LyricResolver,
        denylist: Denylist,
        bus: EventBus,
        settings: &Settings,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            catalog,
            resolver,
            denylist,
            bus,
            excerpt_max_chars: settings.excerpt_max_chars,
            manual_excerpt_max_chars: settings.manual_excerpt_max_chars,
            resolve_pool: OnceCell::new(),
        })
    }

    /// Spawn the background resolution workers. Until this is called,
    /// submissions still work but no background resolution runs.
    pub fn start_workers(self: &Arc<Self>, workers: usize, queue_size: usize) {
        let pool = ResolvePool::start(self.clone(), workers, queue_size);
        if self.resolve_pool.set(pool).is_err() {
            tracing::warn!("resolution workers already started");
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    /// Submit a request for a catalog track
    ///
    /// The catalog lookup is the only external call on this path; a
    /// failure there is fatal to the submission and creates nothing.
    pub async fn submit(&self, catalog_id: &str, requester_id: &str) -> Result<SongRequest> {
        let track = self.catalog.get_track(catalog_id).await?;
        let song = SongTable::ensure(self.pool(), &track).await?;

        if RequestTable::has_pending(self.pool(), requester_id, song.id).await? {
            return Err(DomainError::DuplicatePending);
        }

        // decide on what is already known: the explicit flag and any
        // completed classification; never wait for retrieval here
        let check = LyricsCheckTable::get(self.pool(), song.id).await?;
        let verdict = gate::decide(song.explicit, check.as_ref().map(|c| c.is_clean));

        let status = if verdict.is_reject() {
            RequestStatus::Rejected
        } else {
            RequestStatus::Pending
        };

        let request = SongRequest {
            id: Uuid::new_v4().to_string(),
            song_id: song.id,
            requester_id: requester_id.to_string(),
            status,
            moderated: false,
            requested_at: chrono::Utc::now().timestamp(),
        };

        if let Err(e) = RequestTable::insert(self.pool(), &request).await {
            // the partial unique index catches a concurrent duplicate
            // submission that raced past the check above
            if is_unique_violation(&e) {
                return Err(DomainError::DuplicatePending);
            }
            return Err(e.into());
        }

        info!(
            request_id = %request.id,
            song = %song.title,
            status = %request.status,
            "request submitted"
        );

        self.bus.emit(JukeEvent::RequestCreated {
            request_id: request.id.clone(),
            song_id: song.id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            explicit: song.explicit,
            status: request.status.to_string(),
        });

        if verdict.is_reject() {
            self.bus.emit(JukeEvent::RequestRejected {
                request_id: request.id.clone(),
                automatic: true,
                reasons: verdict.reasons,
            });
        }

        // first sighting of this song: fetch its lyrics off-path
        if check.is_none() {
            if let Some(pool) = self.resolve_pool.get() {
                pool.dispatch(song.id);
            }
        }

        Ok(request)
    }

    /// Apply a moderator action to a request
    ///
    /// Repeating an action on a request already in the target status
    /// is a no-op and emits nothing.
    pub async fn moderate(
        &self,
        request_id: &str,
        action: ModerationAction,
    ) -> Result<SongRequest> {
        let request = RequestTable::get(self.pool(), request_id)
            .await?
            .ok_or_else(|| DomainError::RequestNotFound(request_id.to_string()))?;

        let (from, to, event) = match (action, request.status) {
            (ModerationAction::Approve, RequestStatus::Approved)
            | (ModerationAction::Reject, RequestStatus::Rejected) => {
                return Ok(request);
            }
            (ModerationAction::Approve, RequestStatus::Pending) => (
                RequestStatus::Pending,
                RequestStatus::Approved,
                JukeEvent::RequestApproved {
                    request_id: request.id.clone(),
                    overridden: false,
                },
            ),
            (ModerationAction::Reject, from @ (RequestStatus::Pending | RequestStatus::Approved)) => (
                from,
                RequestStatus::Rejected,
                JukeEvent::RequestRejected {
                    request_id: request.id.clone(),
                    automatic: false,
                    reasons: Vec::new(),
                },
            ),
            (ModerationAction::Override, RequestStatus::Rejected) => (
                RequestStatus::Rejected,
                RequestStatus::Approved,
                JukeEvent::RequestApproved {
                    request_id: request.id.clone(),
                    overridden: true,
                },
            ),
            (action, status) => {
                return Err(DomainError::InvalidTransition {
                    status,
                    action: action.as_str(),
                });
            }
        };

        let applied = RequestTable::moderate_from(self.pool(), request_id, from, to).await?;
        if !applied {
            // the request changed under us; report its current state
            let current = RequestTable::get(self.pool(), request_id)
                .await?
                .ok_or_else(|| DomainError::RequestNotFound(request_id.to_string()))?;
            return Err(DomainError::InvalidTransition {
                status: current.status,
                action: action.as_str(),
            });
        }

        info!(request_id, action = action.as_str(), from = %from, to = %to, "request moderated");
        self.bus.emit(event);

        RequestTable::get(self.pool(), request_id)
            .await?
            .ok_or_else(|| DomainError::RequestNotFound(request_id.to_string()))
    }

    /// Force a fresh resolution for a song, bypassing the cache.
    /// Returns the updated lyrics check.
    pub async fn refresh_lyrics(&self, song_id: i64) -> Result<LyricsCheck> {
        let song = self.song(song_id).await?;
        let outcome = self
            .resolver
            .resolve(&song.artist, &song.title, true)
            .await;

        self.apply_classification(
            &song,
            outcome.text.as_deref(),
            outcome.source.as_deref(),
            self.excerpt_max_chars,
        )
        .await
    }

    /// Store moderator-supplied lyric text for a song and classify it
    pub async fn manual_lyrics(&self, song_id: i64, text: &str) -> Result<LyricsCheck> {
        if text.trim().is_empty() {
            return Err(DomainError::EmptyLyrics);
        }

        let song = self.song(song_id).await?;
        self.apply_classification(
            &song,
            Some(text),
            Some("manual"),
            self.manual_excerpt_max_chars,
        )
        .await
    }

    /// Resolve and classify lyrics for a song (worker entry point)
    pub async fn run_resolution(&self, song_id: i64, force: bool) -> Result<LyricsCheck> {
        let song = self.song(song_id).await?;
        let outcome: ResolveOutcome = self
            .resolver
            .resolve(&song.artist, &song.title, force)
            .await;

        self.apply_classification(
            &song,
            outcome.text.as_deref(),
            outcome.source.as_deref(),
            self.excerpt_max_chars,
        )
        .await
    }

    async fn song(&self, song_id: i64) -> Result<Song> {
        SongTable::get(self.pool(), song_id)
            .await?
            .ok_or(DomainError::SongNotFound(song_id))
    }

    /// Classify lyric text, persist the song's single check row, and
    /// re-evaluate every still-Pending request for the song.
    async fn apply_classification(
        &self,
        song: &Song,
        text: Option<&str>,
        source: Option<&str>,
        excerpt_cap: usize,
    ) -> Result<LyricsCheck> {
        let is_clean = self.denylist.classify(text);
        let excerpt = text.map(|t| truncate_chars(t, excerpt_cap));

        let check =
            LyricsCheckTable::upsert(self.pool(), song.id, excerpt.as_deref(), is_clean).await?;

        self.bus.emit(JukeEvent::LyricsResolved {
            song_id: song.id,
            found: text.is_some(),
            source: source.map(|s| s.to_string()),
            clean: is_clean,
        });

        if !is_clean {
            let verdict = gate::decide(song.explicit, Some(is_clean));
            let pending =
                RequestTable::pending_unmoderated_for_song(self.pool(), song.id).await?;

            for request_id in pending {
                // guarded: fires only while still Pending and unmoderated
                if RequestTable::auto_reject(self.pool(), &request_id).await? {
                    info!(request_id, song = %song.title, "request auto-rejected");
                    self.bus.emit(JukeEvent::RequestRejected {
                        request_id,
                        automatic: true,
                        reasons: verdict.reasons.clone(),
                    });
                }
            }
        }

        Ok(check)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}

/// Truncate on a char boundary, never exceeding `max` chars
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
