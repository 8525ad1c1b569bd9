use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::EventEmitter;
use crate::domain::{
    error::CatalogError,
    events::{EventMessage, SongPlayed},
    services::{outbox::Outbox, publisher::EventPublisher, stores::SongRepository},
};

/// Records one play of a song.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaySong {
    pub song_id: Uuid,
}

pub struct PlaySongHandler {
    songs: Arc<dyn SongRepository>,
    emitter: EventEmitter,
}

impl PlaySongHandler {
    pub fn new(songs: Arc<dyn SongRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            songs,
            emitter: EventEmitter::new(publisher),
        }
    }

    pub fn with_outbox(mut self, outbox: Arc<Outbox>) -> Self {
        self.emitter = self.emitter.with_outbox(outbox);
        self
    }

    /// Emits `SongPlayed` for an existing song.
    ///
    /// The write store is only read; play counts live on the read side.
    ///
    /// # Errors
    /// * `CatalogError::NotFound` - the song does not exist
    /// * `CatalogError::Publish` - the event was not accepted
    pub async fn execute(&self, command: PlaySong) -> Result<SongPlayed, CatalogError> {
        let song = self.songs.get_song_by_id(command.song_id).await?;
        let played = SongPlayed { song_id: song.id };

        self.emitter.emit(EventMessage::encode(&played)?).await?;
        debug!(song_id = %song.id, "song played");
        Ok(played)
    }
}
