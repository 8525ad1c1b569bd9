use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{EventEmitter, require_text};
use crate::domain::{
    error::CatalogError,
    events::EventMessage,
    models::Album,
    services::{
        outbox::Outbox,
        publisher::EventPublisher,
        stores::{AlbumRepository, ArtistRepository},
    },
};

/// Releases a new album for an existing artist.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishAlbum {
    pub title: String,
    pub release_year: i32,
    pub artist_id: Uuid,
}

pub struct PublishAlbumHandler {
    artists: Arc<dyn ArtistRepository>,
    albums: Arc<dyn AlbumRepository>,
    emitter: EventEmitter,
}

impl PublishAlbumHandler {
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        albums: Arc<dyn AlbumRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            artists,
            albums,
            emitter: EventEmitter::new(publisher),
        }
    }

    pub fn with_outbox(mut self, outbox: Arc<Outbox>) -> Self {
        self.emitter = self.emitter.with_outbox(outbox);
        self
    }

    /// Persists a new album under its artist and emits `AlbumPublished`.
    ///
    /// # Errors
    /// * `CatalogError::Invalid` - empty title
    /// * `CatalogError::NotFound` - the artist does not exist, nothing is written or published
    /// * `CatalogError::Persistence` - a store call failed
    /// * `CatalogError::Publish` - the album is stored but the event was not accepted
    pub async fn execute(&self, command: PublishAlbum) -> Result<Album, CatalogError> {
        require_text("title", &command.title)?;

        let artist = self.artists.get_artist_by_id(command.artist_id).await?;
        let album = Album::new(command.title, command.release_year, artist);
        let event = EventMessage::encode(&album)?;

        self.albums.create_album(&album).await?;
        info!(album_id = %album.id, artist_id = %album.artist.id, "album published");

        self.emitter.emit(event).await?;
        Ok(album)
    }
}
