//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Command handlers of the write side. Every handler validates its command, resolves the entities
// it references, persists through its store capabilities and emits exactly one event.
//
// | Handler                  | Event emitted       | Store capabilities                        |
// |--------------------------|---------------------|------------------------------------------|
// | SubscribeArtistHandler   | ArtistSubscribed    | ArtistRepository                          |
// | PublishAlbumHandler      | AlbumPublished      | ArtistRepository, AlbumRepository         |
// | PublishSongHandler       | SongPublished       | ArtistRepository, AlbumRepository,        |
// |                          |                     | SongRepository                            |
// | PlaySongHandler          | SongPlayed          | SongRepository                            |
//--------------------------------------------------------------------------------------------------
// Errors are never retried here. When the write commits but the publish fails the handler still
// reports `CatalogError::Publish`; with an outbox attached the event is parked for the relay.
//--------------------------------------------------------------------------------------------------

mod play_song;
mod publish_album;
mod publish_song;
mod subscribe_artist;

use std::sync::Arc;

use tracing::error;

use super::{outbox::Outbox, publisher::EventPublisher};
use crate::domain::{error::CatalogError, events::EventMessage};

pub use play_song::{PlaySong, PlaySongHandler};
pub use publish_album::{PublishAlbum, PublishAlbumHandler};
pub use publish_song::{PublishSong, PublishSongHandler};
pub use subscribe_artist::{SubscribeArtist, SubscribeArtistHandler};

/// Publishes the event of a committed write, parking it on failure.
#[derive(Clone)]
pub struct EventEmitter {
    publisher: Arc<dyn EventPublisher>,
    outbox: Option<Arc<Outbox>>,
}

impl EventEmitter {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            publisher,
            outbox: None,
        }
    }

    pub fn with_outbox(mut self, outbox: Arc<Outbox>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// # Errors
    /// Returns `CatalogError::Publish` if the broker did not accept the event
    pub async fn emit(&self, event: EventMessage) -> Result<(), CatalogError> {
        let routing_key = event.routing_key();

        if let Err(err) = self.publisher.publish(&event, routing_key).await {
            error!(routing_key, "event lost after commit: {}", err);
            if let Some(outbox) = &self.outbox {
                outbox.park(event, routing_key, &err);
            }
            return Err(CatalogError::Publish(err.to_string()));
        }

        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}
