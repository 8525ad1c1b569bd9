use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::{EventEmitter, require_text};
use crate::domain::{
    error::CatalogError,
    events::EventMessage,
    models::{Artist, Gender},
    services::{outbox::Outbox, publisher::EventPublisher, stores::ArtistRepository},
};

/// Registers a new artist.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeArtist {
    pub name: String,
    pub gender: Gender,
}

pub struct SubscribeArtistHandler {
    artists: Arc<dyn ArtistRepository>,
    emitter: EventEmitter,
}

impl SubscribeArtistHandler {
    pub fn new(artists: Arc<dyn ArtistRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            artists,
            emitter: EventEmitter::new(publisher),
        }
    }

    pub fn with_outbox(mut self, outbox: Arc<Outbox>) -> Self {
        self.emitter = self.emitter.with_outbox(outbox);
        self
    }

    /// Persists a new artist and emits `ArtistSubscribed` with its full snapshot.
    ///
    /// # Errors
    /// * `CatalogError::Invalid` - empty name
    /// * `CatalogError::Persistence` - the insert failed, nothing was published
    /// * `CatalogError::Publish` - the artist is stored but the event was not accepted
    pub async fn execute(&self, command: SubscribeArtist) -> Result<Artist, CatalogError> {
        require_text("name", &command.name)?;

        let artist = Artist::new(command.name, command.gender);
        let event = EventMessage::encode(&artist)?;

        self.artists.create_artist(&artist).await?;
        info!(artist_id = %artist.id, name = %artist.name, "artist subscribed");

        self.emitter.emit(event).await?;
        Ok(artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        events::{EventKind, decode},
        services::{publisher::MockEventPublisher, stores::MockArtistRepository},
    };
    use parking_lot::Mutex;

    fn ramones() -> SubscribeArtist {
        SubscribeArtist {
            name: "Ramones".into(),
            gender: Gender::from("Punk"),
        }
    }

    #[tokio::test]
    async fn emitted_event_carries_the_artist() {
        let mut artists = MockArtistRepository::new();
        artists.expect_create_artist().times(1).returning(|a| Ok(a.id));

        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = published.clone();
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(1).returning(move |event, key| {
            sink.lock().push((event.clone(), key.to_owned()));
            Ok(())
        });

        let handler = SubscribeArtistHandler::new(Arc::new(artists), Arc::new(publisher));
        let artist = handler.execute(ramones()).await.unwrap();
        assert!(!artist.id.is_nil());

        let published = published.lock();
        let (event, key) = &published[0];
        assert_eq!(event.kind, EventKind::ArtistSubscribed);
        assert_eq!(key, "ARTIST_SUBSCRIBED");

        let decoded: Artist = decode(&event.payload).unwrap();
        assert_eq!(decoded.name, "Ramones");
        assert_eq!(decoded.gender, Gender::from("Punk"));
        assert_eq!(decoded.id, artist.id);
    }

    #[tokio::test]
    async fn store_failure_skips_publish() {
        let mut artists = MockArtistRepository::new();
        artists
            .expect_create_artist()
            .returning(|_| Err(CatalogError::Persistence("disk full".into())));
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(0);

        let handler = SubscribeArtistHandler::new(Arc::new(artists), Arc::new(publisher));
        let err = handler.execute(ramones()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Persistence(_)));
    }

    #[tokio::test]
    async fn publish_failure_is_reported_after_commit() {
        let mut artists = MockArtistRepository::new();
        artists.expect_create_artist().times(1).returning(|a| Ok(a.id));
        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .returning(|_, _| Err(CatalogError::Transport("connection reset".into())));

        let handler = SubscribeArtistHandler::new(Arc::new(artists), Arc::new(publisher));
        let err = handler.execute(ramones()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Publish(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_the_store() {
        let mut artists = MockArtistRepository::new();
        artists.expect_create_artist().times(0);
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(0);

        let handler = SubscribeArtistHandler::new(Arc::new(artists), Arc::new(publisher));
        let err = handler
            .execute(SubscribeArtist {
                name: " ".into(),
                gender: Gender::from("Punk"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }
}
