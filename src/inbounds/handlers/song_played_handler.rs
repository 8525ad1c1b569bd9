use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::EventHandler;
use crate::domain::{
    error::CatalogError,
    events::{EVENT_ID_HEADER, EventKind, Headers, SongPlayed, decode},
    services::stores::SongProjection,
};

/// Counts plays on the song document.
///
/// A play for a song whose document is not projected yet is retried, like a
/// song arriving before its album. Redelivered plays are recognised by their
/// `event_id` header and counted once.
pub struct SongPlayedHandler {
    songs: Arc<dyn SongProjection>,
}

impl SongPlayedHandler {
    pub fn new(songs: Arc<dyn SongProjection>) -> Self {
        Self { songs }
    }
}

#[async_trait]
impl EventHandler for SongPlayedHandler {
    fn event_kind(&self) -> EventKind {
        EventKind::SongPlayed
    }

    async fn handle(&self, payload: &[u8], headers: &Headers) -> Result<(), CatalogError> {
        let played: SongPlayed = decode(payload)?;
        let event_id = headers.get(EVENT_ID_HEADER).cloned();
        let plays = self.songs.increment_plays(played.song_id, event_id).await?;
        debug!(event_id = super::event_id(headers), song_id = %played.song_id, plays, "play counted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        events::EventMessage,
        models::{Album, Artist, Gender, Song, SongDocument},
        services::stores::{MockSongProjection, ProjectionStore},
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn redelivered_play_is_counted_once() {
        let store = Arc::new(ProjectionStore::new());
        let ramones = Artist::new("Ramones", Gender::from("Punk"));
        let album = Album::new("Rocket to Russia", 1977, ramones.clone());
        let song = Song::new(1, "Cretin Hop", album, ramones);
        store.create_song(SongDocument::from(&song)).await.unwrap();

        let handler = SongPlayedHandler::new(store.clone());
        let event = EventMessage::encode(&SongPlayed { song_id: song.id }).unwrap();
        handler.handle(&event.payload, &event.headers).await.unwrap();
        handler.handle(&event.payload, &event.headers).await.unwrap();

        let doc = store.get_song_by_id(song.id).await.unwrap();
        assert_eq!(doc.plays, 1);

        let replayed = EventMessage::encode(&SongPlayed { song_id: song.id }).unwrap();
        handler.handle(&replayed.payload, &replayed.headers).await.unwrap();
        assert_eq!(store.get_song_by_id(song.id).await.unwrap().plays, 2);
    }

    #[tokio::test]
    async fn event_id_header_reaches_the_store() {
        let event = EventMessage::encode(&SongPlayed {
            song_id: Uuid::new_v4(),
        })
        .unwrap();
        let expected = event.event_id().map(str::to_owned);

        let mut songs = MockSongProjection::new();
        songs
            .expect_increment_plays()
            .withf(move |_, event_id| *event_id == expected)
            .times(1)
            .returning(|_, _| Ok(1));

        SongPlayedHandler::new(Arc::new(songs))
            .handle(&event.payload, &event.headers)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn play_before_song_is_transient() {
        let mut songs = MockSongProjection::new();
        songs
            .expect_increment_plays()
            .returning(|id, _| Err(CatalogError::not_found("song", id)));

        let event = EventMessage::encode(&SongPlayed {
            song_id: Uuid::new_v4(),
        })
        .unwrap();
        let err = SongPlayedHandler::new(Arc::new(songs))
            .handle(&event.payload, &event.headers)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn missing_song_id_is_poison() {
        let songs = MockSongProjection::new();
        let err = SongPlayedHandler::new(Arc::new(songs))
            .handle(br#"{"id":"nope"}"#, &Headers::new())
            .await
            .unwrap_err();
        assert!(err.is_poison());
    }
}
