use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{EventEmitter, require_text};
use crate::domain::{
    error::CatalogError,
    events::EventMessage,
    models::Song,
    services::{
        outbox::Outbox,
        publisher::EventPublisher,
        stores::{AlbumRepository, ArtistRepository, SongRepository},
    },
};

/// Adds a track to an existing album.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishSong {
    pub track_number: u32,
    pub title: String,
    pub album_id: Uuid,
}

pub struct PublishSongHandler {
    artists: Arc<dyn ArtistRepository>,
    albums: Arc<dyn AlbumRepository>,
    songs: Arc<dyn SongRepository>,
    emitter: EventEmitter,
}

impl PublishSongHandler {
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        albums: Arc<dyn AlbumRepository>,
        songs: Arc<dyn SongRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            artists,
            albums,
            songs,
            emitter: EventEmitter::new(publisher),
        }
    }

    pub fn with_outbox(mut self, outbox: Arc<Outbox>) -> Self {
        self.emitter = self.emitter.with_outbox(outbox);
        self
    }

    /// Persists a new song and emits `SongPublished`.
    ///
    /// The album's artist is looked up again instead of trusting the copy the
    /// album carries.
    ///
    /// # Errors
    /// * `CatalogError::Invalid` - empty title or track number zero
    /// * `CatalogError::NotFound` - the album, or its artist, does not exist
    /// * `CatalogError::Persistence` - a store call failed
    /// * `CatalogError::Publish` - the song is stored but the event was not accepted
    pub async fn execute(&self, command: PublishSong) -> Result<Song, CatalogError> {
        require_text("title", &command.title)?;
        if command.track_number == 0 {
            return Err(CatalogError::Invalid(
                "track_number must be positive".to_owned(),
            ));
        }

        let album = self.albums.get_album_by_id(command.album_id).await?;
        let artist = self
            .artists
            .get_artist_by_id(album.artist.id)
            .await
            .inspect_err(|err| warn!(album_id = %album.id, "album artist did not resolve: {}", err))?;

        let song = Song::new(command.track_number, command.title, album, artist);
        let event = EventMessage::encode(&song)?;

        self.songs.create_song(&song).await?;
        info!(song_id = %song.id, album_id = %song.album.id, track = song.track_number, "song published");

        self.emitter.emit(event).await?;
        Ok(song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        events::decode,
        models::{Album, Artist, Gender},
        services::{
            publisher::MockEventPublisher,
            stores::{MockAlbumRepository, MockArtistRepository, MockSongRepository},
        },
    };

    fn rocket_to_russia() -> Album {
        Album::new(
            "Rocket to Russia",
            1977,
            Artist::new("Ramones", Gender::from("Punk")),
        )
    }

    fn cretin_hop(album_id: Uuid) -> PublishSong {
        PublishSong {
            track_number: 1,
            title: "Cretin Hop".into(),
            album_id,
        }
    }

    #[tokio::test]
    async fn missing_album_artist_is_not_found() {
        let album = rocket_to_russia();
        let album_id = album.id;

        let mut albums = MockAlbumRepository::new();
        albums
            .expect_get_album_by_id()
            .times(1)
            .returning(move |_| Ok(album.clone()));
        let mut artists = MockArtistRepository::new();
        artists
            .expect_get_artist_by_id()
            .times(1)
            .returning(|id| Err(CatalogError::not_found("artist", id)));
        let mut songs = MockSongRepository::new();
        songs.expect_create_song().times(0);
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(0);

        let handler = PublishSongHandler::new(
            Arc::new(artists),
            Arc::new(albums),
            Arc::new(songs),
            Arc::new(publisher),
        );
        let err = handler.execute(cretin_hop(album_id)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn missing_album_is_not_found() {
        let mut albums = MockAlbumRepository::new();
        albums
            .expect_get_album_by_id()
            .returning(|id| Err(CatalogError::not_found("album", id)));
        let mut artists = MockArtistRepository::new();
        artists.expect_get_artist_by_id().times(0);

        let handler = PublishSongHandler::new(
            Arc::new(artists),
            Arc::new(albums),
            Arc::new(MockSongRepository::new()),
            Arc::new(MockEventPublisher::new()),
        );
        let err = handler.execute(cretin_hop(Uuid::new_v4())).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn song_uses_the_re_resolved_artist() {
        let album = rocket_to_russia();
        let album_id = album.id;
        let mut fresh = album.artist.clone();
        fresh.name = "The Ramones".into();
        let resolved = fresh.clone();

        let mut albums = MockAlbumRepository::new();
        albums
            .expect_get_album_by_id()
            .returning(move |_| Ok(album.clone()));
        let mut artists = MockArtistRepository::new();
        artists
            .expect_get_artist_by_id()
            .returning(move |_| Ok(resolved.clone()));
        let mut songs = MockSongRepository::new();
        songs.expect_create_song().times(1).returning(|s| Ok(s.id));
        let mut publisher = MockEventPublisher::new();
        publisher.expect_publish().times(1).returning(|event, key| {
            assert_eq!(key, "SONG_PUBLISHED");
            let song: Song = decode(&event.payload).unwrap();
            assert_eq!(song.artist.name, "The Ramones");
            assert_eq!(song.album.title, "Rocket to Russia");
            Ok(())
        });

        let handler = PublishSongHandler::new(
            Arc::new(artists),
            Arc::new(albums),
            Arc::new(songs),
            Arc::new(publisher),
        );
        let song = handler.execute(cretin_hop(album_id)).await.unwrap();
        assert_eq!(song.artist, fresh);
        assert_eq!(song.track_number, 1);
    }

    #[tokio::test]
    async fn track_zero_is_invalid() {
        let mut albums = MockAlbumRepository::new();
        albums.expect_get_album_by_id().times(0);

        let handler = PublishSongHandler::new(
            Arc::new(MockArtistRepository::new()),
            Arc::new(albums),
            Arc::new(MockSongRepository::new()),
            Arc::new(MockEventPublisher::new()),
        );
        let mut cmd = cretin_hop(Uuid::new_v4());
        cmd.track_number = 0;
        assert!(matches!(
            handler.execute(cmd).await,
            Err(CatalogError::Invalid(_))
        ));
    }
}
