//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Query handlers. They read projection documents by key and shape them into response views;
// they never touch the write store.
//
// | Handler                  | Reads                | Returns                               |
// |--------------------------|----------------------|---------------------------------------|
// | GetArtistHandler         | ArtistProjection     | ArtistView                            |
// | GetAlbumHandler          | AlbumProjection      | AlbumView                             |
// | GetAlbumsByArtistHandler | AlbumProjection      | Vec<AlbumView>                        |
// | GetSongHandler           | SongProjection       | SongView                              |
//--------------------------------------------------------------------------------------------------

mod views;

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::stores::{AlbumProjection, ArtistProjection, SongProjection};
use crate::domain::error::CatalogError;

pub use views::{AlbumSongView, AlbumView, ArtistView, SongAlbumView, SongView};

pub struct GetArtistHandler {
    artists: Arc<dyn ArtistProjection>,
}

impl GetArtistHandler {
    pub fn new(artists: Arc<dyn ArtistProjection>) -> Self {
        Self { artists }
    }

    /// # Errors
    /// * `CatalogError::NotFound` - no projection for this id (yet)
    pub async fn execute(&self, id: Uuid) -> Result<ArtistView, CatalogError> {
        debug!(artist_id = %id, "get artist");
        Ok(self.artists.get_artist_by_id(id).await?.into())
    }
}

pub struct GetAlbumHandler {
    albums: Arc<dyn AlbumProjection>,
}

impl GetAlbumHandler {
    pub fn new(albums: Arc<dyn AlbumProjection>) -> Self {
        Self { albums }
    }

    /// # Errors
    /// * `CatalogError::NotFound` - no projection for this id (yet)
    pub async fn execute(&self, id: Uuid) -> Result<AlbumView, CatalogError> {
        debug!(album_id = %id, "get album");
        Ok(self.albums.get_album_by_id(id).await?.into())
    }
}

pub struct GetAlbumsByArtistHandler {
    albums: Arc<dyn AlbumProjection>,
}

impl GetAlbumsByArtistHandler {
    pub fn new(albums: Arc<dyn AlbumProjection>) -> Self {
        Self { albums }
    }

    /// Lists the projected albums of an artist. An unknown artist yields an empty list.
    pub async fn execute(&self, artist_id: Uuid) -> Result<Vec<AlbumView>, CatalogError> {
        debug!(artist_id = %artist_id, "get albums by artist");
        let albums = self.albums.get_albums_by_artist_id(artist_id).await?;
        Ok(albums.into_iter().map(AlbumView::from).collect())
    }
}

pub struct GetSongHandler {
    songs: Arc<dyn SongProjection>,
}

impl GetSongHandler {
    pub fn new(songs: Arc<dyn SongProjection>) -> Self {
        Self { songs }
    }

    /// # Errors
    /// * `CatalogError::NotFound` - no projection for this id (yet)
    pub async fn execute(&self, id: Uuid) -> Result<SongView, CatalogError> {
        debug!(song_id = %id, "get song");
        Ok(self.songs.get_song_by_id(id).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        models::{Album, AlbumDocument, Artist, Gender, Song, SongDocument, SongSummary},
        services::stores::{MockAlbumProjection, MockSongProjection, ProjectionStore},
    };

    #[tokio::test]
    async fn album_view_lists_embedded_songs() {
        let ramones = Artist::new("Ramones", Gender::from("Punk"));
        let album = Album::new("Rocket to Russia", 1977, ramones.clone());
        let song = Song::new(1, "Cretin Hop", album.clone(), ramones);
        let mut doc = AlbumDocument::from(&album);
        doc.upsert_song(SongSummary::from(&song));

        let mut albums = MockAlbumProjection::new();
        albums
            .expect_get_album_by_id()
            .returning(move |_| Ok(doc.clone()));

        let view = GetAlbumHandler::new(Arc::new(albums))
            .execute(album.id)
            .await
            .unwrap();
        assert_eq!(view.artist.gender, "Punk");
        assert_eq!(view.songs[0].title, "Cretin Hop");
        assert_eq!(view.songs[0].track_number, 1);
    }

    #[tokio::test]
    async fn song_view_carries_plays() {
        let ramones = Artist::new("Ramones", Gender::from("Punk"));
        let album = Album::new("Rocket to Russia", 1977, ramones.clone());
        let song = Song::new(8, "Teenage Lobotomy", album, ramones);
        let mut doc = SongDocument::from(&song);
        doc.plays = 3;

        let mut songs = MockSongProjection::new();
        songs.expect_get_song_by_id().returning(move |_| Ok(doc.clone()));

        let view = GetSongHandler::new(Arc::new(songs)).execute(song.id).await.unwrap();
        assert_eq!(view.plays, 3);
        assert_eq!(view.album.release_year, 1977);
    }

    #[tokio::test]
    async fn missing_documents_are_not_found() {
        let store = Arc::new(ProjectionStore::new());
        let id = Uuid::new_v4();

        assert!(GetArtistHandler::new(store.clone()).execute(id).await.unwrap_err().is_not_found());
        assert!(GetAlbumHandler::new(store.clone()).execute(id).await.unwrap_err().is_not_found());
        assert!(GetSongHandler::new(store.clone()).execute(id).await.unwrap_err().is_not_found());
        assert!(GetAlbumsByArtistHandler::new(store).execute(id).await.unwrap().is_empty());
    }
}
