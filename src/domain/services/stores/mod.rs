//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Store capabilities. Each trait is the narrow set of operations one kind of handler needs, so a
// handler can only reach what it uses. Concrete stores implement several of them and are
// composed at wiring time.
//
// | Trait                    | Side   | Used by                                             |
// |--------------------------|--------|----------------------------------------------------|
// | ArtistRepository         | write  | SubscribeArtist, PublishAlbum, PublishSong          |
// | AlbumRepository          | write  | PublishAlbum, PublishSong                           |
// | SongRepository           | write  | PublishSong, PlaySong                               |
// | ArtistProjection         | read   | ArtistSubscribed handler, GetArtist                 |
// | AlbumProjection          | read   | AlbumPublished/SongPublished handlers, GetAlbum     |
// | SongProjection           | read   | SongPublished/SongPlayed handlers, GetSong          |
//--------------------------------------------------------------------------------------------------

mod catalog_store;
mod projection_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    error::CatalogError,
    models::{Album, AlbumDocument, Artist, ArtistDocument, Song, SongDocument, SongSummary},
};

pub use catalog_store::CatalogStore;
pub use projection_store::ProjectionStore;

/// Write-side artist capability.
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Inserts a new artist and returns its id.
    ///
    /// # Errors
    /// * `CatalogError::Persistence` - the insert failed
    async fn create_artist(&self, artist: &Artist) -> Result<Uuid, CatalogError>;

    /// # Errors
    /// * `CatalogError::NotFound` - no artist with this id
    async fn get_artist_by_id(&self, id: Uuid) -> Result<Artist, CatalogError>;
}

/// Write-side album capability.
#[async_trait]
pub trait AlbumRepository: Send + Sync {
    /// Inserts a new album and returns its id.
    ///
    /// # Errors
    /// * `CatalogError::Persistence` - the insert failed
    async fn create_album(&self, album: &Album) -> Result<Uuid, CatalogError>;

    /// # Errors
    /// * `CatalogError::NotFound` - no album with this id
    async fn get_album_by_id(&self, id: Uuid) -> Result<Album, CatalogError>;
}

/// Write-side song capability.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Inserts a new song and returns its id.
    ///
    /// # Errors
    /// * `CatalogError::Persistence` - the insert failed
    async fn create_song(&self, song: &Song) -> Result<Uuid, CatalogError>;

    /// # Errors
    /// * `CatalogError::NotFound` - no song with this id
    async fn get_song_by_id(&self, id: Uuid) -> Result<Song, CatalogError>;
}

/// Read-side artist capability.
#[async_trait]
pub trait ArtistProjection: Send + Sync {
    /// Inserts or replaces the document with the same id.
    async fn create_artist(&self, doc: ArtistDocument) -> Result<(), CatalogError>;

    async fn get_artist_by_id(&self, id: Uuid) -> Result<ArtistDocument, CatalogError>;
}

/// Read-side album capability.
#[async_trait]
pub trait AlbumProjection: Send + Sync {
    /// Inserts or replaces the document with the same id.
    ///
    /// Song summaries already embedded in a stored document are kept.
    async fn create_album(&self, doc: AlbumDocument) -> Result<(), CatalogError>;

    /// Adds a song summary to an existing album document.
    ///
    /// # Errors
    /// * `CatalogError::NotFound` - the album document does not exist yet
    async fn append_song_to_album(
        &self,
        album_id: Uuid,
        song: SongSummary,
    ) -> Result<(), CatalogError>;

    async fn get_album_by_id(&self, id: Uuid) -> Result<AlbumDocument, CatalogError>;

    /// Every album document whose embedded artist has this id, oldest release first.
    async fn get_albums_by_artist_id(
        &self,
        artist_id: Uuid,
    ) -> Result<Vec<AlbumDocument>, CatalogError>;
}

/// Read-side song capability.
#[async_trait]
pub trait SongProjection: Send + Sync {
    /// Inserts or replaces the document with the same id.
    ///
    /// The play counter of a stored document is kept.
    async fn create_song(&self, doc: SongDocument) -> Result<(), CatalogError>;

    /// Adds one play to a song document and returns the new count.
    ///
    /// A play whose `event_id` was already counted leaves the counter as it is.
    /// Plays without an id are always counted.
    ///
    /// # Errors
    /// * `CatalogError::NotFound` - the song document does not exist yet
    async fn increment_plays(
        &self,
        song_id: Uuid,
        event_id: Option<String>,
    ) -> Result<u64, CatalogError>;

    async fn get_song_by_id(&self, id: Uuid) -> Result<SongDocument, CatalogError>;
}

#[cfg(test)]
use mockall::*;

#[cfg(test)]
mock! {
    pub ArtistRepository {}

    #[async_trait]
    impl ArtistRepository for ArtistRepository {
        async fn create_artist(&self, artist: &Artist) -> Result<Uuid, CatalogError>;
        async fn get_artist_by_id(&self, id: Uuid) -> Result<Artist, CatalogError>;
    }
}

#[cfg(test)]
mock! {
    pub AlbumRepository {}

    #[async_trait]
    impl AlbumRepository for AlbumRepository {
        async fn create_album(&self, album: &Album) -> Result<Uuid, CatalogError>;
        async fn get_album_by_id(&self, id: Uuid) -> Result<Album, CatalogError>;
    }
}

#[cfg(test)]
mock! {
    pub SongRepository {}

    #[async_trait]
    impl SongRepository for SongRepository {
        async fn create_song(&self, song: &Song) -> Result<Uuid, CatalogError>;
        async fn get_song_by_id(&self, id: Uuid) -> Result<Song, CatalogError>;
    }
}

#[cfg(test)]
mock! {
    pub AlbumProjection {}

    #[async_trait]
    impl AlbumProjection for AlbumProjection {
        async fn create_album(&self, doc: AlbumDocument) -> Result<(), CatalogError>;
        async fn append_song_to_album(&self, album_id: Uuid, song: SongSummary) -> Result<(), CatalogError>;
        async fn get_album_by_id(&self, id: Uuid) -> Result<AlbumDocument, CatalogError>;
        async fn get_albums_by_artist_id(&self, artist_id: Uuid) -> Result<Vec<AlbumDocument>, CatalogError>;
    }
}

#[cfg(test)]
mock! {
    pub SongProjection {}

    #[async_trait]
    impl SongProjection for SongProjection {
        async fn create_song(&self, doc: SongDocument) -> Result<(), CatalogError>;
        async fn increment_plays(&self, song_id: Uuid, event_id: Option<String>) -> Result<u64, CatalogError>;
        async fn get_song_by_id(&self, id: Uuid) -> Result<SongDocument, CatalogError>;
    }
}
