use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{AlbumProjection, ArtistProjection, SongProjection};
use crate::domain::{
    error::CatalogError,
    models::{AlbumDocument, ArtistDocument, SongDocument, SongSummary},
};

/// In-memory read store holding one collection per document kind.
///
/// Every create is an upsert keyed by document id, so applying the same event
/// twice leaves a single document behind. Counted plays are remembered by
/// event id for the same reason.
#[derive(Debug, Default)]
pub struct ProjectionStore {
    artists: RwLock<HashMap<Uuid, ArtistDocument>>,
    albums: RwLock<HashMap<Uuid, AlbumDocument>>,
    songs: RwLock<HashMap<Uuid, SongDocument>>,
    counted_plays: RwLock<HashSet<String>>,
}

impl ProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artist_count(&self) -> usize {
        self.artists.read().len()
    }

    pub fn album_count(&self) -> usize {
        self.albums.read().len()
    }

    pub fn song_count(&self) -> usize {
        self.songs.read().len()
    }
}

#[async_trait]
impl ArtistProjection for ProjectionStore {
    async fn create_artist(&self, doc: ArtistDocument) -> Result<(), CatalogError> {
        debug!(artist_id = %doc.id, "upserting artist document");
        self.artists.write().insert(doc.id, doc);
        Ok(())
    }

    async fn get_artist_by_id(&self, id: Uuid) -> Result<ArtistDocument, CatalogError> {
        self.artists
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("artist", id))
    }
}

#[async_trait]
impl AlbumProjection for ProjectionStore {
    async fn create_album(&self, mut doc: AlbumDocument) -> Result<(), CatalogError> {
        debug!(album_id = %doc.id, "upserting album document");
        let mut albums = self.albums.write();
        if let Some(existing) = albums.remove(&doc.id) {
            for song in existing.songs {
                doc.upsert_song(song);
            }
        }
        albums.insert(doc.id, doc);
        Ok(())
    }

    async fn append_song_to_album(
        &self,
        album_id: Uuid,
        song: SongSummary,
    ) -> Result<(), CatalogError> {
        let mut albums = self.albums.write();
        let album = albums
            .get_mut(&album_id)
            .ok_or_else(|| CatalogError::not_found("album", album_id))?;
        debug!(album_id = %album_id, song_id = %song.id, "appending song to album document");
        album.upsert_song(song);
        Ok(())
    }

    async fn get_album_by_id(&self, id: Uuid) -> Result<AlbumDocument, CatalogError> {
        self.albums
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("album", id))
    }

    async fn get_albums_by_artist_id(
        &self,
        artist_id: Uuid,
    ) -> Result<Vec<AlbumDocument>, CatalogError> {
        let mut albums: Vec<AlbumDocument> = self
            .albums
            .read()
            .values()
            .filter(|album| album.artist.id == artist_id)
            .cloned()
            .collect();
        albums.sort_by(|a, b| {
            a.release_year
                .cmp(&b.release_year)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(albums)
    }
}

#[async_trait]
impl SongProjection for ProjectionStore {
    async fn create_song(&self, mut doc: SongDocument) -> Result<(), CatalogError> {
        debug!(song_id = %doc.id, "upserting song document");
        let mut songs = self.songs.write();
        if let Some(existing) = songs.get(&doc.id) {
            doc.plays = existing.plays;
        }
        songs.insert(doc.id, doc);
        Ok(())
    }

    async fn increment_plays(
        &self,
        song_id: Uuid,
        event_id: Option<String>,
    ) -> Result<u64, CatalogError> {
        // songs before counted_plays, both held until the count is settled
        let mut songs = self.songs.write();
        let song = songs
            .get_mut(&song_id)
            .ok_or_else(|| CatalogError::not_found("song", song_id))?;

        if let Some(event_id) = event_id {
            let mut counted = self.counted_plays.write();
            if !counted.insert(event_id) {
                debug!(song_id = %song_id, "play already counted");
                return Ok(song.plays);
            }
        }
        song.plays += 1;
        Ok(song.plays)
    }

    async fn get_song_by_id(&self, id: Uuid) -> Result<SongDocument, CatalogError> {
        self.songs
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("song", id))
    }
}
