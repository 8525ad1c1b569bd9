use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{AlbumRepository, ArtistRepository, SongRepository};
use crate::domain::{
    error::CatalogError,
    models::{Album, Artist, Song},
};

/// In-memory authoritative write store.
///
/// Behaves like a relational store with primary and foreign keys: inserting an
/// id twice, or an album/song whose parents are unknown, fails with
/// `CatalogError::Persistence`. Each insert is atomic on its own.
#[derive(Debug, Default)]
pub struct CatalogStore {
    artists: RwLock<HashMap<Uuid, Artist>>,
    albums: RwLock<HashMap<Uuid, Album>>,
    songs: RwLock<HashMap<Uuid, Song>>,
}

impl CatalogStore {
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

fn duplicate(entity: &str, id: Uuid) -> CatalogError {
    CatalogError::Persistence(format!("duplicate {} id {}", entity, id))
}

fn dangling(entity: &str, id: Uuid) -> CatalogError {
    CatalogError::Persistence(format!("unknown {} reference {}", entity, id))
}

#[async_trait]
impl ArtistRepository for CatalogStore {
    async fn create_artist(&self, artist: &Artist) -> Result<Uuid, CatalogError> {
        let mut artists = self.artists.write();
        if artists.contains_key(&artist.id) {
            return Err(duplicate("artist", artist.id));
        }
        artists.insert(artist.id, artist.clone());
        debug!(artist_id = %artist.id, "artist row inserted");
        Ok(artist.id)
    }

    async fn get_artist_by_id(&self, id: Uuid) -> Result<Artist, CatalogError> {
        self.artists
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("artist", id))
    }
}

#[async_trait]
impl AlbumRepository for CatalogStore {
    async fn create_album(&self, album: &Album) -> Result<Uuid, CatalogError> {
        if !self.artists.read().contains_key(&album.artist.id) {
            return Err(dangling("artist", album.artist.id));
        }

        let mut albums = self.albums.write();
        if albums.contains_key(&album.id) {
            return Err(duplicate("album", album.id));
        }
        albums.insert(album.id, album.clone());
        debug!(album_id = %album.id, "album row inserted");
        Ok(album.id)
    }

    async fn get_album_by_id(&self, id: Uuid) -> Result<Album, CatalogError> {
        self.albums
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("album", id))
    }
}

#[async_trait]
impl SongRepository for CatalogStore {
    async fn create_song(&self, song: &Song) -> Result<Uuid, CatalogError> {
        if !self.albums.read().contains_key(&song.album.id) {
            return Err(dangling("album", song.album.id));
        }
        if !self.artists.read().contains_key(&song.artist.id) {
            return Err(dangling("artist", song.artist.id));
        }

        let mut songs = self.songs.write();
        if songs.contains_key(&song.id) {
            return Err(duplicate("song", song.id));
        }
        songs.insert(song.id, song.clone());
        debug!(song_id = %song.id, "song row inserted");
        Ok(song.id)
    }

    async fn get_song_by_id(&self, id: Uuid) -> Result<Song, CatalogError> {
        self.songs
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("song", id))
    }
}
