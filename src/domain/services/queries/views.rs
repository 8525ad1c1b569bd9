use serde::Serialize;
use uuid::Uuid;

use crate::domain::models::{
    AlbumDocument, AlbumSummary, ArtistDocument, SongDocument, SongSummary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistView {
    pub id: Uuid,
    pub name: String,
    pub gender: String,
}

impl From<ArtistDocument> for ArtistView {
    fn from(doc: ArtistDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            gender: doc.gender.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumSongView {
    pub id: Uuid,
    pub track_number: u32,
    pub title: String,
}

impl From<SongSummary> for AlbumSongView {
    fn from(song: SongSummary) -> Self {
        Self {
            id: song.id,
            track_number: song.track_number,
            title: song.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumView {
    pub id: Uuid,
    pub title: String,
    pub artist: ArtistView,
    pub release_year: i32,
    pub songs: Vec<AlbumSongView>,
}

impl From<AlbumDocument> for AlbumView {
    fn from(doc: AlbumDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            artist: doc.artist.into(),
            release_year: doc.release_year,
            songs: doc.songs.into_iter().map(AlbumSongView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongAlbumView {
    pub id: Uuid,
    pub title: String,
    pub release_year: i32,
}

impl From<AlbumSummary> for SongAlbumView {
    fn from(album: AlbumSummary) -> Self {
        Self {
            id: album.id,
            title: album.title,
            release_year: album.release_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongView {
    pub id: Uuid,
    pub track_number: u32,
    pub title: String,
    pub plays: u64,
    pub album: SongAlbumView,
    pub artist: ArtistView,
}

impl From<SongDocument> for SongView {
    fn from(doc: SongDocument) -> Self {
        Self {
            id: doc.id,
            track_number: doc.track_number,
            title: doc.title,
            plays: doc.plays,
            album: doc.album.into(),
            artist: doc.artist.into(),
        }
    }
}
