//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                   | Description                              | Key Methods         |
// |------------------------|------------------------------------------|---------------------|
// | SubscribeArtistRequest | Body of POST /artists                    | into_command        |
// | PublishAlbumRequest    | Body of POST /albums                     | into_command        |
// | PublishSongRequest     | Body of POST /songs                      | into_command        |
// | ArtistResponse         | Artist accepted by the write side        | from                |
// | AlbumResponse          | Album accepted by the write side         | from                |
// | SongResponse           | Song accepted by the write side          | from                |
// | PlayResponse           | Play accepted by the write side          | from                |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    events::SongPlayed,
    models::{Album, Artist, Gender, Song},
    services::commands::{PublishAlbum, PublishSong, SubscribeArtist},
};

/// Request to subscribe a new artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeArtistRequest {
    pub name: String,
    /// Free-form genre tag, e.g. "Punk"
    pub gender: String,
}

impl SubscribeArtistRequest {
    pub fn into_command(self) -> SubscribeArtist {
        SubscribeArtist {
            name: self.name,
            gender: Gender::new(self.gender),
        }
    }
}

/// Request to publish an album of an existing artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishAlbumRequest {
    pub title: String,
    pub release_year: i32,
    pub artist_id: Uuid,
}

impl PublishAlbumRequest {
    pub fn into_command(self) -> PublishAlbum {
        PublishAlbum {
            title: self.title,
            release_year: self.release_year,
            artist_id: self.artist_id,
        }
    }
}

/// Request to publish a song of an existing album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSongRequest {
    pub track_number: u32,
    pub title: String,
    pub album_id: Uuid,
}

impl PublishSongRequest {
    pub fn into_command(self) -> PublishSong {
        PublishSong {
            track_number: self.track_number,
            title: self.title,
            album_id: self.album_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistResponse {
    pub id: Uuid,
    pub name: String,
    pub gender: String,
}

impl From<Artist> for ArtistResponse {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            gender: artist.gender.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumResponse {
    pub id: Uuid,
    pub title: String,
    pub release_year: i32,
    pub artist_id: Uuid,
}

impl From<Album> for AlbumResponse {
    fn from(album: Album) -> Self {
        Self {
            id: album.id,
            title: album.title,
            release_year: album.release_year,
            artist_id: album.artist.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongResponse {
    pub id: Uuid,
    pub track_number: u32,
    pub title: String,
    pub album_id: Uuid,
    pub artist_id: Uuid,
}

impl From<Song> for SongResponse {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            track_number: song.track_number,
            title: song.title,
            album_id: song.album.id,
            artist_id: song.artist.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResponse {
    pub song_id: Uuid,
}

impl From<SongPlayed> for PlayResponse {
    fn from(event: SongPlayed) -> Self {
        Self {
            song_id: event.song_id,
        }
    }
}
