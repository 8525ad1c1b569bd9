//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | Gender          | Free-form genre tag attached to an artist        | new, as_str         |
// | Artist          | Write-side artist                                | new                 |
// | Album           | Write-side album, carries its artist snapshot    | new                 |
// | Song            | Write-side song, carries album and artist        | new                 |
//--------------------------------------------------------------------------------------------------

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a fresh entity identifier.
///
/// Identifiers are only ever assigned on the write path and never change.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Genre tag of an artist ("Punk", "Rock", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gender(String);

impl Gender {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An artist as stored by the write side.
///
/// The albums an artist owns are not tracked here; that back-reference only
/// exists on the read side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub gender: Gender,
}

impl Artist {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            gender,
        }
    }
}

/// An album together with the artist it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: Uuid,
    pub title: String,
    pub artist: Artist,
    pub release_year: i32,
}

impl Album {
    pub fn new(title: impl Into<String>, release_year: i32, artist: Artist) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            artist,
            release_year,
        }
    }
}

/// A song with copies of its album and artist.
///
/// `artist` is resolved separately from `album.artist` when the song is
/// published, so it always reflects the write store at that moment. Play
/// counts are not part of the write model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub track_number: u32,
    pub title: String,
    pub album: Album,
    pub artist: Artist,
}

impl Song {
    pub fn new(track_number: u32, title: impl Into<String>, album: Album, artist: Artist) -> Self {
        Self {
            id: new_id(),
            track_number,
            title: title.into(),
            album,
            artist,
        }
    }
}
