//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | ArtistDocument  | Read-side artist                                 | from                |
// | AlbumDocument   | Read-side album with artist and song summaries   | from, upsert_song   |
// | SongDocument    | Read-side song with album summary and artist     | from                |
// | SongSummary     | Trimmed song embedded in an album document       | from                |
// | AlbumSummary    | Trimmed album embedded in a song document        | from                |
//--------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{Album, Artist, Gender, Song};

/// Self-contained artist projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDocument {
    pub id: Uuid,
    pub name: String,
    pub gender: Gender,
}

impl From<&Artist> for ArtistDocument {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name.clone(),
            gender: artist.gender.clone(),
        }
    }
}

/// Song fields kept inside an album document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: Uuid,
    pub track_number: u32,
    pub title: String,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            track_number: song.track_number,
            title: song.title.clone(),
        }
    }
}

/// Album fields kept inside a song document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub id: Uuid,
    pub title: String,
    pub release_year: i32,
}

impl From<&Album> for AlbumSummary {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id,
            title: album.title.clone(),
            release_year: album.release_year,
        }
    }
}

/// Self-contained album projection.
///
/// `songs` grows as song events arrive and is kept in track order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDocument {
    pub id: Uuid,
    pub title: String,
    pub release_year: i32,
    pub artist: ArtistDocument,
    pub songs: Vec<SongSummary>,
}

impl AlbumDocument {
    /// Adds a song summary, replacing any summary with the same id
    pub fn upsert_song(&mut self, summary: SongSummary) {
        match self.songs.iter_mut().find(|song| song.id == summary.id) {
            Some(existing) => *existing = summary,
            None => self.songs.push(summary),
        }
        self.songs.sort_by_key(|song| song.track_number);
    }
}

impl From<&Album> for AlbumDocument {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id,
            title: album.title.clone(),
            release_year: album.release_year,
            artist: ArtistDocument::from(&album.artist),
            songs: Vec::new(),
        }
    }
}

/// Self-contained song projection, the only place play counts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDocument {
    pub id: Uuid,
    pub track_number: u32,
    pub title: String,
    pub plays: u64,
    pub album: AlbumSummary,
    pub artist: ArtistDocument,
}

impl From<&Song> for SongDocument {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id,
            track_number: song.track_number,
            title: song.title.clone(),
            plays: 0,
            album: AlbumSummary::from(&song.album),
            artist: ArtistDocument::from(&song.artist),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocket_to_russia() -> Album {
        let ramones = Artist::new("Ramones", Gender::from("Punk"));
        Album::new("Rocket to Russia", 1977, ramones)
    }

    #[test]
    fn upsert_song_keeps_track_order_and_replaces_duplicates() {
        let album = rocket_to_russia();
        let artist = album.artist.clone();
        let mut doc = AlbumDocument::from(&album);

        let second = Song::new(2, "Rockaway Beach", album.clone(), artist.clone());
        let first = Song::new(1, "Cretin Hop", album.clone(), artist);

        doc.upsert_song(SongSummary::from(&second));
        doc.upsert_song(SongSummary::from(&first));
        doc.upsert_song(SongSummary::from(&first));

        let titles: Vec<_> = doc.songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Cretin Hop", "Rockaway Beach"]);
    }

    #[test]
    fn song_document_embeds_trimmed_album() {
        let album = rocket_to_russia();
        let song = Song::new(1, "Cretin Hop", album.clone(), album.artist.clone());
        let doc = SongDocument::from(&song);

        assert_eq!(doc.plays, 0);
        assert_eq!(doc.album.title, "Rocket to Russia");
        assert_eq!(doc.artist.name, "Ramones");
    }
}
