//! Replays a known catalogue through the command handlers.

use tracing::info;

use crate::{
    app::Catalog,
    domain::{
        error::CatalogError,
        models::{Album, Artist, Gender, Song},
        services::commands::{PublishAlbum, PublishSong, SubscribeArtist},
    },
};

/// Track list of "Rocket to Russia" (Ramones, 1977)
pub const ROCKET_TO_RUSSIA: [&str; 14] = [
    "Cretin Hop",
    "Rockaway Beach",
    "Here Today, Gone Tomorrow",
    "Locket Love",
    "I Don't Care",
    "Sheena Is a Punk Rocker",
    "We're a Happy Family",
    "Teenage Lobotomy",
    "Do You Wanna Dance?",
    "I Wanna Be Well",
    "I Can't Give You Anything",
    "Ramona",
    "Surfin' Bird",
    "Why Is It Always This Way?",
];

#[derive(Debug, Clone)]
pub struct SeedReport {
    pub artist: Artist,
    pub album: Album,
    pub songs: Vec<Song>,
}

/// Subscribes the Ramones, publishes "Rocket to Russia" and all of its tracks.
///
/// # Errors
/// Stops at the first failing command and returns its error.
pub async fn rocket_to_russia(catalog: &Catalog) -> Result<SeedReport, CatalogError> {
    let artist = catalog
        .subscribe_artist
        .execute(SubscribeArtist {
            name: "Ramones".to_owned(),
            gender: Gender::from("Punk"),
        })
        .await?;

    let album = catalog
        .publish_album
        .execute(PublishAlbum {
            title: "Rocket to Russia".to_owned(),
            release_year: 1977,
            artist_id: artist.id,
        })
        .await?;

    let mut songs = Vec::with_capacity(ROCKET_TO_RUSSIA.len());
    for (track, title) in (1u32..).zip(ROCKET_TO_RUSSIA) {
        let song = catalog
            .publish_song
            .execute(PublishSong {
                track_number: track,
                title: title.to_owned(),
                album_id: album.id,
            })
            .await?;
        songs.push(song);
    }

    info!(artist_id = %artist.id, album_id = %album.id, songs = songs.len(), "catalogue seeded");
    Ok(SeedReport {
        artist,
        album,
        songs,
    })
}
