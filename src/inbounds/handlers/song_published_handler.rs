use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{EventHandler, event_id};
use crate::domain::{
    error::CatalogError,
    events::{EventKind, Headers, decode},
    models::{Song, SongDocument, SongSummary},
    services::stores::{AlbumProjection, SongProjection},
};

/// Projects a song into its own document and into its album's song list.
///
/// The album document has to exist for the second step. Until the album event
/// has been projected the handler fails with `NotFound` and the message comes
/// back through redelivery; both steps are upserts, so the retry is harmless.
pub struct SongPublishedHandler {
    songs: Arc<dyn SongProjection>,
    albums: Arc<dyn AlbumProjection>,
}

impl SongPublishedHandler {
    pub fn new(songs: Arc<dyn SongProjection>, albums: Arc<dyn AlbumProjection>) -> Self {
        Self { songs, albums }
    }
}

#[async_trait]
impl EventHandler for SongPublishedHandler {
    fn event_kind(&self) -> EventKind {
        EventKind::SongPublished
    }

    async fn handle(&self, payload: &[u8], headers: &Headers) -> Result<(), CatalogError> {
        let song: Song = decode(payload)?;
        info!(event_id = event_id(headers), song_id = %song.id, "projecting song");

        self.songs.create_song(SongDocument::from(&song)).await?;

        self.albums
            .append_song_to_album(song.album.id, SongSummary::from(&song))
            .await
            .inspect_err(|err| {
                warn!(song_id = %song.id, album_id = %song.album.id, "song not attached to album: {}", err)
            })
    }
}
