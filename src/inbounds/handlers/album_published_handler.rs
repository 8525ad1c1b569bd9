use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{EventHandler, event_id};
use crate::domain::{
    error::CatalogError,
    events::{EventKind, Headers, decode},
    models::{Album, AlbumDocument},
    services::stores::AlbumProjection,
};

pub struct AlbumPublishedHandler {
    albums: Arc<dyn AlbumProjection>,
}

impl AlbumPublishedHandler {
    pub fn new(albums: Arc<dyn AlbumProjection>) -> Self {
        Self { albums }
    }
}

#[async_trait]
impl EventHandler for AlbumPublishedHandler {
    fn event_kind(&self) -> EventKind {
        EventKind::AlbumPublished
    }

    async fn handle(&self, payload: &[u8], headers: &Headers) -> Result<(), CatalogError> {
        let album: Album = decode(payload)?;
        info!(event_id = event_id(headers), album_id = %album.id, "projecting album");

        self.albums.create_album(AlbumDocument::from(&album)).await
    }
}
