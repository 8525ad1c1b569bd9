use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{EventHandler, event_id};
use crate::domain::{
    error::CatalogError,
    events::{EventKind, Headers, decode},
    models::{Artist, ArtistDocument},
    services::stores::ArtistProjection,
};

pub struct ArtistSubscribedHandler {
    artists: Arc<dyn ArtistProjection>,
}

impl ArtistSubscribedHandler {
    pub fn new(artists: Arc<dyn ArtistProjection>) -> Self {
        Self { artists }
    }
}

#[async_trait]
impl EventHandler for ArtistSubscribedHandler {
    fn event_kind(&self) -> EventKind {
        EventKind::ArtistSubscribed
    }

    async fn handle(&self, payload: &[u8], headers: &Headers) -> Result<(), CatalogError> {
        let artist: Artist = decode(payload)?;
        info!(event_id = event_id(headers), artist_id = %artist.id, "projecting artist");

        self.artists.create_artist(ArtistDocument::from(&artist)).await
    }
}
