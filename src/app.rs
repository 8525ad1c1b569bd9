//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | Catalog         | Command and query handlers wired to their stores | new, with_outbox    |
// | Projections     | The four projection handlers over one read store | new, handler_for    |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use crate::domain::{
    events::EventKind,
    services::{
        commands::{
            PlaySongHandler, PublishAlbumHandler, PublishSongHandler, SubscribeArtistHandler,
        },
        outbox::Outbox,
        publisher::EventPublisher,
        queries::{GetAlbumHandler, GetAlbumsByArtistHandler, GetArtistHandler, GetSongHandler},
        stores::{CatalogStore, ProjectionStore},
    },
};
use crate::inbounds::handlers::{
    AlbumPublishedHandler, ArtistSubscribedHandler, EventHandler, SongPlayedHandler,
    SongPublishedHandler,
};

/// Every command and query handler of the catalog.
///
/// Each handler only receives the store capabilities it uses; the concrete
/// stores are shared underneath.
pub struct Catalog {
    pub subscribe_artist: SubscribeArtistHandler,
    pub publish_album: PublishAlbumHandler,
    pub publish_song: PublishSongHandler,
    pub play_song: PlaySongHandler,
    pub get_artist: GetArtistHandler,
    pub get_album: GetAlbumHandler,
    pub get_albums_by_artist: GetAlbumsByArtistHandler,
    pub get_song: GetSongHandler,
}

impl Catalog {
    pub fn new(
        write: Arc<CatalogStore>,
        read: Arc<ProjectionStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscribe_artist: SubscribeArtistHandler::new(write.clone(), publisher.clone()),
            publish_album: PublishAlbumHandler::new(write.clone(), write.clone(), publisher.clone()),
            publish_song: PublishSongHandler::new(
                write.clone(),
                write.clone(),
                write.clone(),
                publisher.clone(),
            ),
            play_song: PlaySongHandler::new(write, publisher),
            get_artist: GetArtistHandler::new(read.clone()),
            get_album: GetAlbumHandler::new(read.clone()),
            get_albums_by_artist: GetAlbumsByArtistHandler::new(read.clone()),
            get_song: GetSongHandler::new(read),
        }
    }

    /// Parks events whose publish failed in `outbox`
    pub fn with_outbox(self, outbox: Arc<Outbox>) -> Self {
        Self {
            subscribe_artist: self.subscribe_artist.with_outbox(outbox.clone()),
            publish_album: self.publish_album.with_outbox(outbox.clone()),
            publish_song: self.publish_song.with_outbox(outbox.clone()),
            play_song: self.play_song.with_outbox(outbox),
            ..self
        }
    }
}

/// Projection handlers keyed by the event kind they consume.
pub struct Projections {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl Projections {
    pub fn new(read: Arc<ProjectionStore>) -> Self {
        let handlers: Vec<Arc<dyn EventHandler>> = vec![
            Arc::new(ArtistSubscribedHandler::new(read.clone())),
            Arc::new(AlbumPublishedHandler::new(read.clone())),
            Arc::new(SongPublishedHandler::new(read.clone(), read.clone())),
            Arc::new(SongPlayedHandler::new(read)),
        ];
        Self { handlers }
    }

    pub fn handler_for(&self, kind: EventKind) -> Option<Arc<dyn EventHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.event_kind() == kind)
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn EventHandler>> {
        self.handlers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_projection_per_event_kind() {
        let projections = Projections::new(Arc::new(ProjectionStore::new()));
        for kind in EventKind::ALL {
            let handler = projections.handler_for(kind).unwrap();
            assert_eq!(handler.event_kind(), kind);
        }
        assert_eq!(projections.iter().count(), EventKind::ALL.len());
    }
}
