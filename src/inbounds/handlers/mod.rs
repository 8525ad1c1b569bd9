/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - album_published_handler                              |
/// |   - artist_subscribed_handler                            |
/// |   - song_played_handler                                  |
/// |   - song_published_handler                               |
/// +----------------------------------------------------------+

/// Projection of `AlbumPublished` events
pub mod album_published_handler;

/// Projection of `ArtistSubscribed` events
pub mod artist_subscribed_handler;

/// Projection of `SongPlayed` events
pub mod song_played_handler;

/// Projection of `SongPublished` events
pub mod song_published_handler;

use async_trait::async_trait;

use crate::domain::{
    error::CatalogError,
    events::{EVENT_ID_HEADER, EventKind, Headers},
};

pub use album_published_handler::AlbumPublishedHandler;
pub use artist_subscribed_handler::ArtistSubscribedHandler;
pub use song_played_handler::SongPlayedHandler;
pub use song_published_handler::SongPublishedHandler;

/// Applies one kind of event to the read store.
///
/// Handlers must tolerate seeing the same message more than once.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// The event kind this handler consumes
    fn event_kind(&self) -> EventKind;

    /// Decodes and applies the raw message.
    ///
    /// # Errors
    /// * `CatalogError::MalformedPayload` - the payload can never be applied
    /// * any other error - the message should be offered again later
    async fn handle(&self, payload: &[u8], headers: &Headers) -> Result<(), CatalogError>;
}

fn event_id(headers: &Headers) -> &str {
    headers
        .get(EVENT_ID_HEADER)
        .map(String::as_str)
        .unwrap_or("-")
}
