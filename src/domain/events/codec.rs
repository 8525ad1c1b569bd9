//--------------------------------------------------------------------------------------------------
// STRUCTS & ENUMS
//--------------------------------------------------------------------------------------------------
// | Name            | Description                                      | Key Methods         |
// |-----------------|--------------------------------------------------|---------------------|
// | EventKind       | Tag of every event the catalog emits             | routing_key         |
// | Event           | Payload types that travel as events              | KIND                |
// | SongPlayed      | Payload of a play                                |                     |
// | EventMessage    | Encoded payload + kind + headers                 | encode, event_id    |
//--------------------------------------------------------------------------------------------------
// | Functions                                                                                    |
// |   - decode: bytes to payload, MalformedPayload on any parse failure                         |
//--------------------------------------------------------------------------------------------------

use std::{collections::BTreeMap, fmt};

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::domain::{
    error::CatalogError,
    models::{Album, Artist, Song},
};

/// Header carrying a unique id per emitted event
pub const EVENT_ID_HEADER: &str = "event_id";
/// Header carrying the routing key of the event
pub const EVENT_KIND_HEADER: &str = "event_kind";
/// Header carrying the RFC 3339 emission time
pub const OCCURRED_AT_HEADER: &str = "occurred_at";

/// Open string-keyed header map sent with every event
pub type Headers = BTreeMap<String, String>;

/// Every event kind the catalog emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ArtistSubscribed,
    AlbumPublished,
    SongPublished,
    SongPlayed,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::ArtistSubscribed,
        EventKind::AlbumPublished,
        EventKind::SongPublished,
        EventKind::SongPlayed,
    ];

    /// Broker routing key of the event kind
    pub fn routing_key(self) -> &'static str {
        match self {
            EventKind::ArtistSubscribed => "ARTIST_SUBSCRIBED",
            EventKind::AlbumPublished => "ALBUM_PUBLISHED",
            EventKind::SongPublished => "SONG_PUBLISHED",
            EventKind::SongPlayed => "SONG_PLAYED",
        }
    }

    pub fn from_routing_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.routing_key() == key)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.routing_key())
    }
}

/// A payload type that can travel as an event.
pub trait Event: Serialize + DeserializeOwned {
    const KIND: EventKind;
}

impl Event for Artist {
    const KIND: EventKind = EventKind::ArtistSubscribed;
}

impl Event for Album {
    const KIND: EventKind = EventKind::AlbumPublished;
}

impl Event for Song {
    const KIND: EventKind = EventKind::SongPublished;
}

/// A song was played once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPlayed {
    pub song_id: Uuid,
}

impl Event for SongPlayed {
    const KIND: EventKind = EventKind::SongPlayed;
}

/// Transport-neutral encoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMessage {
    pub kind: EventKind,
    pub payload: Vec<u8>,
    pub headers: Headers,
}

impl EventMessage {
    /// Serializes an event and stamps its headers.
    ///
    /// # Errors
    /// Returns `CatalogError::Invalid` if the value cannot be represented as JSON.
    pub fn encode<E: Event>(event: &E) -> Result<Self, CatalogError> {
        let payload = serde_json::to_vec(event)
            .map_err(|err| CatalogError::Invalid(format!("cannot encode {}: {}", E::KIND, err)))?;

        let mut headers = Headers::new();
        headers.insert(EVENT_ID_HEADER.to_owned(), Uuid::new_v4().to_string());
        headers.insert(EVENT_KIND_HEADER.to_owned(), E::KIND.routing_key().to_owned());
        headers.insert(OCCURRED_AT_HEADER.to_owned(), Utc::now().to_rfc3339());

        Ok(Self {
            kind: E::KIND,
            payload,
            headers,
        })
    }

    pub fn routing_key(&self) -> &'static str {
        self.kind.routing_key()
    }

    pub fn event_id(&self) -> Option<&str> {
        self.headers.get(EVENT_ID_HEADER).map(String::as_str)
    }
}

/// Decodes an event payload.
///
/// # Errors
/// Returns `CatalogError::MalformedPayload` when the bytes are not the JSON
/// shape of `E`. No other error kind is ever produced here.
pub fn decode<E: Event>(payload: &[u8]) -> Result<E, CatalogError> {
    serde_json::from_slice(payload)
        .map_err(|err| CatalogError::MalformedPayload(format!("invalid {} payload: {}", E::KIND, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Gender;

    #[test]
    fn encode_stamps_headers() {
        let artist = Artist::new("Ramones", Gender::from("Punk"));
        let message = EventMessage::encode(&artist).unwrap();

        assert_eq!(message.kind, EventKind::ArtistSubscribed);
        assert_eq!(message.routing_key(), "ARTIST_SUBSCRIBED");
        assert_eq!(
            message.headers.get(EVENT_KIND_HEADER).map(String::as_str),
            Some("ARTIST_SUBSCRIBED")
        );
        assert!(message.event_id().is_some());
        assert!(message.headers.contains_key(OCCURRED_AT_HEADER));
    }

    #[test]
    fn every_encode_gets_a_new_event_id() {
        let played = SongPlayed {
            song_id: Uuid::new_v4(),
        };
        let first = EventMessage::encode(&played).unwrap();
        let second = EventMessage::encode(&played).unwrap();
        assert_ne!(first.event_id(), second.event_id());
        assert_eq!(first.payload, second.payload);
    }

    #[test]
    fn decode_returns_the_encoded_song() {
        let ramones = Artist::new("Ramones", Gender::from("Punk"));
        let album = Album::new("Rocket to Russia", 1977, ramones.clone());
        let song = Song::new(1, "Cretin Hop", album, ramones);

        let message = EventMessage::encode(&song).unwrap();
        let decoded: Song = decode(&message.payload).unwrap();
        assert_eq!(decoded, song);
    }

    #[test]
    fn song_payload_uses_snake_case_fields() {
        let ramones = Artist::new("Ramones", Gender::from("Punk"));
        let album = Album::new("Rocket to Russia", 1977, ramones.clone());
        let song = Song::new(3, "Here Today, Gone Tomorrow", album, ramones);

        let json: serde_json::Value =
            serde_json::from_slice(&EventMessage::encode(&song).unwrap().payload).unwrap();
        assert_eq!(json["track_number"], 3);
        assert_eq!(json["album"]["release_year"], 1977);
        assert_eq!(json["artist"]["name"], "Ramones");
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode::<Artist>(b"{not json").unwrap_err();
        assert!(err.is_poison());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = decode::<Album>(br#"{"id":"x","title":1}"#).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedPayload(_)));
    }

    #[test]
    fn routing_keys_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_routing_key(kind.routing_key()), Some(kind));
        }
        assert_eq!(EventKind::from_routing_key("SONG_DELETED"), None);
    }
}
