//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Event codec of the catalog. Commands encode their entity snapshot into an `EventMessage`;
// projection handlers decode the raw bytes back. Decoding failures are always
// `CatalogError::MalformedPayload` so the subscriber can tell poison messages apart.
//
// | Component                | Description                                                |
// |--------------------------|-----------------------------------------------------------|
// | EventKind                | Event tags and their routing keys                          |
// | Event                    | Payload types bound to an event kind                       |
// | EventMessage             | Encoded payload with headers                               |
// | decode                   | Reverse of EventMessage::encode                            |
//--------------------------------------------------------------------------------------------------

mod codec;

pub use codec::{
    EVENT_ID_HEADER, EVENT_KIND_HEADER, Event, EventKind, EventMessage, Headers,
    OCCURRED_AT_HEADER, SongPlayed, decode,
};
