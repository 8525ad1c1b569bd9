/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - catalog                                              |
/// |   - documents                                            |
/// +----------------------------------------------------------+

/// Normalized write-side entities.
pub mod catalog;

/// Denormalized read-side documents.
pub mod documents;

pub use catalog::{Album, Artist, Gender, Song, new_id};
pub use documents::{AlbumDocument, AlbumSummary, ArtistDocument, SongDocument, SongSummary};
