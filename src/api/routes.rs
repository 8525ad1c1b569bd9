//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                            | Return Type         |
// |-----------------------|----------------------------------------|---------------------|
// | health                | Health check endpoint                  | impl IntoResponse   |
// | subscribe_artist      | Run the SubscribeArtist command        | ApiResult<Response> |
// | publish_album         | Run the PublishAlbum command           | ApiResult<Response> |
// | publish_song          | Run the PublishSong command            | ApiResult<Response> |
// | play_song             | Run the PlaySong command               | ApiResult<Response> |
// | get_artist            | Artist projection                      | ApiResult<Response> |
// | get_albums_by_artist  | Album projections of one artist        | ApiResult<Response> |
// | get_album             | Album projection                       | ApiResult<Response> |
// | get_song              | Song projection                        | ApiResult<Response> |
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::{
    AlbumResponse, ApiResult, AppState, ArtistResponse, PlayResponse, PublishAlbumRequest,
    PublishSongRequest, SongResponse, SubscribeArtistRequest,
};
use crate::domain::services::commands::PlaySong;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

pub async fn subscribe_artist(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<SubscribeArtistRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let artist = state.catalog.subscribe_artist.execute(req.into_command()).await?;
    Ok((StatusCode::CREATED, Json(ArtistResponse::from(artist))).into_response())
}

pub async fn publish_album(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<PublishAlbumRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let album = state.catalog.publish_album.execute(req.into_command()).await?;
    Ok((StatusCode::CREATED, Json(AlbumResponse::from(album))).into_response())
}

pub async fn publish_song(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<PublishSongRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload?;
    let song = state.catalog.publish_song.execute(req.into_command()).await?;
    Ok((StatusCode::CREATED, Json(SongResponse::from(song))).into_response())
}

/// Records one play. The counter moves once the projection consumes the event.
pub async fn play_song(
    Extension(state): Extension<Arc<AppState>>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Response> {
    let played = state.catalog.play_song.execute(PlaySong { song_id }).await?;
    Ok((StatusCode::ACCEPTED, Json(PlayResponse::from(played))).into_response())
}

pub async fn get_artist(
    Extension(state): Extension<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
) -> ApiResult<Response> {
    let view = state.catalog.get_artist.execute(artist_id).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

pub async fn get_albums_by_artist(
    Extension(state): Extension<Arc<AppState>>,
    Path(artist_id): Path<Uuid>,
) -> ApiResult<Response> {
    let views = state.catalog.get_albums_by_artist.execute(artist_id).await?;
    Ok((StatusCode::OK, Json(views)).into_response())
}

pub async fn get_album(
    Extension(state): Extension<Arc<AppState>>,
    Path(album_id): Path<Uuid>,
) -> ApiResult<Response> {
    let view = state.catalog.get_album.execute(album_id).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

pub async fn get_song(
    Extension(state): Extension<Arc<AppState>>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Response> {
    let view = state.catalog.get_song.execute(song_id).await?;
    Ok((StatusCode::OK, Json(view)).into_response())
}
