// HTTP request handlers
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use futures::stream;
use std::io::SeekFrom;
use std::time::UNIX_EPOCH;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::db::models::Track;
use crate::db::operations::DbOperations;
use crate::library::paths::from_db_path;
use crate::state::AppState;

use super::assets::{DASHBOARD_JS, NOCOVER_PATH};
use super::dashboard::build_dashboard;
use super::error::WebError;
use super::range::ByteRange;

/// Bytes read from disk per body chunk
const CHUNK_SIZE: usize = 64 * 1024;

/// Run blocking database or file work off the async executor
async fn blocking<T, F>(f: F) -> Result<T, WebError>
where
    F: FnOnce() -> Result<T, anyhow::Error> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(anyhow::Error::from)?;
    Ok(result?)
}

async fn find_track(state: &AppState, track_id: i64) -> Result<Option<Track>, WebError> {
    let db = state.db.clone();
    blocking(move || DbOperations::get_track(&db.lock(), track_id)).await
}

/// Weak validator derived from the file identity and its current size/mtime
fn entity_tag(path: &str, length: u64, modified: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.as_bytes());
    hasher.update(&length.to_le_bytes());
    hasher.update(&modified.to_le_bytes());
    format!("W/\"{}\"", &hasher.finalize().to_hex()[..16])
}

fn matches_etag(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').any(|candidate| candidate.trim() == etag || candidate.trim() == "*"))
        .unwrap_or(false)
}

async fn read_chunk(
    mut file: tokio::fs::File,
    remaining: u64,
) -> std::io::Result<Option<(Bytes, (tokio::fs::File, u64))>> {
    if remaining == 0 {
        return Ok(None);
    }

    let mut buf = vec![0u8; remaining.min(CHUNK_SIZE as u64) as usize];
    let read = file.read(&mut buf).await?;
    if read == 0 {
        return Ok(None);
    }
    buf.truncate(read);

    Ok(Some((Bytes::from(buf), (file, remaining - read as u64))))
}

/// Body streaming `length` bytes from the file's current position
fn file_body(file: tokio::fs::File, length: u64) -> Body {
    let chunks = stream::try_unfold((file, length), |(file, remaining)| {
        read_chunk(file, remaining)
    });
    Body::from_stream(chunks)
}

/// `GET /`
pub async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let db = state.db.clone();
    let tracks = blocking(move || DbOperations::get_all_tracks(&db.lock())).await?;
    Ok(Html(build_dashboard(&tracks).to_html()))
}

/// `GET /api/tracks`
pub async fn list_tracks(State(state): State<AppState>) -> Result<Json<Vec<Track>>, WebError> {
    let db = state.db.clone();
    let tracks = blocking(move || DbOperations::get_all_tracks(&db.lock())).await?;
    Ok(Json(tracks))
}

/// `GET /stream/:track_id`: the raw file, honouring a single byte range
pub async fn stream_track(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let track = find_track(&state, track_id)
        .await?
        .ok_or(WebError::TrackNotFound)?;

    let path = state.library_root.join(from_db_path(&track.path));
    let mut file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "track file unavailable");
            return Err(WebError::TrackNotFound);
        }
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(WebError::TrackNotFound);
    }

    let length = metadata.len();
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let etag = entity_tag(&track.path, length, modified);

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(ByteRange::parse);

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&track.mime)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Ok(value) = HeaderValue::from_str(&etag) {
        response_headers.insert(header::ETAG, value);
    }

    let Some(range) = range else {
        if matches_etag(&headers, &etag) {
            return Ok((StatusCode::NOT_MODIFIED, response_headers).into_response());
        }
        response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        return Ok((StatusCode::OK, response_headers, file_body(file, length)).into_response());
    };

    let (first, last) = range
        .resolve(length)
        .ok_or(WebError::RangeNotSatisfiable { length })?;
    let span = last - first + 1;

    file.seek(SeekFrom::Start(first)).await?;

    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(span));
    if let Ok(value) = HeaderValue::from_str(&format!("bytes {}-{}/{}", first, last, length)) {
        response_headers.insert(header::CONTENT_RANGE, value);
    }

    Ok((StatusCode::PARTIAL_CONTENT, response_headers, file_body(file, span)).into_response())
}

/// `GET /pic/:track_id`: embedded cover art, or a redirect to the placeholder
pub async fn track_cover(
    State(state): State<AppState>,
    Path(track_id): Path<i64>,
) -> Result<Response, WebError> {
    let Some(track) = find_track(&state, track_id).await? else {
        return Ok(Redirect::to(NOCOVER_PATH).into_response());
    };

    let path = state.library_root.join(from_db_path(&track.path));
    let registry = state.registry.clone();
    let cover = blocking(move || {
        if !path.is_file() {
            return Ok(None);
        }
        Ok(registry.read_metadata(&path).and_then(|m| m.cover))
    })
    .await?;

    match cover {
        Some(cover) => {
            let content_type = HeaderValue::from_str(&cover.mime)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
            Ok(([(header::CONTENT_TYPE, content_type)], cover.data).into_response())
        }
        None => Ok(Redirect::to(NOCOVER_PATH).into_response()),
    }
}

/// `GET /static/img/nocover.png`
pub async fn placeholder_cover(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        state.placeholder_cover.as_ref().clone(),
    )
}

/// `GET /static/js/dashboard.js`
pub async fn dashboard_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        DASHBOARD_JS,
    )
}
