//! Verb handlers: reads, writes, deletions and the method fallback.

use axum::Error as AxumError;
use axum::body::Body as AxumBody;
use axum::extract::{Extension, Path as AxumPath};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::stream::StreamExt;
use http_body_util::BodyExt;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::error::ApiError;
use crate::storage::Storage;

/// The wildcard capture, or the empty string for a request on `/` itself.
fn relative_path(path: Option<AxumPath<String>>) -> String {
    path.map(|AxumPath(value)| value).unwrap_or_default()
}

/// Serves a file's bytes or a directory's entry names.
pub async fn get_entry(
    path: Option<AxumPath<String>>,
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<Response, ApiError> {
    let relative = relative_path(path);
    let target = storage.resolve(&relative)?;
    let metadata = match fs::metadata(&target).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound("File not found".into()));
        }
        Err(err) => return Err(ApiError::Internal(err.to_string())),
    };

    if metadata.is_dir() {
        let names = storage
            .list_dir(&target)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        info!(path = %relative, count = names.len(), "list directory");
        return Ok((StatusCode::OK, names.join("\n")).into_response());
    }

    let file = File::open(&target)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let mime = mime_guess::from_path(&target).first_or_octet_stream();
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| ApiError::Internal("invalid mime type".into()))?,
    );
    info!(path = %relative, size = metadata.len(), "stream file");
    let stream = ReaderStream::new(file);
    Ok((
        StatusCode::OK,
        response_headers,
        AxumBody::from_stream(stream),
    )
        .into_response())
}

/// Stores the request body at the target path, truncating any existing file.
/// Parent directories are not created.
pub async fn put_entry(
    path: Option<AxumPath<String>>,
    Extension(storage): Extension<Arc<Storage>>,
    body: AxumBody,
) -> Result<StatusCode, ApiError> {
    let relative = relative_path(path);
    let target = storage.resolve(&relative)?;
    let mut file = File::create(&target)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    copy_body_to_file(body, &mut file).await?;
    info!(path = %relative, "write file");
    Ok(StatusCode::NO_CONTENT)
}

/// Removes the entry at the target path. Deleting what is already gone is a
/// success, so repeated deletes all answer 204.
pub async fn delete_entry(
    path: Option<AxumPath<String>>,
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<StatusCode, ApiError> {
    let relative = relative_path(path);
    storage.delete_path(&relative).await?;
    info!(path = %relative, "delete entry");
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for every verb outside GET/PUT/DELETE.
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

/// Copies the request body into the file chunk by chunk, then flushes. A
/// failure on either the inbound stream or the sink aborts the copy; whatever
/// was already written stays on disk.
async fn copy_body_to_file(body: AxumBody, file: &mut File) -> Result<(), ApiError> {
    let mut data_stream = BodyExt::into_data_stream(body);
    while let Some(chunk) = data_stream.next().await {
        let chunk = chunk.map_err(|err: AxumError| ApiError::Internal(err.to_string()))?;
        if !chunk.is_empty() {
            file.write_all(&chunk)
                .await
                .map_err(|err| ApiError::Internal(err.to_string()))?;
        }
    }
    file.flush()
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(())
}
