//! Document routes: upload, list, correct, split, and read back blocks.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use vnlegal_core::Error;
use vnlegal_ingest::{FileType, Ingester};
use vnlegal_splitter::SourceLocator;

use crate::error::{blocking, ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", get(list_documents))
        .route("/documents/upload", post(upload_documents))
        .route("/documents/{id}", get(get_document).delete(delete_document))
        .route("/documents/{id}/text", put(update_text))
        .route("/documents/{id}/metadata", post(process_document))
        .route("/documents/{id}/blocks", get(get_blocks))
        .route("/documents/{id}/markdown", get(get_markdown))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub process: bool,
}

/// POST /api/documents/upload: multipart upload, optionally split right away.
async fn upload_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut uploaded = Vec::new();
    let mut failures: Vec<(String, Error)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let filename = match field.file_name() {
            Some(name) => sanitize_filename(name),
            None => continue,
        };
        if !FileType::from_extension(extension(&filename)).is_supported() {
            failures.push((filename.clone(), Error::UnsupportedFile(filename)));
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read {}: {}", filename, e)))?;
        let path = unique_upload_path(&state.config.data_paths.uploads, &filename);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            failures.push((filename, Error::Io(e)));
            continue;
        }

        let st = state.clone();
        let name = filename.clone();
        let process = query.process;
        let result = blocking(move || {
            let splitter = st.splitter();
            let ingester = Ingester::new(&st.store, &splitter);
            let id = ingester.ingest_file(&path, &name)?;
            let report = if process {
                Some(ingester.process_document(id)?)
            } else {
                None
            };
            Ok((id, report))
        })
        .await;

        match result {
            Ok((id, report)) => {
                info!("Uploaded {} as document {}", filename, id);
                uploaded.push(json!({
                    "documentId": id,
                    "filename": filename,
                    "processed": report.is_some(),
                    "blockCount": report.as_ref().map(|r| r.block_count),
                }));
            }
            Err(ApiError(e)) => {
                warn!("Upload of {} failed: {}", filename, e);
                failures.push((filename, e));
            }
        }
    }

    if uploaded.is_empty() {
        return Err(match failures.into_iter().next() {
            Some((_, e)) => ApiError(e),
            None => ApiError::bad_request("no file in upload"),
        });
    }

    let errors: Vec<Value> = failures
        .iter()
        .map(|(name, e)| json!({ "filename": name, "error": e.to_string(), "kind": e.kind() }))
        .collect();
    Ok(Json(json!({ "documents": uploaded, "errors": errors })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// GET /api/documents?page&pageSize
async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let (documents, total) =
        blocking(move || state.store.get_documents_paginated(page, page_size)).await?;
    let total_pages = (total as usize).div_ceil(page_size);

    Ok(Json(json!({
        "documents": documents,
        "total": total,
        "page": page,
        "pageSize": page_size,
        "totalPages": total_pages,
    })))
}

/// GET /api/documents/{id}
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let (document, block_count) = blocking(move || {
        let document = state.store.require_document(id)?;
        let block_count = state.store.get_blocks(id)?.len();
        Ok((document, block_count))
    })
    .await?;
    Ok(Json(json!({ "document": document, "blockCount": block_count })))
}

/// DELETE /api/documents/{id}
async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let deleted = blocking(move || state.store.delete_document(id)).await?;
    if !deleted {
        return Err(ApiError(Error::NotFound(format!("document {}", id))));
    }
    info!("Deleted document {}", id);
    Ok(Json(json!({ "success": true, "documentId": id })))
}

#[derive(Debug, Deserialize)]
pub struct TextUpdate {
    pub text: String,
}

/// PUT /api/documents/{id}/text: store user-corrected text; the old split is dropped.
async fn update_text(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<TextUpdate>,
) -> ApiResult<Json<Value>> {
    blocking(move || {
        let splitter = state.splitter();
        Ingester::new(&state.store, &splitter).update_text(id, &update.text)
    })
    .await?;
    Ok(Json(json!({ "success": true, "documentId": id })))
}

/// POST /api/documents/{id}/metadata: split the stored text into blocks.
async fn process_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let report = blocking(move || {
        let splitter = state.splitter();
        Ingester::new(&state.store, &splitter).process_document(id)
    })
    .await?;
    Ok(Json(json!({
        "documentId": report.document_id,
        "title": report.title,
        "keyword": report.keyword,
        "total": report.block_count,
        "blocks": report.blocks,
        "markdown": report.markdown,
    })))
}

#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    pub article: Option<String>,
}

/// GET /api/documents/{id}/blocks?article=N
async fn get_blocks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<BlocksQuery>,
) -> ApiResult<Json<Value>> {
    let blocks = blocking(move || {
        state.store.require_document(id)?;
        state.store.get_blocks(id)
    })
    .await?;

    let blocks: Vec<_> = match query.article.as_deref().map(str::trim) {
        Some(article) if !article.is_empty() => blocks
            .into_iter()
            .filter(|b| {
                b.block
                    .source
                    .parse::<SourceLocator>()
                    .map(|loc| loc.is_in_article(article))
                    .unwrap_or(false)
            })
            .collect(),
        _ => blocks,
    };

    Ok(Json(json!({
        "documentId": id,
        "total": blocks.len(),
        "blocks": blocks,
    })))
}

/// GET /api/documents/{id}/markdown
async fn get_markdown(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let document = blocking(move || state.store.require_document(id)).await?;
    let markdown = document.metadata_markdown.ok_or_else(|| {
        ApiError(Error::NotFound(format!("markdown for document {} (not processed)", id)))
    })?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    ))
}

fn extension(filename: &str) -> &str {
    FsPath::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// Strip directory components and traversal from a client-supplied name.
pub fn sanitize_filename(name: &str) -> String {
    let name = name.replace(['/', '\\'], "_").replace("..", "");
    let name = name.trim().trim_start_matches('.');
    if name.is_empty() {
        "unnamed".to_string()
    } else {
        name.to_string()
    }
}

/// `dir/name`, or `dir/stem_<timestamp>.ext` when that file already exists.
fn unique_upload_path(dir: &FsPath, filename: &str) -> PathBuf {
    let path = dir.join(filename);
    if !path.exists() {
        return path;
    }
    let stem = FsPath::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ts = chrono::Utc::now().format("%Y%m%d%H%M%S%3f");
    match extension(filename) {
        "" => dir.join(format!("{}_{}", stem, ts)),
        ext => dir.join(format!("{}_{}.{}", stem, ts, ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "__etc_passwd");
        assert_eq!(sanitize_filename("quy_che.pdf"), "quy_che.pdf");
        assert_eq!(sanitize_filename("C:\\docs\\a.docx"), "C:_docs_a.docx");
        assert_eq!(sanitize_filename(".."), "unnamed");
        assert_eq!(sanitize_filename("Quyết định 429.pdf"), "Quyết định 429.pdf");
    }

    #[test]
    fn test_unique_upload_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let first = unique_upload_path(dir.path(), "a.pdf");
        assert_eq!(first, dir.path().join("a.pdf"));
        std::fs::write(&first, b"x").unwrap();

        let second = unique_upload_path(dir.path(), "a.pdf");
        assert_ne!(second, first);
        let name = second.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("a_") && name.ends_with(".pdf"));
    }
}
