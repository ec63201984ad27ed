// pulp-image/src/server/handlers.rs
use super::paths::{can_create, default_output_dir, expand_tilde, open_folder};
use crate::core::job::run_job;
use crate::core::reporter::JobReport;
use crate::core::{
    AlphaMode, ErrorKind, NamingStrategy, OutputFormat, ProcessConfig, ProcessResult, PulpError,
    Totals,
};
use crate::utils::sanitize_filename;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const INDEX_HTML: &str = include_str!("../../ui/index.html");

/// JSON error body `{error, message}`; `message` is safe to show to users.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Bad request".to_string(),
            message: message.into(),
        }
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        log::error!("Request failed: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Processing failed".to_string(),
            message: "Something went wrong while processing. Please try again.".to_string(),
        }
    }
}

impl From<PulpError> for ApiError {
    fn from(err: PulpError) -> Self {
        let status = match err.kind() {
            ErrorKind::InvalidParameter
            | ErrorKind::UnsupportedFormat
            | ErrorKind::InputNotFound
            | ErrorKind::InvalidInputType => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::warn!("Request rejected: {}", err);
        Self {
            status,
            error: err.to_string(),
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.error, "message": self.message }));
        (self.status, body).into_response()
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn version() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// Settings document sent by the browser alongside the uploads.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub out: Option<String>,
    pub rename_pattern: Option<String>,
    pub suffix: Option<String>,
    pub auto_suffix: bool,
    pub quality: Option<u8>,
    pub lossless: bool,
    pub background: Option<String>,
    pub alpha_mode: Option<String>,
    pub overwrite: bool,
    pub delete_original: bool,
    pub use_default_output: bool,
}

impl RunConfig {
    /// Originals are uploads in a temp folder, so `deleteOriginal` is ignored.
    pub fn into_process_config(self) -> Result<ProcessConfig, PulpError> {
        let format = match self.format.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(name.parse::<OutputFormat>()?),
        };

        let alpha_mode = match self.alpha_mode.as_deref() {
            None | Some("") | Some("flatten") => AlphaMode::Flatten,
            Some("error") => AlphaMode::Error,
            Some(other) => {
                return Err(PulpError::InvalidParameter(format!(
                    "Unknown alpha mode \"{}\"",
                    other
                )))
            }
        };

        let out_dir = match self.out.as_deref().map(str::trim) {
            Some(out) if !self.use_default_output && !out.is_empty() => expand_tilde(out),
            _ => default_output_dir(None),
        };

        if self.delete_original {
            log::debug!("Ignoring deleteOriginal for browser uploads");
        }

        let defaults = ProcessConfig::default();
        let config = ProcessConfig {
            width: self.width,
            height: self.height,
            format,
            out_dir,
            naming: NamingStrategy::from_parts(self.rename_pattern, self.suffix, self.auto_suffix),
            quality: self.quality,
            lossless: self.lossless,
            background: self
                .background
                .filter(|b| !b.trim().is_empty())
                .unwrap_or(defaults.background),
            alpha_mode,
            overwrite: self.overwrite,
            delete_original: false,
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    pub file_path: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEntry {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub processed: Vec<ProcessResult>,
    pub skipped: Vec<SkippedEntry>,
    pub failed: Vec<FailedEntry>,
    pub totals: Totals,
    pub output_path: PathBuf,
}

impl RunResponse {
    /// Swaps temp-folder paths for the names the browser uploaded and
    /// replaces raw error text with user-facing messages.
    fn from_report(report: JobReport, uploads: &HashMap<String, String>, output_path: PathBuf) -> Self {
        let display_name = |path: &Path| -> String {
            let stored = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            uploads.get(&stored).cloned().unwrap_or(stored)
        };

        let processed = report
            .processed
            .into_iter()
            .map(|mut result| {
                result.input_path = PathBuf::from(display_name(&result.input_path));
                result
            })
            .collect();

        let skipped = report
            .skipped
            .iter()
            .map(|record| SkippedEntry {
                file_path: display_name(&record.file_path),
                reason: record.kind.user_message().to_string(),
            })
            .collect();

        let failed = report
            .failed
            .iter()
            .map(|record| FailedEntry {
                file_path: display_name(&record.file_path),
                error: record.kind.user_message().to_string(),
            })
            .collect();

        Self {
            processed,
            skipped,
            failed,
            totals: report.totals,
            output_path,
        }
    }
}

/// `photo.png`, `photo-2.png`, `photo-3.png`, ... for repeated names.
fn unique_name(taken: &HashMap<String, String>, name: &str) -> String {
    if !taken.contains_key(name) {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (2..)
        .map(|n| format!("{}-{}{}", stem, n, ext))
        .find(|candidate| !taken.contains_key(candidate))
        .unwrap_or_else(|| name.to_string())
}

pub async fn run(mut multipart: Multipart) -> Result<Json<RunResponse>, ApiError> {
    let upload_dir = tempfile::Builder::new()
        .prefix("pulp-upload-")
        .tempdir()
        .map_err(ApiError::internal)?;

    // stored name -> name as uploaded
    let mut uploads: HashMap<String, String> = HashMap::new();
    let mut run_config: Option<RunConfig> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Could not read upload: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "files" => {
                let original = field.file_name().unwrap_or("image").to_string();
                let stored = unique_name(&uploads, &sanitize_filename(&original));
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Could not read upload: {}", e)))?;
                tokio::fs::write(upload_dir.path().join(&stored), &bytes)
                    .await
                    .map_err(ApiError::internal)?;
                log::debug!("Received {} ({} bytes)", original, bytes.len());
                uploads.insert(stored, original);
            }
            "config" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Could not read settings: {}", e)))?;
                let parsed = serde_json::from_str(&text)
                    .map_err(|e| ApiError::bad_request(format!("Invalid settings: {}", e)))?;
                run_config = Some(parsed);
            }
            other => log::debug!("Ignoring form field {:?}", other),
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::bad_request("No files were uploaded."));
    }

    let config = run_config.unwrap_or_default().into_process_config()?;
    let output_path = config.out_dir.clone();
    let input = upload_dir.path().to_path_buf();
    log::info!("Processing {} upload(s) into {}", uploads.len(), output_path.display());

    let report = tokio::task::spawn_blocking(move || run_job(&input, &config))
        .await
        .map_err(ApiError::internal)??;

    Ok(Json(RunResponse::from_report(report, &uploads, output_path)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveRequest {
    pub use_default: bool,
    pub timestamp: Option<String>,
    pub path: Option<String>,
}

pub async fn resolve_output_path(Json(request): Json<ResolveRequest>) -> Json<serde_json::Value> {
    let path = match request.path.as_deref().map(str::trim) {
        Some(path) if !request.use_default && !path.is_empty() => expand_tilde(path),
        _ => default_output_dir(request.timestamp.as_deref()),
    };
    Json(json!({ "path": path }))
}

#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

pub async fn validate_output_path(
    Json(request): Json<PathRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = request.path.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request("Please enter an output folder."));
    }

    let path = expand_tilde(raw);
    let exists = path.exists();
    let is_directory = path.is_dir();
    let will_create = !exists && can_create(&path);

    Ok(Json(json!({
        "path": path,
        "exists": exists,
        "isDirectory": is_directory,
        "willCreate": will_create,
    })))
}

pub async fn open_folder_handler(Json(request): Json<PathRequest>) -> Response {
    let path = expand_tilde(request.path.trim());
    match open_folder(&path) {
        Ok(()) => Json(json!({ "success": true, "path": path })).into_response(),
        Err(e) => {
            log::warn!("Could not open {}: {}", path.display(), e);
            let body = Json(json!({
                "error": "We couldn't open the folder automatically.",
                "path": path,
            }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_defaults() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        let config = config.into_process_config().unwrap();
        assert_eq!(config.alpha_mode, AlphaMode::Flatten);
        assert_eq!(config.background, "#ffffff");
        assert!(config.out_dir.to_string_lossy().contains("pulp-image-results"));
    }

    #[test]
    fn test_run_config_never_deletes_uploads() {
        let config: RunConfig = serde_json::from_str(
            r#"{"deleteOriginal": true, "out": "/tmp/pulp-out", "format": "webp", "renamePattern": "{name}-{index}"}"#,
        )
        .unwrap();
        let config = config.into_process_config().unwrap();
        assert!(!config.delete_original);
        assert_eq!(config.out_dir, PathBuf::from("/tmp/pulp-out"));
        assert_eq!(config.format, Some(OutputFormat::Webp));
        assert!(matches!(config.naming, NamingStrategy::Template { .. }));
    }

    #[test]
    fn test_run_config_rejects_bad_values() {
        let config: RunConfig = serde_json::from_str(r#"{"format": "gif"}"#).unwrap();
        assert!(matches!(
            config.into_process_config(),
            Err(PulpError::UnsupportedFormat { .. })
        ));

        let config: RunConfig = serde_json::from_str(r#"{"alphaMode": "keep"}"#).unwrap();
        assert!(config.into_process_config().is_err());

        let config: RunConfig = serde_json::from_str(r#"{"quality": 0}"#).unwrap();
        assert!(config.into_process_config().is_err());
    }

    #[test]
    fn test_unique_name() {
        let mut taken = HashMap::new();
        assert_eq!(unique_name(&taken, "a.png"), "a.png");
        taken.insert("a.png".to_string(), "a.png".to_string());
        assert_eq!(unique_name(&taken, "a.png"), "a-2.png");
        taken.insert("a-2.png".to_string(), "a.png".to_string());
        assert_eq!(unique_name(&taken, "a.png"), "a-3.png");
    }

    #[test]
    fn test_response_hides_temp_paths() {
        let mut report = JobReport::default();
        report.failed.push(crate::core::FailureRecord {
            file_path: PathBuf::from("/tmp/pulp-upload-x/bad_name.png"),
            error: "Failed to decode /tmp/pulp-upload-x/bad_name.png: eof".to_string(),
            kind: ErrorKind::Decode,
        });
        let mut uploads = HashMap::new();
        uploads.insert("bad_name.png".to_string(), "bad:name.png".to_string());

        let response = RunResponse::from_report(report, &uploads, PathBuf::from("/out"));
        assert_eq!(response.failed[0].file_path, "bad:name.png");
        assert!(!response.failed[0].error.contains("/tmp"));
    }
}
