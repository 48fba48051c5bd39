//! Serve a static lesson site straight from disk.
//!
//! Request URLs are mapped onto files below a root directory, so
//! `data/Class01/courses.json` reads `<root>/data/Class01/courses.json`.
//! Missing files answer 404 like a static web server would.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct DirectoryContentClient {
    root: PathBuf,
}

impl DirectoryContentClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `url`, or `None` when the URL escapes the root.
    pub fn file_for(&self, url: &str) -> Option<PathBuf> {
        let path = strip_origin(url);
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let mut file = self.root.clone();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => file.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(file)
    }
}

fn strip_origin(url: &str) -> &str {
    for scheme in ["http://", "https://", "file://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            return rest.find('/').map_or("", |slash| &rest[slash..]);
        }
    }
    url
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => "application/json",
        Some("opus") | Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("html") => "text/html",
        _ => "application/octet-stream",
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::new(404, Bytes::new())
}

#[async_trait]
impl HttpClient for DirectoryContentClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let Some(file) = self.file_for(&request.url) else {
            debug!(url = %request.url, "Request escapes site root");
            return Ok(not_found());
        };

        match fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(not_found()),
            Err(e) => return Err(BridgeError::Io(e)),
        }

        let body = match request.method {
            HttpMethod::Head => Bytes::new(),
            HttpMethod::Get => Bytes::from(fs::read(&file).await?),
        };

        debug!(url = %request.url, file = %file.display(), bytes = body.len(), "Served from disk");
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type(&file).to_string());
        Ok(HttpResponse {
            status: 200,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for DirectoryContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryContentClient")
            .field("root", &self.root)
            .finish()
    }
}
