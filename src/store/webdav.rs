//! Document store on a WebDAV server
//!
//! Each document is a JSON resource at `{base}/{collection}/{id}.json`. ETags
//! serve as revisions, so conditional writes map onto `If-Match` and
//! `If-None-Match: *`.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use super::{
    decode_body, new_document_id, path_segment, DocumentStore, Precondition, Result, Revision,
    StoreError, StoredDocument,
};

/// Credentials for WebDAV authentication
#[derive(Debug, Clone, Default)]
pub struct WebDavCredentials {
    pub username: String,
    pub password: String,
}

/// Resource info from PROPFIND
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceInfo {
    pub path: String,
    pub is_collection: bool,
    pub etag: Option<String>,
}

/// Outcome of a PUT
#[derive(Debug)]
pub struct PutResponse {
    pub etag: Option<String>,
    pub conflict: bool,
}

/// Thin WebDAV client
pub struct WebDavClient {
    client: Client,
    base_url: String,
    credentials: Option<WebDavCredentials>,
}

impl WebDavClient {
    /// Create a new WebDAV client
    pub fn new(base_url: &str, credentials: Option<WebDavCredentials>) -> Result<Self> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Build full URL for a path
    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));
        match &self.credentials {
            Some(c) => request.basic_auth(&c.username, Some(&c.password)),
            None => request,
        }
    }

    /// PROPFIND - List directory contents. A missing directory yields `None`.
    pub async fn propfind(&self, path: &str, depth: u32) -> Result<Option<Vec<ResourceInfo>>> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| StoreError::Xml(e.to_string()))?;
        let response = self
            .request(method, path)
            .header("Depth", depth.to_string())
            .header("Content-Type", "application/xml")
            .body(PROPFIND_BODY)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status => check_status(status)?,
        }

        let xml = response.text().await?;
        parse_propfind_response(&xml, &self.base_url).map(Some)
    }

    /// GET - Download a resource with its ETag. A missing resource yields `None`.
    pub async fn get(&self, path: &str) -> Result<Option<(Vec<u8>, Option<String>)>> {
        let response = self.request(Method::GET, path).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status => check_status(status)?,
        }

        let etag = etag_header(response.headers());
        let data = response.bytes().await?.to_vec();
        Ok(Some((data, etag)))
    }

    /// PUT - Upload a resource, optionally guarded by a precondition
    pub async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        precondition: Option<&Precondition>,
    ) -> Result<PutResponse> {
        let mut request = self
            .request(Method::PUT, path)
            .header("Content-Type", "application/json")
            .body(data);

        request = match precondition {
            Some(Precondition::Absent) => request.header("If-None-Match", "*"),
            Some(Precondition::Matches(rev)) => request.header("If-Match", format!("\"{}\"", rev)),
            None => request,
        };

        let response = request.send().await?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => Ok(PutResponse {
                etag: None,
                conflict: true,
            }),
            status if status.is_success() => Ok(PutResponse {
                etag: etag_header(response.headers()),
                conflict: false,
            }),
            status => Err(status_error(status, response.text().await.unwrap_or_default())),
        }
    }

    /// MKCOL - Create a directory
    pub async fn mkcol(&self, path: &str) -> Result<()> {
        let method = Method::from_bytes(b"MKCOL").map_err(|e| StoreError::Xml(e.to_string()))?;
        let response = self.request(method, path).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Directory already exists
            StatusCode::METHOD_NOT_ALLOWED => Ok(()),
            status => Err(status_error(status, response.text().await.unwrap_or_default())),
        }
    }

    /// DELETE - Remove a resource
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            status => Err(status_error(status, response.text().await.unwrap_or_default())),
        }
    }
}

/// Success statuses (including 207) pass, anything else is an error
fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    Err(status_error(status, reason))
}

fn status_error(status: StatusCode, message: String) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::AuthFailed,
        status => StoreError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

fn etag_header(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("etag")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim_start_matches("W/").trim_matches('"').to_string())
}

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:getetag/>
    <D:resourcetype/>
  </D:prop>
</D:propfind>"#;

/// Parse a PROPFIND multistatus response
fn parse_propfind_response(xml: &str, base_url: &str) -> Result<Vec<ResourceInfo>> {
    // Servers return either full URLs or absolute paths in href
    let base_path = base_url
        .find("://")
        .map(|i| &base_url[i + 3..])
        .and_then(|rest| rest.find('/').map(|i| &rest[i..]))
        .unwrap_or("")
        .trim_end_matches('/');

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut resources = Vec::new();
    let mut current: Option<ResourceInfo> = None;
    let mut text_target: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"response" => {
                    current = Some(ResourceInfo {
                        path: String::new(),
                        is_collection: false,
                        etag: None,
                    })
                }
                b"href" => text_target = Some("href"),
                b"getetag" => text_target = Some("getetag"),
                b"collection" => {
                    if let Some(res) = current.as_mut() {
                        res.is_collection = true;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"collection" {
                    if let Some(res) = current.as_mut() {
                        res.is_collection = true;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| StoreError::Xml(e.to_string()))?;
                if let (Some(target), Some(res)) = (text_target, current.as_mut()) {
                    match target {
                        "href" => {
                            let href = text.as_ref();
                            let path = href
                                .strip_prefix(base_url)
                                .or_else(|| href.strip_prefix(base_path))
                                .unwrap_or(href)
                                .trim_matches('/');
                            res.path = urlencoding::decode(path)
                                .map(|s| s.into_owned())
                                .unwrap_or_else(|_| path.to_string());
                        }
                        _ => {
                            res.etag = Some(
                                text.trim_start_matches("W/").trim_matches('"').to_string(),
                            )
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                text_target = None;
                if e.local_name().as_ref() == b"response" {
                    if let Some(res) = current.take() {
                        resources.push(res);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(StoreError::Xml(e.to_string())),
            _ => {}
        }
    }

    log::debug!("parse_propfind: parsed {} resources", resources.len());
    Ok(resources)
}

/// Conditional writes need the server's ETag; an empty one never matches
fn required_etag(etag: Option<String>) -> Result<Revision> {
    match etag {
        Some(etag) if !etag.is_empty() => Ok(Revision(etag)),
        _ => Err(missing_etag()),
    }
}

fn missing_etag() -> StoreError {
    StoreError::Server {
        status: 0,
        message: "server did not return an ETag, conditional writes are unsupported".to_string(),
    }
}

/// [`DocumentStore`] backed by a [`WebDavClient`]
pub struct WebDavStore {
    client: WebDavClient,
}

impl WebDavStore {
    pub fn new(client: WebDavClient) -> Self {
        Self { client }
    }

    fn document_path(collection: &str, id: &str) -> Result<String> {
        Ok(format!("{}/{}.json", path_segment(collection)?, path_segment(id)?))
    }

    async fn put_document(
        &self,
        collection: &str,
        id: &str,
        data: &Value,
        precondition: Option<&Precondition>,
    ) -> Result<PutResponse> {
        self.client.mkcol(&path_segment(collection)?).await?;
        let body = serde_json::to_vec_pretty(data)?;
        self.client
            .put(&Self::document_path(collection, id)?, body, precondition)
            .await
    }
}

#[async_trait]
impl DocumentStore for WebDavStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let Some((bytes, etag)) = self.client.get(&Self::document_path(collection, id)?).await?
        else {
            return Ok(None);
        };
        Ok(Some(StoredDocument {
            id: id.to_string(),
            revision: Revision(etag.unwrap_or_default()),
            data: decode_body(collection, id, &bytes),
        }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>> {
        let dir = path_segment(collection)?;
        let Some(entries) = self.client.propfind(&dir, 1).await? else {
            return Ok(Vec::new());
        };

        let mut documents = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_collection) {
            let Some(file) = entry.path.rsplit('/').next() else {
                continue;
            };
            let Some(id) = file.strip_suffix(".json") else {
                continue;
            };
            match self.get(collection, id).await? {
                Some(doc) => documents.push(doc),
                None => log::debug!("webdav: {} vanished while listing", entry.path),
            }
        }
        Ok(documents)
    }

    async fn create(&self, collection: &str, data: Value) -> Result<String> {
        loop {
            let id = new_document_id();
            let response = self
                .put_document(collection, &id, &data, Some(&Precondition::Absent))
                .await?;
            if !response.conflict {
                return Ok(id);
            }
        }
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.put_document(collection, id, &data, None).await?;
        Ok(())
    }

    async fn set_if(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        precondition: Precondition,
    ) -> Result<Revision> {
        if matches!(&precondition, Precondition::Matches(rev) if rev.0.is_empty()) {
            return Err(missing_etag());
        }
        let response = self
            .put_document(collection, id, &data, Some(&precondition))
            .await?;
        if response.conflict {
            return Err(StoreError::Conflict);
        }
        required_etag(response.etag)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.client.delete(&Self::document_path(collection, id)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTISTATUS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/dav/cards/german/</d:href>
    <d:propstat><d:prop>
      <d:resourcetype><d:collection/></d:resourcetype>
    </d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/dav/cards/german/a1B2c3D4e5F6g7H8i9J0.json</d:href>
    <d:propstat><d:prop>
      <d:getetag>"abc123"</d:getetag>
      <d:resourcetype/>
    </d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>https://example.com/dav/cards/german/old%20card.json</d:href>
    <d:propstat><d:prop>
      <d:getetag>W/"weak"</d:getetag>
      <d:resourcetype/>
    </d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

    #[test]
    fn test_parse_propfind() {
        let resources =
            parse_propfind_response(MULTISTATUS, "https://example.com/dav/cards").unwrap();

        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].path, "german");
        assert!(resources[0].is_collection);

        assert_eq!(resources[1].path, "german/a1B2c3D4e5F6g7H8i9J0.json");
        assert!(!resources[1].is_collection);
        assert_eq!(resources[1].etag.as_deref(), Some("abc123"));

        assert_eq!(resources[2].path, "german/old card.json");
        assert_eq!(resources[2].etag.as_deref(), Some("weak"));
    }

    #[test]
    fn test_required_etag() {
        assert_eq!(required_etag(Some("abc".into())).unwrap(), Revision("abc".into()));
        assert!(matches!(required_etag(None), Err(StoreError::Server { .. })));
        assert!(matches!(required_etag(Some(String::new())), Err(StoreError::Server { .. })));
    }

    #[tokio::test]
    async fn test_set_if_refuses_empty_revision() {
        // Unroutable: the request must be refused before anything is sent
        let client = WebDavClient::new("http://127.0.0.1:9", None).unwrap();
        let store = WebDavStore::new(client);
        let result = store
            .set_if(
                "datas",
                "collections",
                serde_json::json!({"list": ["english"]}),
                Precondition::Matches(Revision(String::new())),
            )
            .await;
        assert!(matches!(result, Err(StoreError::Server { status: 0, .. })));
    }

    #[test]
    fn test_client_rejects_non_http_url() {
        assert!(matches!(
            WebDavClient::new("ftp://example.com", None),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_building() {
        let client = WebDavClient::new("https://example.com/dav/", None).unwrap();
        assert_eq!(client.url(""), "https://example.com/dav");
        assert_eq!(client.url("/german/x.json"), "https://example.com/dav/german/x.json");
        assert_eq!(
            WebDavStore::document_path("old norse", "abc").unwrap(),
            "old%20norse/abc.json"
        );
    }
}
