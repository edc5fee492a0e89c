//! Transmission RPC client
//!
//! Only used to find which files are seeding. Transmission protects its RPC
//! endpoint with a session id: the first request (or any request after the
//! daemon restarts) is answered with HTTP 409 and the id to use, after which
//! the request is retried once.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use tracing::{debug, info, warn};

use crate::torrent::SeedIndex;

const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Transmission torrent status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    Stopped,
    CheckWait,
    Checking,
    DownloadWait,
    Downloading,
    SeedWait,
    Seeding,
}

impl TorrentStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TorrentStatus::Stopped),
            1 => Some(TorrentStatus::CheckWait),
            2 => Some(TorrentStatus::Checking),
            3 => Some(TorrentStatus::DownloadWait),
            4 => Some(TorrentStatus::Downloading),
            5 => Some(TorrentStatus::SeedWait),
            6 => Some(TorrentStatus::Seeding),
            _ => None,
        }
    }

    /// Queued to seed or actively seeding
    pub fn is_seeding(&self) -> bool {
        matches!(self, TorrentStatus::SeedWait | TorrentStatus::Seeding)
    }
}

/// Torrent record from `torrent-get`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTorrent {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub hash_string: Option<String>,
    pub status: Option<i64>,
    pub download_dir: Option<String>,
    #[serde(default)]
    pub files: Vec<RpcTorrentFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcTorrentFile {
    pub name: Option<String>,
    pub length: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: JsonValue,
}

#[derive(Debug, Deserialize)]
struct TorrentGetArguments {
    #[serde(default)]
    torrents: Vec<RpcTorrent>,
}

/// Build a seed index from the files of seeding torrents
pub fn index_from_torrents(torrents: &[RpcTorrent]) -> SeedIndex {
    let mut index = SeedIndex::new();
    for torrent in torrents {
        let seeding = torrent
            .status
            .and_then(TorrentStatus::from_code)
            .is_some_and(|s| s.is_seeding());
        if !seeding {
            continue;
        }

        let base_dir = torrent.download_dir.as_deref().unwrap_or("");
        for file in &torrent.files {
            let relative = file.name.as_deref().unwrap_or("");
            index.add_file(base_dir, relative, file.length.unwrap_or(0));
        }
    }
    index
}

/// Source of the per-cycle seed index
#[async_trait]
pub trait SeedSource: Send + Sync {
    async fn seed_index(&self) -> Result<SeedIndex>;
}

/// Transmission JSON-RPC client
pub struct TransmissionClient {
    client: Client,
    rpc_url: String,
    credentials: Option<(String, String)>,
    session_id: Mutex<Option<String>>,
}

impl TransmissionClient {
    pub fn new(
        rpc_url: String,
        username: Option<String>,
        password: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Transmission HTTP client")?;
        let credentials = match (username, password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        };
        Ok(Self {
            client,
            rpc_url,
            credentials,
            session_id: Mutex::new(None),
        })
    }

    async fn post(&self, payload: &JsonValue) -> Result<reqwest::Response> {
        let mut request = self.client.post(&self.rpc_url).json(payload);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }
        let session_id = self.session_id.lock().clone();
        if let Some(session_id) = session_id {
            request = request.header(SESSION_ID_HEADER, session_id);
        }
        request
            .send()
            .await
            .context("Failed to reach Transmission RPC")
    }

    /// Call an RPC method and return its `arguments` object
    pub async fn rpc(&self, method: &str, arguments: JsonValue) -> Result<JsonValue> {
        let payload = json!({ "method": method, "arguments": arguments });

        let mut response = self.post(&payload).await?;
        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .context("Transmission returned 409 without a session id")?;
            debug!("Renegotiated Transmission session id");
            *self.session_id.lock() = Some(session_id);
            response = self.post(&payload).await?;
        }

        if !response.status().is_success() {
            anyhow::bail!(
                "Transmission RPC '{}' failed with status: {}",
                method,
                response.status()
            );
        }

        let body: RpcResponse = response
            .json()
            .await
            .context("Failed to parse Transmission RPC response")?;
        if body.result != "success" {
            anyhow::bail!("Transmission RPC error: {}", body.result);
        }
        Ok(body.arguments)
    }

    /// Fetch all torrents with the fields needed for seed matching
    pub async fn get_torrents(&self) -> Result<Vec<RpcTorrent>> {
        let arguments = self
            .rpc(
                "torrent-get",
                json!({
                    "fields": ["id", "name", "hashString", "status", "downloadDir", "files"]
                }),
            )
            .await?;
        let parsed: TorrentGetArguments =
            serde_json::from_value(arguments).context("Unexpected torrent-get response shape")?;
        Ok(parsed.torrents)
    }
}

#[async_trait]
impl SeedSource for TransmissionClient {
    async fn seed_index(&self) -> Result<SeedIndex> {
        let torrents = self.get_torrents().await?;
        let index = index_from_torrents(&torrents);
        info!(
            torrents = torrents.len(),
            seeding_paths = index.path_count(),
            seeding_names = index.name_size_count(),
            "Loaded seeding file index from Transmission"
        );
        Ok(index)
    }
}

/// Build the seed index for a cycle, degrading to an empty index on failure
pub async fn build_seed_index(source: Option<&dyn SeedSource>) -> SeedIndex {
    let Some(source) = source else {
        return SeedIndex::new();
    };
    match source.seed_index().await {
        Ok(index) => index,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Failed to load seeding paths from Transmission");
            SeedIndex::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrents_fixture() -> Vec<RpcTorrent> {
        let json = r#"[
            {"id": 1, "name": "Show S01", "hashString": "aa", "status": 6, "downloadDir": "/downloads",
             "files": [{"name": "Show S01/Show - 01.mkv", "length": 1000}, {"name": "Show S01/Show - 02.mkv", "length": 2000}]},
            {"id": 2, "name": "Queued", "hashString": "bb", "status": 5, "downloadDir": "/downloads/",
             "files": [{"name": "Movie.mkv", "length": 3000}]},
            {"id": 3, "name": "Still downloading", "hashString": "cc", "status": 4, "downloadDir": "/downloads",
             "files": [{"name": "Partial.mkv", "length": 4000}]},
            {"id": 4, "name": "Paused", "status": 0, "downloadDir": "/downloads", "files": []}
        ]"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert!(TorrentStatus::from_code(5).unwrap().is_seeding());
        assert!(TorrentStatus::from_code(6).unwrap().is_seeding());
        assert!(!TorrentStatus::from_code(4).unwrap().is_seeding());
        assert_eq!(TorrentStatus::from_code(42), None);
    }

    #[test]
    fn test_index_only_includes_seeding_torrents() {
        let index = index_from_torrents(&torrents_fixture());

        assert_eq!(index.path_count(), 3);
        assert!(index.contains_path("/downloads/Show S01/Show - 01.mkv"));
        assert!(index.contains_path("/downloads/Movie.mkv"));
        assert!(!index.contains_path("/downloads/Partial.mkv"));
        assert!(index.contains_name_size("show - 02.mkv", 2000));
        assert!(!index.contains_name_size("partial.mkv", 4000));
    }

    #[tokio::test]
    async fn test_build_seed_index_without_source() {
        let index = build_seed_index(None).await;
        assert!(index.is_empty());
    }

    struct FailingSource;

    #[async_trait]
    impl SeedSource for FailingSource {
        async fn seed_index(&self) -> Result<SeedIndex> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_build_seed_index_degrades_on_failure() {
        let index = build_seed_index(Some(&FailingSource)).await;
        assert!(index.is_empty());
    }

    /// Serve one canned HTTP response per connection and return the raw
    /// requests received, lowercased
    async fn serve(responses: Vec<&'static str>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/transmission/rpc", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                        let body_len = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if buf.len() >= end + 4 + body_len {
                            break;
                        }
                    }
                }
                requests.push(String::from_utf8_lossy(&buf).to_lowercase());
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            requests
        });

        (url, handle)
    }

    const CONFLICT_WITH_ID: &str = "HTTP/1.1 409 Conflict\r\nX-Transmission-Session-Id: abc123\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const CONFLICT_WITHOUT_ID: &str = "HTTP/1.1 409 Conflict\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const TORRENTS_OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 125\r\nConnection: close\r\n\r\n{\"result\":\"success\",\"arguments\":{\"torrents\":[{\"id\":1,\"status\":6,\"downloadDir\":\"/dl\",\"files\":[{\"name\":\"a.mkv\",\"length\":5}]}]}}";
    const RPC_FAILURE: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 29\r\nConnection: close\r\n\r\n{\"result\":\"method not found\"}";

    fn client(url: String) -> TransmissionClient {
        TransmissionClient::new(url, None, None, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_session_id_renegotiated_on_conflict() {
        let (url, server) = serve(vec![CONFLICT_WITH_ID, TORRENTS_OK]).await;

        let index = client(url).seed_index().await.unwrap();
        let requests = server.await.unwrap();

        assert!(index.contains_path("/dl/a.mkv"));
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].contains("x-transmission-session-id"));
        assert!(requests[1].contains("x-transmission-session-id: abc123"));
        assert!(requests[1].contains("\"method\":\"torrent-get\""));
    }

    #[tokio::test]
    async fn test_conflict_without_session_id_fails() {
        let (url, server) = serve(vec![CONFLICT_WITHOUT_ID]).await;

        let err = client(url).get_torrents().await.unwrap_err();
        assert!(err.to_string().contains("409 without a session id"));
        assert_eq!(server.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_result_is_an_error() {
        let (url, _server) = serve(vec![RPC_FAILURE]).await;

        let err = client(url).rpc("torrent-get", json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Transmission RPC error: method not found");
    }
}
