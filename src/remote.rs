use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::assets::{ImageResolver, WheelEntry, WheelSource};
use crate::command::{CommandSource, PollSnapshot};
use crate::error::{LoadError, PollError};
use crate::sector::ImageHandle;

pub const WHEEL_DATA_PATH: &str = "/api/get_wheel_data";
pub const STATUS_PATH: &str = "/api/check_status";
pub const STATIC_PREFIX: &str = "/static/";

/// Floor for the poll timeout at very short cadences
pub const MIN_POLL_TIMEOUT: Duration = Duration::from_millis(100);
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for one status request: four fifths of the cadence, so a request
/// is given up before the next one is due.
pub fn poll_timeout(interval: Duration) -> Duration {
    (interval * 4 / 5).max(MIN_POLL_TIMEOUT)
}

/// Shape of one element of the wheel data endpoint
#[derive(Debug, Deserialize)]
struct WireEntry {
    path: String,
    #[serde(default)]
    text: String,
}

/// Decodes the wheel data endpoint body into entries, in served order
pub fn entries_from_slice(bytes: &[u8]) -> Result<Vec<WheelEntry>, LoadError> {
    let wire: Vec<WireEntry> = serde_json::from_slice(bytes)?;
    Ok(wire
        .into_iter()
        .map(|e| WheelEntry::new(e.path, e.text))
        .collect())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Wheel entries and images served by the presentation server
#[derive(Debug, Clone)]
pub struct HttpWheelSource {
    client: Client,
    base_url: String,
}

impl HttpWheelSource {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        Ok(Self {
            client: client(LOAD_TIMEOUT)?,
            base_url: base_url.to_string(),
        })
    }

    pub fn image_resolver(&self) -> HttpImageResolver {
        HttpImageResolver {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

impl WheelSource for HttpWheelSource {
    fn entries(&self) -> Result<Vec<WheelEntry>, LoadError> {
        let url = join_url(&self.base_url, WHEEL_DATA_PATH);
        let bytes = self.client.get(&url).send()?.error_for_status()?.bytes()?;
        entries_from_slice(&bytes)
    }
}

#[derive(Debug, Clone)]
pub struct HttpImageResolver {
    client: Client,
    base_url: String,
}

impl ImageResolver for HttpImageResolver {
    fn resolve(&self, reference: &str) -> Result<ImageHandle, LoadError> {
        let url = join_url(
            &self.base_url,
            &format!("{}{}", STATIC_PREFIX, reference.trim_start_matches('/')),
        );
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            debug!("image {} answered {}", url, response.status());
            return Err(LoadError::ImageUnavailable {
                reference: reference.to_string(),
            });
        }

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(LoadError::ImageUnavailable {
                reference: reference.to_string(),
            });
        }

        Ok(ImageHandle {
            reference: reference.to_string(),
            byte_len: bytes.len(),
        })
    }
}

/// Polls the status endpoint for the latest command, config and scores
#[derive(Debug, Clone)]
pub struct HttpCommandSource {
    client: Client,
    url: String,
}

impl HttpCommandSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PollError> {
        Ok(Self {
            client: client(timeout)?,
            url: join_url(base_url, STATUS_PATH),
        })
    }
}

impl CommandSource for HttpCommandSource {
    fn poll(&mut self) -> Result<PollSnapshot, PollError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }
        PollSnapshot::from_slice(&response.bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves canned `(path, status, body)` answers over plain HTTP/1.1 and
    /// returns the base url. Unknown paths get a 404.
    fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };

                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let text = String::from_utf8_lossy(&request);
                let path = text.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, status, body)| (*status, *body))
                    .unwrap_or((404, ""));
                let head = format!(
                    "HTTP/1.1 {} Fixture\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body.as_bytes());
            }
        });

        base
    }

    /// A local address nothing listens on
    fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        base
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:5000/", "/api/check_status"),
            "http://localhost:5000/api/check_status"
        );
        assert_eq!(
            join_url("http://localhost:5000", "static/wheel_images/a.png"),
            "http://localhost:5000/static/wheel_images/a.png"
        );
    }

    #[test]
    fn test_poll_timeout_stays_below_cadence() {
        assert_eq!(poll_timeout(Duration::from_millis(500)), Duration::from_millis(400));
        assert!(poll_timeout(Duration::from_secs(2)) < Duration::from_secs(2));
        assert_eq!(poll_timeout(Duration::from_millis(10)), MIN_POLL_TIMEOUT);
    }

    #[test]
    fn test_entries_from_slice_maps_path_and_text() {
        let entries = entries_from_slice(
            br#"[{"filename": "a.png", "path": "wheel_images/a.png", "text": "Signed Ball"},
                 {"filename": "b.png", "path": "wheel_images/b.png"}]"#,
        )
        .unwrap();

        assert_eq!(
            entries,
            vec![
                WheelEntry::new("wheel_images/a.png", "Signed Ball"),
                WheelEntry::new("wheel_images/b.png", ""),
            ]
        );
        assert_matches!(entries_from_slice(b"{}"), Err(LoadError::Parse(_)));
    }

    #[test]
    fn test_http_wheel_source_fetches_entries() {
        let base = serve(vec![(
            WHEEL_DATA_PATH,
            200,
            r#"[{"path": "wheel_images/cap.png", "text": "Cap"}]"#,
        )]);
        let source = HttpWheelSource::new(&base).unwrap();
        assert_eq!(
            source.entries().unwrap(),
            vec![WheelEntry::new("wheel_images/cap.png", "Cap")]
        );
    }

    #[test]
    fn test_http_wheel_source_error_status_is_http_error() {
        let base = serve(vec![(WHEEL_DATA_PATH, 500, "oops")]);
        let source = HttpWheelSource::new(&base).unwrap();
        assert_matches!(source.entries(), Err(LoadError::Http(_)));
    }

    #[test]
    fn test_http_image_resolver() {
        let base = serve(vec![
            ("/static/wheel_images/ok.png", 200, "fake-png"),
            ("/static/wheel_images/empty.png", 200, ""),
        ]);
        let resolver = HttpWheelSource::new(&base).unwrap().image_resolver();

        let handle = resolver.resolve("wheel_images/ok.png").unwrap();
        assert_eq!(handle.reference, "wheel_images/ok.png");
        assert_eq!(handle.byte_len, 8);

        assert_matches!(
            resolver.resolve("wheel_images/empty.png"),
            Err(LoadError::ImageUnavailable { .. })
        );
        assert_matches!(
            resolver.resolve("wheel_images/missing.png"),
            Err(LoadError::ImageUnavailable { reference }) if reference == "wheel_images/missing.png"
        );
    }

    #[test]
    fn test_http_command_source_decodes_status() {
        let base = serve(vec![(
            STATUS_PATH,
            200,
            r#"{"command_id": 3, "command": "reset", "scores": {"left": 1, "right": 0}}"#,
        )]);
        let mut source = HttpCommandSource::new(&base, poll_timeout(Duration::from_millis(500)))
            .unwrap();
        let snap = source.poll().unwrap();
        assert_eq!(snap.command_id, 3);
        assert_eq!(snap.command, Some(crate::command::CommandKind::Reset));
    }

    #[test]
    fn test_http_command_source_non_success_is_status_error() {
        let base = serve(vec![(STATUS_PATH, 503, "")]);
        let mut source = HttpCommandSource::new(&base, MIN_POLL_TIMEOUT).unwrap();
        assert_matches!(source.poll(), Err(PollError::Status(503)));
    }

    #[test]
    fn test_unreachable_server_is_a_poll_error() {
        let mut source = HttpCommandSource::new(&closed_port(), MIN_POLL_TIMEOUT).unwrap();
        assert_matches!(source.poll(), Err(PollError::Http(_)));
    }
}
