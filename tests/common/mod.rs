//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use route_facade::config::FacadeConfig;
use route_facade::{HttpServer, Shutdown};

/// GeoJSON as returned by the YOURS gosmore service: `[lon, lat]` pairs.
pub const YOURS_BODY: &str = r#"{
  "type": "LineString",
  "crs": {"type": "EPSG", "properties": {"code": 4326, "coordinate_order": [1, 0]}},
  "coordinates": [[172.6395, -43.5359], [172.6401, -43.5352], [172.6396, -43.53479]],
  "properties": {"distance": "0.152", "description": "Go straight<br>Turn left<br>", "traveltime": "21"}
}"#;

/// ArcGIS solve response with Web Mercator paths around Christchurch.
pub const ECAN_BODY: &str = r#"{
  "directions": [{
    "routeId": 1,
    "routeName": "Location 1 - Location 2",
    "summary": {"totalLength": 0.42, "totalTime": 1.5, "totalDriveTime": 1.5},
    "features": [
      {"attributes": {"length": 0, "time": 0, "text": "Start at Location 1"}},
      {"attributes": {"length": 0.42, "time": 1.5, "text": "Finish at Location 2"}}
    ]
  }],
  "routes": {
    "spatialReference": {"wkid": 102100, "latestWkid": 3857},
    "features": [{
      "attributes": {"ObjectID": 1, "Name": "Location 1 - Location 2"},
      "geometry": {"paths": [[
        [19217737.63, -5393985.11, 0],
        [19217830.21, -5393702.47, 0.2],
        [19218001.95, -5393560.32, 0.42]
      ]]}
    }]
  },
  "messages": []
}"#;

/// A canned upstream answer.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            ..Self::ok(body)
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Mock upstream provider on an ephemeral port. Records request lines and
/// connections the caller closed before the reply was sent.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    abandoned: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let abandoned = Arc::new(AtomicUsize::new(0));
        let seen = requests.clone();
        let closed = abandoned.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let reply = reply.clone();
                        let seen = seen.clone();
                        let closed = closed.clone();
                        tokio::spawn(async move {
                            serve_one(socket, reply, seen, closed).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self {
            addr,
            requests,
            abandoned,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Request lines seen so far, e.g. `GET /yours?flat=... HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Connections closed by the caller while the reply was still delayed.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }
}

async fn serve_one(
    mut socket: TcpStream,
    reply: Reply,
    seen: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicUsize>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&buf);
    if let Some(line) = head.lines().next() {
        seen.lock().unwrap().push(line.to_string());
    }

    let delay = tokio::time::sleep(reply.delay);
    tokio::pin!(delay);
    loop {
        tokio::select! {
            _ = &mut delay => break,
            read = socket.read(&mut chunk) => match read {
                Ok(0) | Err(_) => {
                    closed.fetch_add(1, Ordering::SeqCst);
                    return;
                }
                Ok(_) => {}
            },
        }
    }

    let status_text = match reply.status {
        200 => "200 OK",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        reply.body.len(),
        reply.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config pointing both providers at the given base URLs.
pub fn facade_config(yours_url: &str, ecan_url: &str) -> FacadeConfig {
    let mut config = FacadeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.providers.system_proxy = false;
    config.providers.yours.base_url = yours_url.into();
    config.providers.ecan.base_url = ecan_url.into();
    config.providers.yours.timeout_secs = 1;
    config.providers.ecan.timeout_secs = 1;
    config
}

/// A running facade. Shuts down on drop.
pub struct Facade {
    pub base: String,
    shutdown: Shutdown,
}

impl Facade {
    pub async fn start(config: FacadeConfig) -> Self {
        let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HttpServer::new(config).unwrap();
        let shutdown = Shutdown::new();
        let signal = shutdown.clone();
        tokio::spawn(async move {
            server.run(listener, signal).await.unwrap();
        });
        Self {
            base: format!("http://{}", addr),
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl Drop for Facade {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
