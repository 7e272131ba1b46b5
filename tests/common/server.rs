//! In-process server fixture
//!
//! Boots the real Axum application on an ephemeral port so end-to-end
//! tests exercise actual sockets, not hand-wired channels.

use std::net::SocketAddr;
use std::time::Duration;

use xfform::backend::server::config::ServerConfig;
use xfform::backend::server::init::create_app;
use xfform::client::FormStore;
use xfform::shared::ClientConfig;

/// A running coordination server bound to an ephemeral port
pub struct TestServer {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Boot the full application with the given configuration
    pub async fn start(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let app = create_app(config);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { addr, handle }
    }

    /// Boot with default configuration
    pub async fn start_default() -> Self {
        Self::start(ServerConfig::default()).await
    }

    /// WebSocket endpoint URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// HTTP base URL for this server
    pub fn http_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Connect a client store with a test-friendly debounce
    pub fn connect_store(&self, name: &str) -> FormStore {
        let config = ClientConfig::builder()
            .server_url(self.ws_url())
            .display_name(name)
            .debounce_delay(Duration::from_millis(25))
            .build()
            .expect("valid client config");
        FormStore::connect(config).expect("store connects")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
