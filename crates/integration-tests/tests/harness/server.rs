//! Test server wrapper that starts the bridge on a random port

use std::net::SocketAddr;

use bridge_config::Config;
use bridge_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        let server = Server::new(&config)?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Post a transcription form with a bearer key
    pub async fn transcribe(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.client
            .post(self.url("/v1/audio/transcriptions"))
            .bearer_auth("sk-test")
            .multipart(form)
            .send()
            .await
            .expect("transcription request failed")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Multipart form with an audio file and a model
pub fn audio_form(filename: &str, content_type: &str, bytes: Vec<u8>, model: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(filename.to_owned())
        .mime_str(content_type)
        .expect("valid content type");

    reqwest::multipart::Form::new()
        .part("file", part)
        .text("model", model.to_owned())
}

/// A 1 KiB RIFF/WAVE payload
pub fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF\x24\x04\x00\x00WAVEfmt ".to_vec();
    bytes.resize(1024, 0);
    bytes
}
