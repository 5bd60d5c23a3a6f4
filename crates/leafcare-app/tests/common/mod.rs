//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use leafcare_app::{AppConfig, DiagnosisSession};
use leafcare_capture::{CameraStats, SyntheticCamera};
use leafcare_core::{CapturedImage, ImageSource};
use leafcare_upload::{DiagnosisTransport, HttpResponse, TransportError};
use url::Url;

/// Transport replaying canned responses and counting calls.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    upload_replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    history_replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    upload_calls: AtomicUsize,
    history_calls: AtomicUsize,
    uploaded: Mutex<Vec<(String, ImageSource)>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Queues an upload response.
    pub fn upload_reply(self, status: u16, body: &str) -> Self {
        self.upload_replies
            .lock()
            .expect("reply lock should work")
            .push_back(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }));
        self
    }

    /// Queues an upload transport failure.
    pub fn upload_failure(self) -> Self {
        self.upload_replies
            .lock()
            .expect("reply lock should work")
            .push_back(Err(TransportError::Unreachable(
                "connection refused".to_string(),
            )));
        self
    }

    /// Queues a history response.
    pub fn history_reply(self, status: u16, body: &str) -> Self {
        self.history_replies
            .lock()
            .expect("reply lock should work")
            .push_back(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }));
        self
    }

    /// Number of upload requests issued.
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Number of history requests issued.
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    /// File name and source of every uploaded image, in order.
    pub fn uploaded(&self) -> Vec<(String, ImageSource)> {
        self.uploaded.lock().expect("upload log lock should work").clone()
    }
}

impl DiagnosisTransport for ScriptedTransport {
    fn post_image(
        &self,
        _endpoint: &Url,
        image: &CapturedImage,
    ) -> Result<HttpResponse, TransportError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded
            .lock()
            .expect("upload log lock should work")
            .push((image.filename().to_string(), image.source()));
        self.upload_replies
            .lock()
            .expect("reply lock should work")
            .pop_front()
            .unwrap_or(Err(TransportError::Unreachable("no scripted reply".to_string())))
    }

    fn get(&self, _endpoint: &Url) -> Result<HttpResponse, TransportError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_replies
            .lock()
            .expect("reply lock should work")
            .pop_front()
            .unwrap_or(Err(TransportError::Unreachable("no scripted reply".to_string())))
    }
}

/// Deterministic config that ignores the process environment.
pub fn fixture_config() -> AppConfig {
    AppConfig::with_overrides(Some("http://127.0.0.1:5000"), Some(5))
        .expect("fixture config should build")
}

/// Builds a session around a scripted transport and a synthetic camera.
#[allow(dead_code)]
pub fn fixture_session(
    transport: ScriptedTransport,
) -> (DiagnosisSession, Arc<ScriptedTransport>, Arc<CameraStats>) {
    let transport = Arc::new(transport);
    let camera = SyntheticCamera::new(4, 4);
    let stats = camera.stats();
    let session = DiagnosisSession::new(&fixture_config(), transport.clone(), Box::new(camera));
    (session, transport, stats)
}

/// Small file-sourced image.
#[allow(dead_code)]
pub fn fixture_file_image() -> CapturedImage {
    CapturedImage::new("leaf.jpg", "image/jpeg", ImageSource::File, vec![0xFF, 0xD8, 0xFF])
        .expect("fixture image should be valid")
}
