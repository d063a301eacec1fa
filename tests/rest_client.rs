//! `RestClient` against a local HTTP stub
//!
//! Each test serves a fixed list of responses, one connection per request,
//! and inspects what the client sent.

mod common;

use bytes::Bytes;
use common::{collection_of, PassThroughResizer};
use photo_uploader::multipart::FractionCallback;
use photo_uploader::{
    AlbumId, FormFields, MultipartEncoder, PipelineState, RemoteApi, RestClient, UploadCallbacks,
    UploadPipeline, UploaderConfig, UploaderError,
};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// What the stub received for one request
#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct StubServer {
    endpoint: String,
    requests: mpsc::UnboundedReceiver<CapturedRequest>,
}

impl StubServer {
    /// Answer the next requests with `responses`, in order
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/restserver.php", listener.local_addr().unwrap());
        let (tx, requests) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (socket, _) = listener.accept().await.unwrap();
                let (read_half, mut write_half) = socket.into_split();
                let mut reader = BufReader::new(read_half);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).await.unwrap();
                let mut headers = Vec::new();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        headers.push((name.trim().to_string(), value.trim().to_string()));
                    }
                }
                let mut request = CapturedRequest {
                    request_line: request_line.trim_end().to_string(),
                    headers,
                    body: Vec::new(),
                };

                if let Some(length) = request.header("content-length") {
                    let mut body = vec![0u8; length.parse().unwrap()];
                    reader.read_exact(&mut body).await.unwrap();
                    request.body = body;
                } else if request.header("transfer-encoding") == Some("chunked") {
                    loop {
                        let mut size = String::new();
                        reader.read_line(&mut size).await.unwrap();
                        let size = usize::from_str_radix(size.trim(), 16).unwrap();
                        let mut chunk = vec![0u8; size + 2];
                        reader.read_exact(&mut chunk).await.unwrap();
                        if size == 0 {
                            break;
                        }
                        request.body.extend_from_slice(&chunk[..size]);
                    }
                }

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                write_half.write_all(response.as_bytes()).await.unwrap();
                write_half.shutdown().await.unwrap();
                let _ = tx.send(request);
            }
        });

        Self { endpoint, requests }
    }

    async fn next_request(&mut self) -> CapturedRequest {
        self.requests.recv().await.unwrap()
    }
}

fn client_for(endpoint: &str) -> RestClient {
    let config = UploaderConfig::new()
        .credentials("key", "secret", "session")
        .uid("42")
        .endpoint(endpoint)
        .chunk_size(16)
        .timeout(10);
    RestClient::new(&config).unwrap()
}

fn form_value(body: &[u8], name: &str) -> Option<String> {
    let body = String::from_utf8(body.to_vec()).unwrap();
    body.split('&').find_map(|pair| {
        let (n, v) = pair.split_once('=')?;
        (n == name).then(|| v.to_string())
    })
}

#[tokio::test]
async fn test_call_posts_a_signed_form() {
    let _ = env_logger::try_init();
    let mut server = StubServer::start(vec![(200, r#"{"answer": 1}"#)]).await;
    let client = client_for(&server.endpoint);

    let value = client
        .call("photos.getAlbums", FormFields::new().with("uid", "42"))
        .await
        .unwrap();
    assert_eq!(value, serde_json::json!({"answer": 1}));

    let request = server.next_request().await;
    assert!(request.request_line.starts_with("POST /restserver.php"));
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(form_value(&request.body, "method").as_deref(), Some("photos.getAlbums"));
    assert_eq!(form_value(&request.body, "uid").as_deref(), Some("42"));
    assert_eq!(form_value(&request.body, "api_key").as_deref(), Some("key"));
    assert_eq!(form_value(&request.body, "format").as_deref(), Some("JSON"));
    assert!(form_value(&request.body, "sig").is_some());
}

#[tokio::test]
async fn test_error_code_body_is_a_server_error() {
    let server = StubServer::start(vec![(
        200,
        r#"{"error_code": 100, "error_msg": "Invalid parameter"}"#,
    )])
    .await;
    let client = client_for(&server.endpoint);

    match client.call("photos.getAlbums", FormFields::new()).await {
        Err(UploaderError::ServerError { code, message }) => {
            assert_eq!(code, 100);
            assert_eq!(message, "Invalid parameter");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_error_code_wins_over_http_status() {
    let server = StubServer::start(vec![(
        500,
        r#"{"error_code": 2, "error_msg": "Service temporarily unavailable"}"#,
    )])
    .await;
    let client = client_for(&server.endpoint);

    let err = client.call("users.hasAppPermission", FormFields::new()).await.unwrap_err();
    assert!(matches!(err, UploaderError::ServerError { code: 2, .. }));
}

#[tokio::test]
async fn test_unparseable_success_is_malformed() {
    let server = StubServer::start(vec![(200, "<html>maintenance</html>")]).await;
    let client = client_for(&server.endpoint);

    match client.call("photos.getAlbums", FormFields::new()).await {
        Err(UploaderError::MalformedResponse { body, .. }) => {
            assert_eq!(body, "<html>maintenance</html>");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_status_without_json_is_a_transport_failure() {
    let server = StubServer::start(vec![(502, "<html>Bad gateway</html>")]).await;
    let client = client_for(&server.endpoint);

    let err = client.call("photos.getAlbums", FormFields::new()).await.unwrap_err();
    match err {
        UploaderError::TransportFailure { ref message } => assert!(message.contains("502")),
        ref other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.kind(), "E_TRANSPORT");
}

#[tokio::test]
async fn test_refused_connection_is_a_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/restserver.php", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(&endpoint)
        .call("photos.getAlbums", FormFields::new())
        .await
        .unwrap_err();
    assert!(matches!(err, UploaderError::TransportFailure { .. }));
}

#[tokio::test]
async fn test_multipart_headers_and_body() {
    let mut server = StubServer::start(vec![(200, r#"{"pid": "555"}"#)]).await;
    let client = client_for(&server.endpoint);

    let fields = client.sign(FormFields::new().with("method", "photos.upload"));
    let body = MultipartEncoder::new().encode("a.jpg", &fields, Bytes::from(vec![7u8; 100]));
    let expected = body.to_bytes();
    let content_type = body.content_type();

    let fractions = Arc::new(Mutex::new(Vec::new()));
    let sink = fractions.clone();
    let on_progress: FractionCallback = Arc::new(move |f| sink.lock().unwrap().push(f));

    let response = client.submit_multipart(body, on_progress).await.unwrap();
    assert_eq!(response["pid"], "555");

    let request = server.next_request().await;
    assert_eq!(request.header("content-type"), Some(content_type.as_str()));
    assert_eq!(
        request.header("content-type"),
        Some("multipart/form-data; boundary=facebookPhotoUploaderBoundary")
    );
    assert_eq!(request.header("mime-version"), Some("1.0"));
    assert_eq!(
        request.header("content-length"),
        Some(expected.len().to_string().as_str())
    );
    assert_eq!(request.body, expected.to_vec());

    let fractions = fractions.lock().unwrap();
    assert!(fractions.len() > 1);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*fractions.last().unwrap(), 1.0);
}

async fn run_against(responses: Vec<(u16, &'static str)>) -> (UploadPipeline, Vec<String>) {
    let server = StubServer::start(responses).await;
    let dir = tempdir().unwrap();
    let (photos, _) = collection_of(dir.path(), &[10, 20]);
    let pipeline = UploadPipeline::new(
        photos,
        Arc::new(client_for(&server.endpoint)),
        Arc::new(PassThroughResizer::default()),
    );

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let callbacks =
        UploadCallbacks::new().on_error(move |_, err| sink.lock().unwrap().push(err.kind().to_string()));
    let _ = pipeline.start(AlbumId::default_album(), callbacks).await;

    let errors = errors.lock().unwrap().clone();
    (pipeline, errors)
}

#[tokio::test]
async fn test_pipeline_uploads_through_http() {
    let (pipeline, errors) =
        run_against(vec![(200, r#"{"pid": "1"}"#), (200, r#"{"pid": 2}"#)]).await;
    assert!(errors.is_empty());
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(pipeline.uploaded_bytes(), 30);
}

#[tokio::test]
async fn test_pipeline_reports_malformed_upload_response() {
    let (pipeline, errors) = run_against(vec![(200, r#"{"pid": "1"}"#), (200, "ok")]).await;
    assert_eq!(errors, vec!["E_MALFORMED_RESPONSE".to_string()]);
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(pipeline.uploaded_bytes(), 10);
}

#[tokio::test]
async fn test_pipeline_reports_transport_failure() {
    let (pipeline, errors) = run_against(vec![(503, "Service Unavailable")]).await;
    assert_eq!(errors, vec!["E_TRANSPORT".to_string()]);
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(pipeline.uploaded_bytes(), 0);
}
