//! `ReqwestBackend` against a local one-shot HTTP server.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lvhttp_client::{ClientConfig, DefaultHttpClient, DownloadListener, DownloadTarget, UploadPart};
use lvhttp_core::{BaseResponse, ErrorKey, RequestError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One canned reply per accepted connection, in order.
enum Reply {
    Send(Vec<u8>),
    Hang,
}

fn reply(status: &str, content_type: &str, body: &[u8]) -> Reply {
    let mut bytes = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    bytes.extend_from_slice(body);
    Reply::Send(bytes)
}

fn json(status: &str, body: &str) -> Reply {
    reply(status, "application/json", body.as_bytes())
}

struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            for reply in replies {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                log.lock().unwrap().push(request);
                match reply {
                    Reply::Send(bytes) => {
                        let _ = socket.write_all(&bytes).await;
                        let _ = socket.shutdown().await;
                    }
                    Reply::Hang => tokio::time::sleep(Duration::from_secs(30)).await,
                }
            }
        });

        Self { addr, requests }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_base_url(format!("http://{}/api", self.addr))
            .with_retry_delay(Duration::from_millis(1))
            .with_system_proxy(false)
    }

    fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> String {
        self.requests.lock().unwrap()[index].clone()
    }
}

/// Read one request: headers, then a `Content-Length` body or a chunked one.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let headers = text[..header_end].to_lowercase();
    let body_len = buf.len() - (header_end + 4);
    if headers.contains("transfer-encoding: chunked") {
        return text.ends_with("0\r\n\r\n");
    }
    let expected = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body_len >= expected
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Create(Option<u64>),
    Progress(f32),
    Error(String),
    Done(PathBuf),
}

#[derive(Default)]
struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl DownloadListener for RecordingListener {
    fn on_create(&self, total_bytes: Option<u64>) {
        self.events.lock().unwrap().push(Event::Create(total_bytes));
    }

    fn on_progress(&self, percent: f32) {
        self.events.lock().unwrap().push(Event::Progress(percent));
    }

    fn on_error(&self, error: &RequestError) {
        self.events.lock().unwrap().push(Event::Error(error.to_string()));
    }

    fn on_done(&self, path: &Path) {
        self.events.lock().unwrap().push(Event::Done(path.to_path_buf()));
    }
}

#[tokio::test]
async fn get_decodes_json_envelope() {
    let server =
        TestServer::start(vec![json("200 OK", r#"{"code":200,"msg":"ok","data":[1,2,3]}"#)]).await;
    let client = DefaultHttpClient::new(&server.config()).unwrap();

    let response: BaseResponse<Vec<u32>> = client.get("article/list").await.unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(response.data, Some(vec![1, 2, 3]));
    assert!(server.request(0).starts_with("GET /api/article/list HTTP/1.1"));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = TestServer::start(vec![
        json("503 Service Unavailable", "{}"),
        json("200 OK", r#"{"code":200}"#),
    ])
    .await;
    let client = DefaultHttpClient::new(&server.config().with_max_retries(2)).unwrap();

    let response: BaseResponse<()> = client.get("flaky").await.unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn retries_give_up_with_last_status() {
    let server = TestServer::start(vec![
        json("500 Internal Server Error", "{}"),
        json("502 Bad Gateway", "{}"),
    ])
    .await;
    let client = DefaultHttpClient::new(&server.config().with_max_retries(1)).unwrap();

    let err = client.get::<BaseResponse<()>>("down").await.unwrap_err();

    assert!(matches!(err, RequestError::Http { status: 502, .. }));
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = TestServer::start(vec![json("404 Not Found", "{}")]).await;
    let client = DefaultHttpClient::new(&server.config().with_max_retries(3)).unwrap();

    let err = client.get::<BaseResponse<()>>("missing").await.unwrap_err();

    assert_eq!(err.key(), Some(ErrorKey::Http));
    assert!(matches!(err, RequestError::Http { status: 404, .. }));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = TestServer::start(vec![json("200 OK", "<html>not json</html>")]).await;
    let client = DefaultHttpClient::new(&server.config()).unwrap();

    let err = client.get::<BaseResponse<()>>("page").await.unwrap_err();

    assert_eq!(err.key(), Some(ErrorKey::Decode));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = TestServer::start(vec![Reply::Hang]).await;
    let config = server
        .config()
        .with_timeout(Duration::from_millis(200))
        .with_max_retries(0);
    let client = DefaultHttpClient::new(&config).unwrap();

    let err = client.get::<BaseResponse<()>>("slow").await.unwrap_err();

    assert_eq!(err.key(), Some(ErrorKey::Timeout));
}

#[tokio::test]
async fn timed_out_form_post_is_not_resent() {
    let server = TestServer::start(vec![Reply::Hang, json("200 OK", r#"{"code":200}"#)]).await;
    let config = server
        .config()
        .with_timeout(Duration::from_millis(200))
        .with_max_retries(3);
    let client = DefaultHttpClient::new(&config).unwrap();
    let form = vec![("amount".to_string(), "10".to_string())];

    let err = client
        .post_form::<BaseResponse<()>>("order/pay", &form)
        .await
        .unwrap_err();

    assert_eq!(err.key(), Some(ErrorKey::Timeout));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn server_error_on_upload_is_not_resent() {
    let server = TestServer::start(vec![
        json("503 Service Unavailable", "{}"),
        json("200 OK", r#"{"code":200}"#),
    ])
    .await;
    let client = DefaultHttpClient::new(&server.config().with_max_retries(3)).unwrap();
    let parts = vec![UploadPart::text("nickname", "lv")];

    let err = client
        .upload::<BaseResponse<()>>("file/upload", &parts)
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Http { status: 503, .. }));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn refused_form_post_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let config = ClientConfig::new()
        .with_base_url(format!("http://{addr}/api"))
        .with_retry_delay(Duration::from_millis(1))
        .with_max_retries(2)
        .with_system_proxy(false);
    let client = DefaultHttpClient::new(&config).unwrap();

    let err = client
        .post_form::<BaseResponse<()>>("user/login", &[])
        .await
        .unwrap_err();

    assert_eq!(err.key(), Some(ErrorKey::Connect));
}

#[tokio::test]
async fn form_post_sends_fields_and_bearer_token() {
    let server = TestServer::start(vec![json("200 OK", r#"{"code":200,"data":"token"}"#)]).await;
    let client = DefaultHttpClient::new(&server.config().with_token("secret")).unwrap();
    let form = vec![
        ("phone".to_string(), "15100000000".to_string()),
        ("password".to_string(), "hunter2".to_string()),
    ];

    let response: BaseResponse<String> = client.post_form("user/login", &form).await.unwrap();

    assert_eq!(response.data.as_deref(), Some("token"));
    let request = server.request(0).to_lowercase();
    assert!(request.starts_with("post /api/user/login"));
    assert!(request.contains("authorization: bearer secret"));
    assert!(request.contains("phone=15100000000&password=hunter2"));
}

#[tokio::test]
async fn multipart_upload_sends_every_part() {
    let server = TestServer::start(vec![json("200 OK", r#"{"code":200}"#)]).await;
    let client = DefaultHttpClient::new(&server.config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("avatar.png");
    std::fs::write(&file, b"PNGDATA").unwrap();
    let parts = vec![
        UploadPart::text("nickname", "lv"),
        UploadPart::file("avatar", &file).unwrap().with_mime("image/png"),
    ];

    let response: BaseResponse<()> = client.upload("file/upload", &parts).await.unwrap();

    assert_eq!(response.code, 200);
    let request = server.request(0);
    assert!(request.contains("multipart/form-data; boundary="));
    assert!(request.contains(r#"name="nickname""#));
    assert!(request.contains(r#"name="avatar"; filename="avatar.png""#));
    assert!(request.contains("PNGDATA"));
}

#[tokio::test]
async fn download_streams_to_file_and_reports_progress() {
    let body: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    let server =
        TestServer::start(vec![reply("200 OK", "application/octet-stream", &body)]).await;
    let client = DefaultHttpClient::new(&server.config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let target = DownloadTarget::new(dir.path().join("LvHttp"), "app.apk");
    let listener = RecordingListener::default();

    let path = client.download("files/app.apk", &target, &listener).await.unwrap();

    assert_eq!(path, target.path());
    assert_eq!(std::fs::read(&path).unwrap(), body);

    let events = listener.events();
    assert_eq!(events.first(), Some(&Event::Create(Some(body.len() as u64))));
    assert_eq!(events.last(), Some(&Event::Done(target.path())));
    assert_eq!(events[events.len() - 2], Event::Progress(100.0));
    let percents: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            Event::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn failed_download_reports_error_and_leaves_no_file() {
    let server = TestServer::start(vec![json("404 Not Found", "{}")]).await;
    let client = DefaultHttpClient::new(&server.config().with_max_retries(0)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let target = DownloadTarget::new(dir.path(), "missing.apk");
    let listener = RecordingListener::default();

    let err = client.download("files/missing.apk", &target, &listener).await.unwrap_err();

    assert!(matches!(err, RequestError::Http { status: 404, .. }));
    assert_eq!(listener.events(), vec![Event::Error(err.to_string())]);
    assert!(!target.path().exists());
}
