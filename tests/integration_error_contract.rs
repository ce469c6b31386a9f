use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use http::Method;
use routex::prelude::{ApiClient, ApiError, ErrorKind, RetryPolicy, Route};
use serde_json::Value;

// Answers exactly one connection with a preformatted JSON reply, then
// exits. Every status-mapping test needs nothing more than that.
struct StubServer {
    url: String,
    join: Option<JoinHandle<()>>,
}

impl StubServer {
    fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let url = format!("http://{}", listener.local_addr().expect("stub address"));
        listener.set_nonblocking(true).expect("stub nonblocking");

        let reply = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            reason(status),
            body.len()
        );
        let join = thread::spawn(move || serve_once(&listener, &reply));

        Self {
            url,
            join: Some(join),
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn serve_once(listener: &TcpListener, reply: &str) {
    let gave_up = Instant::now() + Duration::from_secs(5);
    loop {
        match listener.accept() {
            Ok((mut stream, _)) => {
                drain_request(&mut stream);
                let _ = stream.write_all(reply.as_bytes());
                let _ = stream.flush();
                return;
            }
            Err(error)
                if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < gave_up =>
            {
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return,
        }
    }
}

fn drain_request(stream: &mut TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_millis(800)));
    let mut seen = Vec::new();
    let mut scratch = [0_u8; 512];
    while let Ok(read) = stream.read(&mut scratch) {
        if read == 0 {
            return;
        }
        seen.extend_from_slice(&scratch[..read]);
        if seen.windows(4).any(|window| window == b"\r\n\r\n") {
            return;
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        408 => "Request Timeout",
        418 => "I'm a teapot",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

struct StatusRoute {
    url: String,
}

impl Route for StatusRoute {
    fn base_host(&self) -> String {
        self.url.clone()
    }

    fn path(&self) -> String {
        "/status".to_owned()
    }

    fn method(&self) -> Method {
        Method::GET
    }
}

async fn status_error(status: u16, body: &str) -> ApiError {
    let server = StubServer::respond(status, body);
    let client = ApiClient::builder()
        .retry_policy(RetryPolicy::disabled())
        .build();

    client
        .request::<Value, _>(&StatusRoute {
            url: server.url.clone(),
        })
        .await
        .expect_err("the response should map to an error")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn transient_statuses_carry_the_server_detail() {
    let cases = [
        (408, ErrorKind::RequestTimeout),
        (429, ErrorKind::TooManyRequests),
        (500, ErrorKind::InternalServerError),
        (503, ErrorKind::ServiceUnavailable),
        (504, ErrorKind::GatewayTimeout),
    ];

    for (status, kind) in cases {
        let error = status_error(status, r#"{"code":"e42","message":"temporarily busy"}"#).await;
        assert_eq!(error.kind(), kind, "status {status}");
        assert_eq!(error.server_code(), Some("e42"), "status {status}");
        assert_eq!(error.user_message(), "temporarily busy", "status {status}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn transient_statuses_survive_an_undecodable_body() {
    let cases = [
        (408, ErrorKind::RequestTimeout),
        (429, ErrorKind::TooManyRequests),
        (500, ErrorKind::InternalServerError),
        (503, ErrorKind::ServiceUnavailable),
        (504, ErrorKind::GatewayTimeout),
    ];

    for (status, kind) in cases {
        let error = status_error(status, "<html>down</html>").await;
        assert_eq!(error.kind(), kind, "status {status}");
        assert_eq!(error.server_code(), None, "status {status}");
        assert_eq!(error.user_message(), "UnknownError", "status {status}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unmapped_status_with_an_error_body_is_a_server_error() {
    let error = status_error(418, r#"{"code":"teapot","message":"no coffee here"}"#).await;

    assert_eq!(error.kind(), ErrorKind::OnServerError);
    assert_eq!(error.server_code(), Some("teapot"));
    assert_eq!(error.user_message(), "no coffee here");
    match error {
        ApiError::OnServerError { model } => {
            assert_eq!(model.code.as_deref(), Some("teapot"));
            assert_eq!(model.message.as_deref(), Some("no coffee here"));
            assert!(!model.should_log_out(Some(418)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn account_invalidation_codes_signal_a_log_out() {
    let error = status_error(418, r#"{"code":"accountLocked"}"#).await;

    match error {
        ApiError::OnServerError { model } => {
            assert!(model.should_log_out(Some(418)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unmapped_status_with_junk_is_an_invalid_response() {
    let error = status_error(418, "<html>teapot</html>").await;
    assert_eq!(error.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn success_with_a_mismatched_body_is_an_invalid_response() {
    #[derive(Debug, serde::Deserialize)]
    struct Expected {
        #[allow(dead_code)]
        id: u64,
    }

    let server = StubServer::respond(200, r#"{"unexpected":true}"#);
    let client = ApiClient::builder()
        .retry_policy(RetryPolicy::disabled())
        .build();

    let error = client
        .request::<Expected, _>(&StatusRoute {
            url: server.url.clone(),
        })
        .await
        .expect_err("decoding should fail");
    assert_eq!(error.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_server_is_no_internet() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve a port");
    let address = listener.local_addr().expect("reserved address");
    drop(listener);

    let client = ApiClient::builder()
        .retry_policy(RetryPolicy::disabled())
        .build();
    let error = client
        .request::<Value, _>(&StatusRoute {
            url: format!("http://{address}"),
        })
        .await
        .expect_err("nothing is listening");

    match error {
        ApiError::NoInternet => {}
        other => panic!("unexpected error: {other}"),
    }
}
