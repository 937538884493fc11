// end_to_end.rs: Phase notifications delivered over loopback sockets.
//
// Each scenario configures a job, fires one phase through the Dispatcher
// and checks what the receivers actually got on the wire.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use pn_dispatch::{build_state, DispatchMode, Dispatcher, Endpoint, NotifyConfig};
use pn_model::{BuildParameter, BuildResult, JobState, Phase, RunRecord};
use pn_wire::{Format, Protocol};

/// Serve one HTTP request and hand its body back.
fn http_receiver() -> (String, mpsc::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .unwrap();
        tx.send(buf[header_end..].to_vec()).unwrap();
    });

    (format!("http://{}/build", addr), rx)
}

/// Accept one TCP connection and hand back everything written to it.
fn tcp_receiver() -> (String, mpsc::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).unwrap();
        tx.send(received).unwrap();
    });

    (addr.to_string(), rx)
}

/// An address nothing is listening on.
fn unreachable_tcp_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

fn config_for(job: &str, endpoints: Vec<Endpoint>) -> NotifyConfig {
    let mut config = NotifyConfig {
        connect_timeout_secs: 2,
        timeout_secs: 5,
        ..NotifyConfig::default()
    };
    config.add_endpoints(job, endpoints);
    config
}

fn recv(rx: &mpsc::Receiver<Vec<u8>>) -> Vec<u8> {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("receiver got nothing")
}

#[test]
fn started_phase_has_no_status_and_no_log() {
    let run = RunRecord::new("api", 10).with_log("checkout\nbuild\n");
    let endpoint = Endpoint::json(Protocol::Http, "http://unused");

    let state = build_state(Phase::Started, &run, &endpoint, None);

    assert_eq!(state.build.status, None);
    assert_eq!(state.build.log, "");
}

#[test]
fn completed_phase_with_full_log() {
    let run = RunRecord::new("api", 11)
        .with_result(BuildResult::Success)
        .with_log("line1\nline2\n");
    let endpoint = Endpoint::json(Protocol::Http, "http://unused").with_log_lines(-1);

    let state = build_state(Phase::Completed, &run, &endpoint, None);

    assert_eq!(state.build.status.as_deref(), Some("SUCCESS"));
    assert_eq!(state.build.log, "line1\nline2\n");
}

#[test]
fn http_endpoint_receives_payload_despite_tcp_failure() {
    let (http_url, http_rx) = http_receiver();
    let config = config_for(
        "api",
        vec![
            Endpoint::json(Protocol::Tcp, unreachable_tcp_url()),
            Endpoint::json(Protocol::Http, http_url.clone()),
        ],
    );
    let run = RunRecord::new("api", 12).with_result(BuildResult::Failure);

    let report = Dispatcher::new(config).handle(Phase::Completed, &run);

    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.outcomes[0].is_delivered());
    assert!(report.outcomes[0].endpoint.starts_with("TCP:127.0.0.1:"));
    assert!(report.outcomes[1].is_delivered());

    let state: JobState = serde_json::from_slice(&recv(&http_rx)).unwrap();
    assert_eq!(state.name, "api");
    assert_eq!(state.build.number, 12);
    assert_eq!(state.build.status.as_deref(), Some("FAILURE"));
}

#[test]
fn sensitive_parameter_never_reaches_the_wire() {
    let (http_url, http_rx) = http_receiver();
    let config = config_for("api", vec![Endpoint::json(Protocol::Http, http_url)]);
    let run = RunRecord::new("api", 13).with_parameters(vec![
        BuildParameter::string("SECRET", "x").sensitive(),
        BuildParameter::string("BRANCH", "main"),
    ]);

    let report = Dispatcher::new(config).handle(Phase::Started, &run);
    assert!(report.all_delivered());

    let body = recv(&http_rx);
    let state: JobState = serde_json::from_slice(&body).unwrap();
    let params = state.build.parameters.unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params["BRANCH"], "main");
    assert!(!String::from_utf8_lossy(&body).contains("SECRET"));
}

#[test]
fn each_endpoint_gets_its_own_log_and_format() {
    let (json_url, json_rx) = http_receiver();
    let (tcp_url, tcp_rx) = tcp_receiver();
    let mut config = config_for(
        "api",
        vec![
            Endpoint::json(Protocol::Http, json_url).with_log_lines(1),
            Endpoint::new(Protocol::Tcp, tcp_url, Some(Format::Xml), Some(2)),
        ],
    );
    config.root_url = Some("https://ci.example.com/".to_string());
    let run = RunRecord::new("api", 14)
        .with_result(BuildResult::Unstable)
        .with_log("fetch\ncompile\nflaky test\n");

    let report = Dispatcher::new(config).handle(Phase::Finished, &run);
    assert!(report.all_delivered());

    let json_state: JobState = serde_json::from_slice(&recv(&json_rx)).unwrap();
    assert_eq!(json_state.build.log, "flaky test\n");
    assert_eq!(
        json_state.build.full_url.as_deref(),
        Some("https://ci.example.com/job/api/14/")
    );

    let xml = recv(&tcp_rx);
    assert!(String::from_utf8_lossy(&xml).contains("<phase>FINISHED</phase>"));
    let xml_state = Format::Xml.deserialize(&xml).unwrap();
    assert_eq!(xml_state.build.status.as_deref(), Some("UNSTABLE"));
    assert_eq!(xml_state.build.log, "compile\nflaky test\n");
}

#[test]
fn concurrent_mode_reports_in_configured_order() {
    let (first_url, first_rx) = http_receiver();
    let (second_url, second_rx) = http_receiver();
    let mut config = config_for(
        "api",
        vec![
            Endpoint::json(Protocol::Http, first_url.clone()),
            Endpoint::json(Protocol::Tcp, unreachable_tcp_url()),
            Endpoint::json(Protocol::Http, second_url.clone()),
        ],
    );
    config.mode = DispatchMode::Concurrent;

    let report = Dispatcher::new(config)
        .handle(Phase::Started, &RunRecord::new("api", 15));

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[0].endpoint, format!("HTTP:{}", first_url));
    assert_eq!(report.outcomes[2].endpoint, format!("HTTP:{}", second_url));
    assert_eq!(report.delivered(), 2);
    assert_eq!(report.failures().count(), 1);

    recv(&first_rx);
    recv(&second_rx);
}

#[test]
fn other_jobs_are_not_notified() {
    let (http_url, http_rx) = http_receiver();
    let config = config_for("api", vec![Endpoint::json(Protocol::Http, http_url)]);

    let report = Dispatcher::new(config)
        .handle(Phase::Started, &RunRecord::new("web", 1));

    assert!(report.is_empty());
    assert!(http_rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[tokio::test]
async fn handle_works_from_inside_an_async_runtime() {
    let (http_url, http_rx) = http_receiver();
    let config = config_for(
        "api",
        vec![Endpoint::new(Protocol::Http, http_url, Some(Format::Xml), Some(-1))],
    );
    let run = RunRecord::new("api", 16)
        .with_result(BuildResult::Success)
        .with_log("line1\nline2\n");

    let report = Dispatcher::new(config).handle(Phase::Completed, &run);

    assert!(report.all_delivered());
    let state = Format::Xml.deserialize(&recv(&http_rx)).unwrap();
    assert_eq!(state.build.log, "line1\nline2\n");
}
