use std::{
    io::Read,
    net::TcpListener,
    thread,
    time::Duration,
};

use gurukul_admin::api::{
    ApiClient,
    UNKNOWN_ERROR,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tiny_http::{
    Header,
    Response,
    Server,
};

/// Serves one canned response per expected request, then shuts down.
fn stub_server(replies: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().map(|a| a.port()).unwrap();

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(5)) else {
                break;
            };
            let mut request_body = String::new();
            let _ = request.as_reader().read_to_string(&mut request_body);
            seen.push(format!("{} {} {}", request.method(), request.url(), request_body));

            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = Response::from_string(body).with_status_code(status).with_header(header);
            let _ = request.respond(response);
        }
        seen
    });

    (format!("http://127.0.0.1:{port}/"), handle)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::connect(base_url, Duration::from_secs(5)).unwrap()
}

#[test]
fn json_body_is_decoded_and_payload_sent() {
    let (base, server) = stub_server(vec![(201, r#"{"gid": 7, "gname": "Prabodh"}"#)]);
    let api = client(&base);

    let response = api.post("/gurukul", &json!({"gname": "Prabodh"}));

    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"gid": 7, "gname": "Prabodh"}));
    assert!(!response.malformed);
    assert_eq!(api.reachable(), Some(true));
    assert_eq!(server.join().unwrap(), vec![r#"POST /gurukul {"gname":"Prabodh"}"#.to_string()]);
}

#[test]
fn no_content_yields_empty_object() {
    let (base, server) = stub_server(vec![(204, "")]);
    let api = client(&base);

    let response = api.delete("/users/3");

    assert_eq!(response.status, 204);
    assert_eq!(response.body, json!({}));
    server.join().unwrap();
}

#[test]
fn non_json_body_is_reported_as_unknown_error() {
    let (base, server) = stub_server(vec![(502, "<html>Bad Gateway</html>")]);
    let api = client(&base);

    let response = api.get("/topics");

    assert_eq!(response.status, 502);
    assert!(response.malformed);
    assert_eq!(
        response.body["message"],
        json!("Invalid JSON response from API: <html>Bad Gateway</html>")
    );
    assert_eq!(response.error_message(), UNKNOWN_ERROR);
    server.join().unwrap();
}

#[test]
fn server_error_message_is_surfaced() {
    let (base, server) = stub_server(vec![(
        409,
        r#"{"message": "Student with email 'a@b.org' already exists."}"#,
    )]);
    let api = client(&base);

    let response = api.post("/students", &json!({"sname": "Asha", "email": "a@b.org"}));

    assert_eq!(response.status, 409);
    assert_eq!(response.error_message(), "Student with email 'a@b.org' already exists.");
    assert!(api.take_alerts().is_empty());
    server.join().unwrap();
}

#[test]
fn refused_connection_maps_to_service_unavailable() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{port}");
    let api = client(&base);

    let response = api.get("/gurukul");

    assert_eq!(response.status, 503);
    assert_eq!(response.error_message(), "API service unavailable");
    assert_eq!(api.reachable(), Some(false));

    let alerts = api.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(
        alerts[0].message,
        format!("Failed to connect to API at {base}. Please ensure the backend server is running.")
    );
}
