extern crate restful;
extern crate tiny_http;
use self::tiny_http::{Header, Method, Response, Server, StatusCode};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;

static INIT: Once = Once::new();

/// Number of requests the mock has received on `/counted`.
pub static COUNTED_HITS: AtomicUsize = AtomicUsize::new(0);

pub const POST_1: &str = r#"{"userId":1,"id":1,"title":"sunt aut facere","body":"quia et suscipit"}"#;

const NUMBERS: &str = r#"{"small":1.5e-7,"tiny":0.00001,"zero":-0,"big":12345678901234567890123}"#;

fn json_header() -> Header {
    Header::from_str("Content-Type: application/json; charset=utf-8").unwrap()
}

/// Starts a small stand-in for the JSONPlaceholder API on
/// localhost:35563, once per test binary.
pub fn setup() {
    INIT.call_once(|| {
        let server = Arc::new(Server::http("localhost:35563").unwrap());
        for _ in 0..4 {
            let server = server.clone();

            thread::spawn(move || loop {
                let mut request = {
                    if let Ok(request) = server.recv() {
                        request
                    } else {
                        continue; // If .recv() fails, just try again.
                    }
                };
                let mut content = String::new();
                request.as_reader().read_to_string(&mut content).ok();
                let content_type = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Content-Type"))
                    .map(|header| header.value.as_str().to_string());

                let url = String::from(request.url());
                match request.method() {
                    Method::Get if url == "/posts/1" => {
                        let response = Response::from_string(POST_1).with_header(json_header());
                        request.respond(response).ok();
                    }

                    Method::Post if url == "/posts" => {
                        if content_type.as_deref() != Some("application/json") {
                            let response = Response::from_string("{}").with_status_code(415);
                            request.respond(response).ok();
                            continue;
                        }
                        let created = serde_json::from_str::<serde_json::Value>(&content);
                        let mut created = match created {
                            Ok(created) => created,
                            Err(_) => {
                                let response = Response::from_string("{}").with_status_code(400);
                                request.respond(response).ok();
                                continue;
                            }
                        };
                        created["id"] = serde_json::json!(101);
                        let response = Response::from_string(created.to_string())
                            .with_status_code(201)
                            .with_header(json_header());
                        request.respond(response).ok();
                    }

                    Method::Post if url == "/echo" => {
                        request.respond(Response::from_string(content)).ok();
                    }

                    Method::Get if url == "/content_type" => {
                        let body = content_type.unwrap_or_else(|| "none".to_string());
                        request.respond(Response::from_string(body)).ok();
                    }

                    Method::Get if url == "/unicode" => {
                        let response = Response::from_string(r#"{"name":"café","emoji":"😀"}"#)
                            .with_header(json_header());
                        request.respond(response).ok();
                    }

                    Method::Get if url == "/numbers" => {
                        let response = Response::from_string(NUMBERS).with_header(json_header());
                        request.respond(response).ok();
                    }

                    Method::Get if url == "/chunked" => {
                        // No length given, so tiny_http uses chunked encoding.
                        let body = Cursor::new(POST_1.as_bytes().to_vec());
                        let headers = vec![json_header()];
                        let response = Response::new(StatusCode(200), headers, body, None, None);
                        request.respond(response).ok();
                    }

                    Method::Get if url == "/plain" => {
                        request.respond(Response::from_string("not json")).ok();
                    }

                    Method::Get if url == "/counted" => {
                        COUNTED_HITS.fetch_add(1, Ordering::SeqCst);
                        request.respond(Response::from_string(POST_1)).ok();
                    }

                    Method::Get if url == "/redirect" => {
                        let location = Header::from_bytes(
                            &b"Location"[..],
                            &b"http://localhost:35563/posts/1"[..],
                        )
                        .unwrap();
                        let response = Response::from_string("")
                            .with_status_code(301)
                            .with_header(location);
                        request.respond(response).ok();
                    }

                    Method::Get if url == "/server_error" => {
                        let response = Response::from_string("{}").with_status_code(500);
                        request.respond(response).ok();
                    }

                    _ => {
                        request
                            .respond(Response::from_string("{}").with_status_code(404))
                            .ok();
                    }
                }
            });
        }
    });
}

pub fn url(req: &str) -> String {
    format!("http://localhost:35563{}", req)
}

pub fn base_url() -> String {
    url("")
}

/// A path in the temp directory, unique to this test process, with
/// any leftover file removed.
pub fn temp_path(name: &str) -> String {
    let path = std::env::temp_dir().join(format!("restful-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_file(&path);
    path.to_string_lossy().into_owned()
}

pub fn get_body(request: Result<restful::Response, restful::Error>) -> String {
    match request {
        Ok(response) => match response.as_str() {
            Ok(str) => String::from(str),
            Err(err) => {
                println!("\n[ERROR]: {}\n", err);
                String::new()
            }
        },
        Err(err) => {
            println!("\n[ERROR]: {}\n", err);
            String::new()
        }
    }
}

pub fn get_status_code(request: Result<restful::Response, restful::Error>) -> i32 {
    match request {
        Ok(response) => response.status_code,
        Err(err) => {
            println!("\n[ERROR]: {}\n", err);
            -1
        }
    }
}
