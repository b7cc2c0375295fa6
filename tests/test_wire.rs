use httpmsg::{
    error::{ParseError, ParseErrorKind},
    h1::{Http1Decoder, Http1Encoder, codec::ChunkedWriter, send::Sender},
    message::{HostSource, Request},
};


#[test]
fn test_encode_minimal_request() {
    let request = Request::new("GET", "http://example.com").unwrap();

    assert_eq!(
        Http1Encoder::new().encode_request(&request),
        b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n"
    );
}

#[test]
fn test_encode_hostless_request() {
    let request = Request::new("GET", "relative/path?a=1").unwrap();

    assert_eq!(request.header("Host"), None);
    assert_eq!(
        Http1Encoder::new().encode_request(&request),
        b"GET /relative/path?a=1 HTTP/1.1\r\n\r\n"
    );
}

#[test]
fn test_encode_generated_request() {
    let request = message_generator::generate_get_request();

    assert_eq!(
        String::from_utf8(Http1Encoder::new().encode_request(&request)).unwrap(),
        "GET /index.html?lang=en HTTP/1.1\r\n\
        Host: example.com\r\n\
        User-Agent: httpmsg-test\r\n\
        Cookie: session=abc123\r\n\
        \r\n"
    );
}

#[tracing_test::traced_test]
#[tokio::test]
async fn test_send_and_decode_request() {
    let request = message_generator::generate_post_request(b"hello world", true);

    let mut sender = Sender::new(Vec::new());
    sender.send_request(&request).await.unwrap();
    let wire = sender.into_inner();

    assert_eq!(
        String::from_utf8(wire.clone()).unwrap(),
        "POST /v1/items HTTP/1.1\r\n\
        Host: api.example.com:8443\r\n\
        Content-Type: text/plain\r\n\
        Transfer-Encoding: chunked\r\n\
        \r\n\
        4\r\nhell\r\n\
        4\r\no wo\r\n\
        3\r\nrld\r\n\
        0\r\n\r\n"
    );

    let decoder = Http1Decoder::new();
    let (decoded, head_len) = decoder.decode_request(&wire).unwrap();

    assert_eq!(decoded.method(), "POST");
    assert_eq!(decoded.request_target(), "/v1/items");
    assert_eq!(decoded.uri().host(), "api.example.com");
    assert_eq!(decoded.uri().port(), Some(8443));
    assert_eq!(decoded.header("Content-Type"), Some("text/plain"));
    assert_eq!(decoded.host_source(), HostSource::Explicit);

    let body = decoder.decode_body(decoded.headers(), &wire[head_len..]).unwrap();

    assert_eq!(body.data, b"hello world");
    assert_eq!(body.trailer, b"\r\n");
}

#[tokio::test]
async fn test_send_and_decode_response() {
    let response = message_generator::generate_response(b"abcdefg");

    let mut sender = Sender::new(Vec::new());
    sender.send_response(&response).await.unwrap();
    let wire = sender.into_inner();

    assert_eq!(
        String::from_utf8(wire.clone()).unwrap(),
        "HTTP/1.1 201 Created\r\n\
        Transfer-Encoding: chunked\r\n\
        Set-Cookie: id=42; Path=/; HttpOnly\r\n\
        \r\n\
        3\r\nabc\r\n\
        3\r\ndef\r\n\
        1\r\ng\r\n\
        0\r\n\r\n"
    );

    let decoder = Http1Decoder::new();
    let (decoded, head_len) = decoder.decode_response(&wire).unwrap();

    assert_eq!(decoded.status(), 201);
    assert_eq!(decoded.reason(), "Created");

    let cookie = decoded.cookie("id").unwrap();
    assert_eq!(cookie.cookie().value(), "42");
    assert_eq!(cookie.path(), Some("/"));
    assert!(cookie.is_http_only());

    let body = decoder.decode_body(decoded.headers(), &wire[head_len..]).unwrap();
    assert_eq!(body.data, b"abcdefg");
}

#[tokio::test]
async fn test_send_content_length_body_verbatim() {
    let request = message_generator::generate_post_request(b"0\r\n\r\n", false);

    let mut sender = Sender::new(Vec::new());
    sender.send_request(&request).await.unwrap();
    let wire = sender.into_inner();

    let (decoded, head_len) = Http1Decoder::new().decode_request(&wire).unwrap();

    assert_eq!(decoded.header("Content-Length"), Some("5"));
    assert_eq!(&wire[head_len..], b"0\r\n\r\n");
}

#[tokio::test]
async fn test_chunked_writer_wire_format() {
    let mut writer = ChunkedWriter::new(Vec::new());

    writer.write(b"hello").await.unwrap();
    writer.write(b"").await.unwrap();
    writer.end().await.unwrap();

    assert_eq!(writer.into_inner(), b"5\r\nhello\r\n0\r\n\r\n");
}

#[test]
fn test_decode_truncated_head() {
    let error = Http1Decoder::new()
        .decode_request(b"GET / HTTP/1.1\r\nHost: example.com\r\n")
        .unwrap_err();

    assert_eq!(
        error.as_parse().map(ParseError::kind),
        Some(ParseErrorKind::IncompleteInput)
    );
}
