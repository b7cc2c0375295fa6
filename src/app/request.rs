use anyhow::Context;

use crate::{h1::send::Sender, message::Request, stream::Body};

use super::{
    arg::RequestCommand,
    io::{ProgramInput, ProgramOutput},
};

pub async fn request(args: &RequestCommand) -> anyhow::Result<()> {
    let request = build_request(args).await?;
    let output = ProgramOutput::open(&args.output).await?;

    let mut sender = Sender::new(output);
    sender.send_request(&request).await?;

    Ok(())
}

async fn build_request(args: &RequestCommand) -> anyhow::Result<Request> {
    let mut request = Request::new(&args.method, args.uri.as_str())?;

    if let Some(target) = &args.target {
        request = request.with_request_target(target)?;
    }

    request = request.with_protocol_version(args.protocol);

    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("header '{}' is not in the form 'Name: value'", header))?;

        request = request.with_added_header(name.trim(), value.trim())?;
    }

    for cookie in &args.cookies {
        let (name, value) = cookie
            .split_once('=')
            .with_context(|| format!("cookie '{}' is not in the form 'name=value'", cookie))?;

        request = request.with_cookie(name.trim(), value.trim())?;
    }

    let body = if let Some(data) = &args.data {
        Some(Body::from_bytes(data.as_bytes()))
    } else if let Some(path) = &args.data_file {
        Some(Body::new(ProgramInput::open(path).await?))
    } else {
        None
    };

    if let Some(body) = body {
        if args.chunked {
            request = request.with_header("Transfer-Encoding", "chunked")?;
        } else if let Some(data) = &args.data {
            request = request.with_header("Content-Length", &data.len().to_string())?;
        }

        request = request.with_body(body);
    }

    tracing::debug!(method = request.method(), target = %request.request_target(), "built request");

    Ok(request)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{h1::Http1Encoder, message::ProtocolVersion};

    use super::*;

    fn command(uri: &str) -> RequestCommand {
        RequestCommand {
            uri: uri.to_string(),
            method: "get".to_string(),
            headers: Vec::new(),
            cookies: Vec::new(),
            target: None,
            protocol: ProtocolVersion::Http11,
            data: None,
            data_file: None,
            chunked: false,
            output: PathBuf::from("-"),
        }
    }

    #[tokio::test]
    async fn test_build_request() {
        let mut args = command("http://example.com/a?b=c");
        args.headers = vec!["Accept: text/plain".to_string()];
        args.cookies = vec!["id=7".to_string()];
        args.data = Some("hello".to_string());

        let request = build_request(&args).await.unwrap();
        let head = Http1Encoder::new().encode_request(&request);

        assert_eq!(
            String::from_utf8(head).unwrap(),
            "GET /a?b=c HTTP/1.1\r\n\
            Host: example.com\r\n\
            Accept: text/plain\r\n\
            Cookie: id=7\r\n\
            Content-Length: 5\r\n\
            \r\n"
        );
    }

    #[tokio::test]
    async fn test_build_request_invalid_header() {
        let mut args = command("http://example.com/");
        args.headers = vec!["no separator".to_string()];

        assert!(build_request(&args).await.is_err());
    }
}
