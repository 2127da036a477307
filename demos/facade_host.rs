//! Minimal host: reads one request per connection, runs the helpers and
//! writes the buffered response back.
//!
//! ```text
//! curl -i http://127.0.0.1:8080/index.php/hello/world?name=ann
//! curl -i http://127.0.0.1:8080/old/path
//! curl -i -d 'login=ann' http://127.0.0.1:8080/login
//! ```

use http_facade::{
    limits::{ReqLimits, RespLimits},
    Halt, HeaderSink, Http, RequestContext, Response,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tracing_subscriber::EnvFilter;

const SCRIPT_PATH: &str = "/index.php";

fn handle(ctx: &RequestContext, resp: &mut Response) -> Result<(), Halt> {
    let segments = Http::uri_segments(ctx);

    match segments.iter().map(String::as_str).collect::<Vec<_>>()[..] {
        ["old", ..] => {
            let target = format!("{}/hello/redirected", Http::base_url(ctx));
            match Http::redirect(resp, &target, 301, None) {
                Some(halt) => Err(halt),
                None => Ok(()),
            }
        }
        ["login"] => {
            let Some(login) = Http::post(ctx, "login") else {
                Http::set_response_status(resp, 400);
                return Err(Http::request_shutdown());
            };

            Http::set_response_status(resp, 200);
            resp.write_body(format!("welcome, {login}\n").as_bytes());
            Ok(())
        }
        ["hello", who] => {
            Http::set_response_status(resp, 200);
            Http::set_request_headers(resp, ["Content-Type: text/plain"]);

            let name = Http::get(ctx, "name").unwrap_or("stranger");
            let kind = match Http::is_ajax_request(ctx) {
                true => "ajax",
                false => "page",
            };
            resp.write_body(
                format!("hello {who}, {name} ({kind}) at {}\n", Http::current_url(ctx)).as_bytes(),
            );
            Ok(())
        }
        _ => {
            Http::set_response_status(resp, 404);
            Err(Http::request_shutdown())
        }
    }
}

async fn serve(mut stream: TcpStream, req_limits: &ReqLimits) -> std::io::Result<()> {
    let mut buffer = vec![0; req_limits.head_size];
    let mut filled = 0;

    let head_end = loop {
        let read = stream.read(&mut buffer[filled..]).await?;
        if read == 0 {
            return Ok(());
        }
        filled += read;

        if let Some(end) = memchr::memmem::find(&buffer[..filled], b"\r\n\r\n") {
            break end + 4;
        }
        if filled == buffer.len() {
            return stream.write_all(b"HTTP/1.1 431 Request Header Fields Too Large\r\ncontent-length: 0\r\n\r\n").await;
        }
    };

    let ctx = match RequestContext::from_head(&buffer[..head_end], req_limits) {
        Ok(ctx) => ctx.with_script_path(SCRIPT_PATH),
        Err(err) => {
            tracing::warn!(error = %err, "rejecting request");
            return stream.write_all(b"HTTP/1.1 400 Bad Request\r\ncontent-length: 0\r\n\r\n").await;
        }
    };

    let body_len = ctx
        .header("content-length")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0)
        .min(buffer.len());
    let mut body = buffer[head_end..filled].to_vec();
    while body.len() < body_len {
        let mut chunk = [0; 1024];
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    let ctx = match ctx.clone().with_form_body(&body, req_limits) {
        Ok(with_form) => with_form,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring form body");
            ctx
        }
    };

    let mut resp = Response::new(&RespLimits::default());
    if handle(&ctx, &mut resp).is_err() {
        tracing::debug!(uri = ctx.request_uri(), "request halted");
    }

    stream.write_all(&resp.to_bytes()).await
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let listener = TcpListener::bind("127.0.0.1:8080").await?;
    tracing::info!("listening on http://127.0.0.1:8080");

    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(err) = serve(stream, &ReqLimits::default()).await {
                tracing::warn!(%peer, error = %err, "connection failed");
            }
        });
    }
}
