// URI assembly for endpoint paths
use url::{Position, Url};

use crate::client::Protocol;
use crate::client::constants::DEFAULT_PORT;
use crate::error::{Error, Result};

/// Build `protocol://[user[:password]@]host[:port]/path`.
///
/// User-info and path segments are percent-encoded here, `%` included, so
/// the transport decodes back exactly the configured text. A password
/// without a username is dropped, and a port of -1 is left out so the
/// transport picks the protocol default.
pub fn build_url(
    protocol: Protocol,
    host: &str,
    port: i32,
    username: Option<&str>,
    password: Option<&str>,
    path: &str,
) -> Result<String> {
    let fail = |reason: String| Error::UriConstruction {
        host: host.to_string(),
        port,
        path: path.to_string(),
        reason,
    };

    let mut url = Url::parse(&format!("{protocol}://localhost")).map_err(|e| fail(e.to_string()))?;

    let host_literal = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    };
    url.set_host(Some(&host_literal))
        .map_err(|e| fail(format!("invalid host: {e}")))?;

    let explicit_port = if port == DEFAULT_PORT {
        None
    } else {
        let port = u16::try_from(port).map_err(|_| fail("port out of range".to_string()))?;
        url.set_port(Some(port))
            .map_err(|()| fail("port not allowed".to_string()))?;
        Some(port)
    };

    if let Some(username) = username.filter(|u| !u.is_empty()) {
        url.set_username(&urlencoding::encode(username))
            .map_err(|()| fail("username not allowed".to_string()))?;
        if let Some(password) = password {
            url.set_password(Some(&urlencoding::encode(password)))
                .map_err(|()| fail("password not allowed".to_string()))?;
        }
    }

    url.set_path(&encode_path(path));

    // `url` omits a port equal to the scheme default (ftp:21); keep it when configured.
    match explicit_port {
        Some(port) if url.port().is_none() => Ok(format!(
            "{}:{port}{}",
            &url[..Position::AfterHost],
            &url[Position::BeforePath..]
        )),
        _ => Ok(url.to_string()),
    }
}

/// Percent-encode each segment of `path`, keeping `/` separators and a
/// leading `/`.
fn encode_path(path: &str) -> String {
    let relative = path.strip_prefix('/').unwrap_or(path);
    let segments: Vec<_> = relative.split('/').map(urlencoding::encode).collect();
    format!("/{}", segments.join("/"))
}

/// Replace the password in `uri` for log output.
pub fn redact_password(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<invalid uri>".to_string(),
    }
}

/// Percent-decode a URI component.
pub fn decode_component(component: &str) -> String {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| component.to_string())
}
