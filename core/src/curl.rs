//! Reconstruct a shell `curl` command from a dispatched request.
//!
//! Output order is fixed: `-k` when TLS verification was disabled, `-X`
//! with the method, the quoted URL, one `-H` per header value, then either
//! `-F` entries for a multipart request or a single `--data-raw` payload.
//! Multipart boundaries are stripped from Content-Type so the command stays
//! runnable; curl generates its own.

use std::fmt::Write;

use http::header::CONTENT_TYPE;

use crate::http::Request;

/// Render `request` as a `curl` command line.
///
/// Returns an empty string when an open form file has no name, since the
/// command could not reproduce the upload.
pub fn render(request: &Request) -> String {
    let mut cmd = String::from("curl");
    if request.insecure {
        cmd.push_str(" -k");
    }
    let _ = write!(cmd, " -X {} \"{}\"", request.method, request.resolved_url());

    for (name, value) in &request.headers {
        let mut value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        if *name == CONTENT_TYPE && value.contains("boundary") {
            if let Some(media_type) = value.split(';').next() {
                value = media_type.trim().to_string();
            }
        }
        let _ = write!(cmd, " -H \"{}: {}\"", canonical_name(name.as_str()), value);
    }

    let form = &request.form;
    if !form.is_empty() {
        for (field, path) in &form.paths {
            let _ = write!(cmd, " -F \"{field}=@{path}\"");
        }
        for (field, value) in &form.fields {
            let _ = write!(cmd, " -F \"{field}={value}\"");
        }
        for (field, name) in &form.files {
            let Some(name) = name else {
                return String::new();
            };
            let _ = write!(cmd, " -F \"{field}=@{name}\"");
        }
    } else if let Some(body) = request.body.bytes().filter(|body| !body.is_empty()) {
        let _ = write!(cmd, " --data-raw '{}'", String::from_utf8_lossy(body));
    }

    cmd
}

/// `content-type` becomes `Content-Type`.
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
