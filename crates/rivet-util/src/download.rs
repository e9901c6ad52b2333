//! Synchronous HTTP download with atomic placement.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::UtilError;

/// Download `url` to `dest`.
///
/// The body is streamed into a temporary file in the destination directory and
/// renamed into place only after the download completes, so a failed transfer
/// never leaves a partial file at `dest`. Any existing file at `dest` is
/// replaced.
///
/// # Errors
/// Returns an error if the HTTP request fails (including non-2xx status), the
/// file cannot be written, or a read error occurs during streaming.
pub fn fetch(url: &str, dest: &Path) -> Result<(), UtilError> {
    let agent = ureq::Agent::new_with_config(
        ureq::config::Config::builder()
            .timeout_connect(Some(Duration::from_secs(30)))
            .timeout_global(Some(Duration::from_secs(600)))
            .build(),
    );

    let response = agent.get(url).call().map_err(|e| UtilError::Download {
        url: url.to_owned(),
        message: e.to_string(),
    })?;

    let mut body = response.into_body();
    let mut reader = body.as_reader();

    // Temp file next to the destination so the final rename stays on one filesystem.
    let pid = std::process::id();
    let tmp_name = format!(".tmp-fetch-{pid}");
    let tmp_path = dest
        .parent()
        .map(|p| p.join(&tmp_name))
        .unwrap_or_else(|| PathBuf::from(&tmp_name));

    let mut file = std::fs::File::create(&tmp_path).map_err(|source| UtilError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;

    if let Err(e) = std::io::copy(&mut reader, &mut file) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(UtilError::Download {
            url: url.to_owned(),
            message: e.to_string(),
        });
    }
    drop(file);

    std::fs::rename(&tmp_path, dest).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        UtilError::Io {
            path: dest.display().to_string(),
            source,
        }
    })?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP 200 response on an ephemeral local port and
    /// return a URL pointing at it. The listener accepts a single connection.
    fn serve_once(body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let header = format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://{addr}/pkg.tar.gz")
    }

    #[test]
    fn fetch_writes_served_body_to_dest() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("payload");

        let url = serve_once(b"served body");
        fetch(&url, &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"served body");
        // The temp file was renamed into place, not left beside the destination.
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["payload"]);
    }

    #[test]
    fn fetch_replaces_existing_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("payload");
        std::fs::write(&dest, b"old content").unwrap();

        let url = serve_once(b"new content");
        fetch(&url, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new content");
    }

    #[test]
    fn fetch_errors_on_unreachable_host() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("payload");

        let result = fetch("http://127.0.0.1:1/nonexistent", &dest);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("download"), "error was: {err}");
        // No partial file may be left behind.
        assert!(!dest.exists());
    }

    #[test]
    fn fetch_leaves_no_temp_file_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("payload");

        let _ = fetch("http://127.0.0.1:1/nonexistent", &dest);
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "leftovers: {leftovers:?}");
    }
}
