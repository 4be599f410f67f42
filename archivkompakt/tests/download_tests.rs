//! Download-and-verify pipeline against a mocked archive service.

mod common;

use std::fs;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use httpmock::prelude::*;
use tempfile::TempDir;

use archivkompakt::{ArchivError, CancellationToken, DescriptorError, DownloadDescriptor};
use common::{bearer, can_bind_localhost, connect, TOKEN};

const CONTENT: &[u8] = b"hello world";
const CONTENT_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

fn descriptor(checksum: &str) -> String {
    DownloadDescriptor::new("AK-4711", "application/pdf", checksum).encode()
}

fn mock_file<'a>(
    server: &'a MockServer,
    descriptor: &str,
    status: u16,
    body: &[u8],
) -> httpmock::Mock<'a> {
    let path = format!("/AAKRest/v1/files/{}", descriptor);
    let body = body.to_vec();
    server.mock(move |when, then| {
        when.method(GET)
            .path(path)
            .header("authorization", bearer())
            .header("access_token", TOKEN);
        then.status(status)
            .header("content-type", "application/octet-stream")
            .body(body);
    })
}

#[test]
fn download_writes_file_when_checksum_matches() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    let descriptor = descriptor(CONTENT_MD5);
    let file = mock_file(&server, &descriptor, 200, CONTENT);

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("nested/lease.pdf");
    let report = archiv.download_file(&descriptor, &dest).unwrap();

    file.assert();
    assert_eq!(fs::read(&dest).unwrap(), CONTENT);
    assert_eq!(report.bytes, CONTENT.len() as u64);
    assert_eq!(report.checksum, CONTENT_MD5);
    assert_eq!(report.archive_item_id, "AK-4711");
    assert_eq!(report.content_type, "application/pdf");
    assert_eq!(report.path, dest);
}

#[test]
fn download_accepts_uppercase_checksum() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    // Build the wire form by hand so the checksum line stays upper case.
    let raw = format!("\nAK-4711\napplication/pdf\n\n\n{}", CONTENT_MD5.to_uppercase());
    let descriptor = STANDARD.encode(raw);
    mock_file(&server, &descriptor, 200, CONTENT);

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("lease.pdf");

    assert!(archiv.download_file(&descriptor, &dest).is_ok());
}

#[test]
fn download_overwrites_existing_file() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    let descriptor = descriptor(CONTENT_MD5);
    mock_file(&server, &descriptor, 200, CONTENT);

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("lease.pdf");
    fs::write(&dest, b"stale bytes from an earlier run").unwrap();

    archiv.download_file(&descriptor, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), CONTENT);
}

#[test]
fn checksum_mismatch_fails_and_keeps_file() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    let descriptor = descriptor("def456");
    mock_file(&server, &descriptor, 200, CONTENT);

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("lease.pdf");
    let err = archiv.download_file(&descriptor, &dest).unwrap_err();

    match &err {
        ArchivError::ChecksumMismatch {
            path,
            expected,
            actual,
        } => {
            assert_eq!(path, &dest);
            assert_eq!(expected, "def456");
            assert_eq!(actual, CONTENT_MD5);
        }
        other => panic!("Expected ChecksumMismatch, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("def456"));
    assert!(message.contains(CONTENT_MD5));
    assert_eq!(fs::read(&dest).unwrap(), CONTENT);
}

#[test]
fn rejected_download_writes_nothing() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    let descriptor = descriptor(CONTENT_MD5);
    mock_file(&server, &descriptor, 403, b"forbidden");

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("lease.pdf");
    let result = archiv.download_file(&descriptor, &dest);

    assert!(matches!(result, Err(ArchivError::Api { status: 403, .. })));
    assert!(!dest.exists());
}

#[test]
fn unusable_descriptor_fails_before_any_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    let any_file = server.mock(|when, then| {
        when.method(GET).path_contains("/v1/files/");
        then.status(200).body(CONTENT);
    });

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("lease.pdf");

    let non_utf8 = STANDARD.encode(b"\n\xff\xfe\napplication/pdf\n\n\nabc");
    let short = STANDARD.encode("\nAK-4711\napplication/pdf");

    assert!(matches!(
        archiv.download_file(&non_utf8, &dest),
        Err(ArchivError::Descriptor(DescriptorError::Unusable))
    ));
    assert!(matches!(
        archiv.download_file(&short, &dest),
        Err(ArchivError::Descriptor(DescriptorError::MissingLine { .. }))
    ));
    assert!(matches!(
        archiv.download_file("%%%", &dest),
        Err(ArchivError::Descriptor(DescriptorError::Base64(_)))
    ));

    any_file.assert_hits(0);
    assert!(!dest.exists());
}

#[test]
fn cancelled_download_does_not_start() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);
    let descriptor = descriptor(CONTENT_MD5);
    let file = mock_file(&server, &descriptor, 200, CONTENT);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("lease.pdf");
    let result = archiv.download_file_with_cancel(&descriptor, &dest, &cancel);

    assert!(matches!(result, Err(ArchivError::Cancelled)));
    file.assert_hits(0);
    assert!(!dest.exists());
}

#[test]
fn file_url_inserts_separator() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);

    assert_eq!(
        archiv.file_url("QUJD"),
        format!("{}/AAKRest/v1/files/QUJD", server.base_url())
    );
}

#[test]
fn file_url_keeps_slashes_in_descriptor() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let archiv = connect(&server);

    assert_eq!(
        archiv.file_url("ab/cd+e="),
        format!("{}/AAKRest/v1/files/ab/cd+e=", server.base_url())
    );
}
