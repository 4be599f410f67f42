//! Shared fixtures for tests against a mocked archive service.

#![allow(dead_code)]

use std::net::TcpListener;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use archivkompakt::{ArchivKompakt, ClientConfig, ClientCredentials};

pub const TOKEN: &str = "test-access-token";
pub const PRESHARED: &str = "cHJlc2hhcmVkOmJhc2ljLWF1dGg=";

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(
        format!("{}/", server.base_url()),
        "jdoe",
        "p@ss word",
        "archive",
        ClientCredentials::preshared(PRESHARED),
    )
    .with_timeout(Duration::from_secs(10))
}

/// Mock a successful token exchange.
pub fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/AAKRest/Token");
        then.status(200)
            .json_body(json!({"access_token": TOKEN, "token_type": "bearer"}));
    })
}

/// Token exchange plus a connected client.
pub fn connect(server: &MockServer) -> ArchivKompakt {
    mock_token(server);
    ArchivKompakt::connect(&config(server)).expect("session should open")
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}
