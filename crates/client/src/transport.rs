// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP transport shared by the client handles.
//!
//! Maps connection failures to [`ClientError::Unreachable`] and any 500 to
//! [`ClientError::InternalServerError`] before callers see the response.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Serialize;

use crate::env;
use crate::error::ClientError;
use crate::DEFAULT_PORT;
use errand_wire::ErrorBody;

/// Split `host` or `host:port` into its parts.
pub(crate) fn split_address(address: &str, default_port: u16) -> Result<(String, u16), ClientError> {
    match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| ClientError::Http(format!("invalid port in address {address:?}")))?;
            Ok((host.to_string(), port))
        }
        None => Ok((address.to_string(), default_port)),
    }
}

#[derive(Debug)]
pub(crate) struct Transport {
    client: Client,
    host: String,
    port: u16,
}

impl Transport {
    pub fn new(address: &str) -> Result<Self, ClientError> {
        let (host, port) = split_address(address, DEFAULT_PORT)?;
        let client = Client::builder()
            .timeout(env::http_timeout())
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self { client, host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` for display and chain labelling.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let response = request.send().map_err(|_| ClientError::Unreachable(self.host.clone()))?;
        let status = response.status();
        let body =
            response.bytes().map_err(|_| ClientError::Unreachable(self.host.clone()))?.to_vec();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return Err(ClientError::InternalServerError);
        }
        Ok((status, body))
    }

    pub fn get(&self, path: &str) -> Result<(StatusCode, Vec<u8>), ClientError> {
        self.send(self.client.get(self.url(path)))
    }

    pub fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let bytes = serde_json::to_vec(body).map_err(|e| ClientError::Http(e.to_string()))?;
        self.send(
            self.client.post(self.url(path)).header("content-type", "application/json").body(bytes),
        )
    }

    pub fn put<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let bytes = serde_json::to_vec(body).map_err(|e| ClientError::Http(e.to_string()))?;
        self.send(
            self.client.put(self.url(path)).header("content-type", "application/json").body(bytes),
        )
    }

    pub fn put_empty(&self, path: &str) -> Result<(StatusCode, Vec<u8>), ClientError> {
        self.send(self.client.put(self.url(path)))
    }
}

/// Best-effort extraction of the daemon's `{"error": ...}` message.
pub(crate) fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
