/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// src/sas.rs
// Shared-access-signature token generation.
//
// The hub authenticates a device session with a short-lived token:
// HMAC-SHA256 over "{url-encoded resource uri}\n{unix expiry}" keyed
// with the base64-decoded shared access key. The MQTT password field
// carries the resulting token.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::time::Duration;

use crate::errors::HubLinkError;

type HmacSha256 = Hmac<Sha256>;

// generate_token builds a SAS token for a device, valid for ttl from
// now.
pub fn generate_token(
    hostname: &str,
    device_id: &str,
    shared_access_key: &str,
    ttl: Duration,
) -> Result<String, HubLinkError> {
    let resource_uri = format!("{hostname}/devices/{device_id}");
    let expiry = Utc::now().timestamp() + ttl.as_secs() as i64;
    sign(&resource_uri, shared_access_key, expiry)
}

// sign produces the token for an explicit expiry; split out so tests
// can pin the timestamp.
fn sign(resource_uri: &str, shared_access_key: &str, expiry: i64) -> Result<String, HubLinkError> {
    let encoded_uri = urlencoding::encode(resource_uri).into_owned();
    let to_sign = format!("{encoded_uri}\n{expiry}");

    let key = BASE64
        .decode(shared_access_key)
        .map_err(|e| HubLinkError::sas_signing_error(format!("key is not valid base64: {e}")))?;

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| HubLinkError::sas_signing_error(e.to_string()))?;
    mac.update(to_sign.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={encoded_uri}&sig={}&se={expiry}",
        urlencoding::encode(&signature)
    ))
}

// username builds the MQTT username the hub expects for a device
// session.
pub fn username(hostname: &str, device_id: &str) -> String {
    format!("{hostname}/{device_id}/?api-version=2021-04-12")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_deterministic_for_pinned_expiry() {
        let key = BASE64.encode(b"super secret device key");
        let a = sign("hub.example.net/devices/dev-1", &key, 1_750_000_000).unwrap();
        let b = sign("hub.example.net/devices/dev-1", &key, 1_750_000_000).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("SharedAccessSignature sr=hub.example.net%2Fdevices%2Fdev-1&sig="));
        assert!(a.ends_with("&se=1750000000"));
    }

    #[test]
    fn invalid_base64_key_is_a_credentials_error() {
        let err = sign("hub/devices/dev", "not!!base64??", 1).unwrap_err();
        assert!(err.is_credentials_error());
    }

    #[test]
    fn username_format() {
        assert_eq!(
            username("hub.example.net", "dev-1"),
            "hub.example.net/dev-1/?api-version=2021-04-12"
        );
    }
}
