//! `SharedKeyLite` authorization for the Table service.
//!
//! String-to-sign is `x-ms-date + "\n" + "/" + account + url.path()`, signed
//! with HMAC-SHA256 under the base64-decoded account key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::StorageError;

type HmacSha256 = Hmac<Sha256>;

/// Storage account name plus decoded account key.
#[derive(Clone)]
pub struct SharedKeyCredential {
    account_name: String,
    key: Vec<u8>,
}

impl SharedKeyCredential {
    /// `account_key` is the base64 key shown in the portal.
    pub fn new(account_name: impl Into<String>, account_key: &str) -> Result<Self, StorageError> {
        let key = STANDARD
            .decode(account_key.trim())
            .map_err(|e| StorageError::Credential(e.to_string()))?;

        Ok(Self {
            account_name: account_name.into(),
            key,
        })
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// `Authorization` header value for a table request to `path` sent with
    /// the given `x-ms-date`.
    pub fn table_authorization(&self, date: &str, path: &str) -> String {
        let string_to_sign = format!("{date}\n/{}{path}", self.account_name);

        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        format!("SharedKeyLite {}:{signature}", self.account_name)
    }
}

impl std::fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account_name", &self.account_name)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Current time in the RFC 1123 form storage expects for `x-ms-date`.
pub fn x_ms_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
