use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const CHECK_MAC_FIELD: &str = "CheckMacValue";

// The gateway canonicalizes with .NET UrlEncode semantics: `-_.!*()` stay
// bare and space becomes `+`.
const ECPAY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b' ');

fn ecpay_urlencode(raw: &str) -> String {
    utf8_percent_encode(raw, ECPAY_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}

/// Signature over a callback or redirect field set. The `CheckMacValue`
/// entry itself is always excluded; `BTreeMap` iteration supplies the
/// ASCII key order the gateway requires.
pub fn check_mac_value(fields: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> String {
    let joined = fields
        .iter()
        .filter(|(k, _)| k.as_str() != CHECK_MAC_FIELD)
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let raw = format!("HashKey={hash_key}&{joined}&HashIV={hash_iv}");
    let encoded = ecpay_urlencode(&raw).to_lowercase();
    hex::encode_upper(Sha256::digest(encoded.as_bytes()))
}

pub fn verify(fields: &BTreeMap<String, String>, hash_key: &str, hash_iv: &str) -> bool {
    let Some(received) = fields.get(CHECK_MAC_FIELD) else {
        return false;
    };
    check_mac_value(fields, hash_key, hash_iv).eq_ignore_ascii_case(received)
}
