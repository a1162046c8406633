use hmac::{Hmac, Mac};
use sha2::Sha256;

/// The base64-encoded HMAC-SHA256 of `data`, as Shopify sends it in the `X-Shopify-Hmac-Sha256` header.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    // HMAC accepts keys of any length, so this cannot fail
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => unreachable!("HMAC key rejected. {e}"),
    };
    mac.update(data);
    base64::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hmac_matches_shopify() {
        assert_eq!(
            calculate_hmac("key", b"The quick brown fox jumps over the lazy dog"),
            "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg="
        );
        assert_eq!(calculate_hmac("hush", b"{\"id\":450789469}"), "QPF8T1ti8Gpf6xXRoKZDI2G/2Fp8v4tKnau8MqDdx3o=");
        assert_ne!(calculate_hmac("hush", b"{\"id\":450789469}"), calculate_hmac("hush", b"{\"id\":1}"));
    }
}
