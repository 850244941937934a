//! Content fingerprinting for offer deduplication.

use sha2::{Digest, Sha256};

/// Stable content hash identifying a logically unique offer.
///
/// Case-insensitive on the company name, byte-sensitive on the verbatim
/// offer text: any drift in the captured text yields a new fingerprint
/// rather than silently merging possibly-different offers.
pub fn perk_fingerprint(company_name: &str, offer_text: &str) -> String {
    let key = format!("{}|{}", company_name.to_lowercase(), offer_text);
    hex::encode(Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(
            perk_fingerprint("Amex", "Get 20% back"),
            perk_fingerprint("Amex", "Get 20% back")
        );
    }

    #[test]
    fn company_name_is_case_insensitive() {
        assert_eq!(
            perk_fingerprint("amex", "Get 20% back"),
            perk_fingerprint("Amex", "Get 20% back")
        );
    }

    #[test]
    fn offer_text_is_byte_sensitive() {
        assert_ne!(
            perk_fingerprint("Amex", "Get 20% back"),
            perk_fingerprint("Amex", "Get 20% back!")
        );
        assert_ne!(
            perk_fingerprint("Amex", "Get 20% back"),
            perk_fingerprint("Amex", "get 20% back")
        );
    }
}
