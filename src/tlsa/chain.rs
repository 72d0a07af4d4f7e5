// Copyright 2025 WalletNS Contributors
// Licensed under GPL-3.0

//! Certificate path search toward a self-signed root

use super::{Certificate, TrustAnchorStore};
use x509_parser::certificate::X509Certificate;
use x509_parser::x509::X509Name;

/// Whether the certificate's signature verifies with its own key
pub fn is_self_signed(cert: &X509Certificate<'_>) -> bool {
    cert.verify_signature(None).is_ok()
}

/// Search `pool` for an issuer path from `target` to a self-signed root.
/// Revocation is not checked.
pub fn is_root_of(target: &Certificate, pool: &[Certificate]) -> bool {
    search(target, pool, pool.len())
}

fn search(target: &Certificate, pool: &[Certificate], depth: usize) -> bool {
    let parsed_target = match target.parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Chain validation skipped unparsable certificate: {}", e);
            return false;
        }
    };
    if !parsed_target.validity().is_valid() {
        tracing::debug!("{} is outside its validity period", parsed_target.subject());
        return false;
    }

    for candidate in pool {
        let Ok(parsed) = candidate.parse() else {
            continue;
        };
        if !names_match(parsed.subject(), parsed_target.issuer()) {
            continue;
        }
        if parsed_target.verify_signature(Some(parsed.public_key())).is_err() {
            continue;
        }

        if is_self_signed(&parsed) {
            return true;
        }
        if candidate != target && depth > 0 && search(candidate, pool, depth - 1) {
            return true;
        }
    }

    false
}

/// Names match byte for byte, or attribute by attribute once case and
/// whitespace are folded (RFC 5280 section 7.1)
fn names_match(a: &X509Name<'_>, b: &X509Name<'_>) -> bool {
    if a.as_raw() == b.as_raw() {
        return true;
    }

    let mut left = a.iter_attributes();
    let mut right = b.iter_attributes();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if x.attr_type() != y.attr_type() {
                    return false;
                }
                match (x.as_str(), y.as_str()) {
                    (Ok(x), Ok(y)) if fold(x) == fold(y) => {}
                    _ => return false,
                }
            }
            _ => return false,
        }
    }
}

fn fold(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Validate `target` against the trusted roots plus every other certificate
/// presented alongside it
pub async fn is_valid_cert_chain(
    store: &TrustAnchorStore,
    target: &Certificate,
    presented: &[Certificate],
) -> bool {
    let mut pool = store.snapshot().await;
    pool.extend(presented.iter().filter(|cert| *cert != target).cloned());
    is_root_of(target, &pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlsa::test_support;

    #[test]
    fn test_self_signed() {
        let chain = test_support::chain("self");
        assert!(is_self_signed(&chain.root.parse().unwrap()));
        assert!(!is_self_signed(&chain.intermediate.parse().unwrap()));
        assert!(!is_self_signed(&chain.leaf.parse().unwrap()));
    }

    #[test]
    fn test_root_of_full_path() {
        let chain = test_support::chain("path");
        let pool = vec![chain.intermediate.clone(), chain.root.clone()];

        assert!(is_root_of(&chain.leaf, &pool));
        assert!(is_root_of(&chain.intermediate, &pool));
    }

    #[test]
    fn test_missing_root() {
        let chain = test_support::chain("partial");
        assert!(!is_root_of(&chain.leaf, &[chain.intermediate.clone()]));
        assert!(!is_root_of(&chain.leaf, &[]));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let chain = test_support::chain("ours");
        let other = test_support::chain("theirs");

        let pool = vec![other.intermediate.clone(), other.root.clone()];
        assert!(!is_root_of(&chain.leaf, &pool));
    }

    #[test]
    fn test_issuer_name_is_compared_normalized() {
        use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, KeyPair};

        let named = |value: DnValue| {
            let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
            params.distinguished_name = DistinguishedName::new();
            params.distinguished_name.push(DnType::CommonName, value);
            params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
            params
        };

        let root_key = KeyPair::generate().unwrap();
        let root = named(DnValue::PrintableString("Wallet Root".try_into().unwrap()))
            .self_signed(&root_key)
            .unwrap();
        // Same key, issuer name spelled with another case, spacing and string type
        let respelled = named(DnValue::Utf8String("wallet  ROOT ".to_string()))
            .self_signed(&root_key)
            .unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let leaf = CertificateParams::new(vec!["leaf.example".to_string()])
            .unwrap()
            .signed_by(&leaf_key, &respelled, &root_key)
            .unwrap();

        let leaf = Certificate::from(leaf.der().clone());
        let root = Certificate::from(root.der().clone());
        let parsed_leaf = leaf.parse().unwrap();
        let parsed_root = root.parse().unwrap();
        assert_ne!(parsed_leaf.issuer().as_raw(), parsed_root.subject().as_raw());
        assert!(names_match(parsed_root.subject(), parsed_leaf.issuer()));
        assert!(is_root_of(&leaf, &[root]));

        let stranger = test_support::chain("Wallet Root");
        assert!(!names_match(
            stranger.intermediate.parse().unwrap().subject(),
            parsed_leaf.issuer()
        ));
    }

    #[tokio::test]
    async fn test_chain_uses_store_and_presented() {
        let chain = test_support::chain("store");

        let empty = TrustAnchorStore::empty();
        assert!(is_valid_cert_chain(&empty, &chain.leaf, &chain.presented()).await);
        assert!(!is_valid_cert_chain(&empty, &chain.leaf, &chain.presented()[..2]).await);

        let trusted = TrustAnchorStore::from_certificates([chain.root.clone()]);
        assert!(is_valid_cert_chain(&trusted, &chain.leaf, &chain.presented()[..2]).await);
    }
}
