//! Record name composition.
//!
//! Every user owns the zone `<username>.<base-domain>.`. A record's name is built from a label
//! the user picks (or [`APEX`] for the zone apex), converted to ASCII with IDNA and lower-cased.
//! The zone store is case-insensitive on names but doesn't promise to return a consistent case,
//! so any comparison of names elsewhere should go through [`names_equal`].

use crate::error::ValidationError;
use crate::validate;
use trust_dns_proto::rr::domain::Name;

/// The label users pick to address the zone apex.
pub const APEX: &str = "@";

/// Composes fully-qualified record names under a fixed base domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    base_domain: Name,
}

impl Normalizer {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidName`] if `base_domain` isn't a valid domain name.
    pub fn new(base_domain: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidName {
            name: base_domain.to_string(),
            reason,
        };
        let mut name = validate::domain_name(base_domain.trim()).map_err(invalid)?;
        if name.is_root() {
            return Err(invalid("the base domain can't be the root".to_string()));
        }
        name.set_fqdn(true);
        Ok(Normalizer {
            base_domain: name.to_lowercase(),
        })
    }

    /// The dot-terminated base domain, e.g. `messwithdns.example.`.
    pub fn base_domain(&self) -> String {
        self.base_domain.to_ascii()
    }

    fn zone(&self, username: &str) -> Result<Name, ValidationError> {
        let label = validate::username(username)?;
        Name::from_labels([label])
            .and_then(|name| name.append_domain(&self.base_domain))
            .and_then(|zone| {
                validate::name_length(&zone)?;
                Ok(zone)
            })
            .map_err(|err| ValidationError::InvalidName {
                name: format!("{}.{}", username.trim(), self.base_domain()),
                reason: err.to_string(),
            })
    }

    /// The zone owned by `username`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUsername`] unless the username is a single label.
    pub fn zone_name(&self, username: &str) -> Result<String, ValidationError> {
        Ok(self.zone(username)?.to_ascii())
    }

    /// The fully-qualified, lower-cased ASCII name for `label` in `username`'s zone.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NameContainsSpace`] naming the full name as typed.
    /// - [`ValidationError::Punycode`] when a label can't be represented in ASCII as typed.
    /// - [`ValidationError::InvalidName`] when the result isn't a legal domain name.
    pub fn record_name(&self, label: &str, username: &str) -> Result<String, ValidationError> {
        let zone = self.zone(username)?;
        let label = label.trim();
        if label == APEX {
            return Ok(zone.to_ascii());
        }
        if label.contains(' ') {
            return Err(ValidationError::NameContainsSpace(format!(
                "{label}.{}",
                zone.to_ascii()
            )));
        }

        let ascii = label
            .split('.')
            .map(to_ascii_label)
            .collect::<Result<Vec<_>, _>>()?
            .join(".");
        let invalid = |reason: String| ValidationError::InvalidName {
            name: format!("{ascii}.{}", zone.to_ascii()),
            reason,
        };
        let local = Name::from_ascii(&ascii).map_err(|err| invalid(err.to_string()))?;
        // A trailing dot or nothing at all leaves an empty label in front of the zone.
        if local.is_fqdn() || local.iter().next().is_none() {
            return Err(invalid("name contains an empty label".to_string()));
        }
        let name = local
            .append_domain(&zone)
            .map_err(|err| invalid(err.to_string()))?;
        validate::name_length(&name).map_err(invalid)?;
        Ok(name.to_lowercase().to_ascii())
    }

    /// The label a user would type to address `name` inside `zone`: [`APEX`] for the zone
    /// itself, otherwise the part of `name` in front of the zone. Names outside the zone are
    /// returned unchanged.
    pub fn subdomain(name: &str, zone: &str) -> String {
        let (Ok(parsed), Ok(zone)) = (Name::from_ascii(name), Name::from_ascii(zone)) else {
            return name.to_string();
        };
        if !zone.zone_of(&parsed) {
            return name.to_string();
        }
        let depth = parsed.iter().count() - zone.iter().count();
        if depth == 0 {
            return APEX.to_string();
        }
        match Name::from_labels(parsed.iter().take(depth)) {
            Ok(mut local) => {
                local.set_fqdn(false);
                local.to_ascii()
            }
            Err(_) => name.to_string(),
        }
    }
}

/// IDNA-encode one label. The label must survive the trip back unchanged apart from case:
/// mappings that drop or substitute characters are refused rather than stored.
fn to_ascii_label(label: &str) -> Result<String, ValidationError> {
    if label.is_ascii() {
        return Ok(label.to_string());
    }
    let refuse = |reason: String| ValidationError::Punycode {
        label: label.to_string(),
        reason,
    };
    let ascii = idna::Config::default()
        .use_std3_ascii_rules(true)
        .transitional_processing(false)
        .verify_dns_length(true)
        .to_ascii(label)
        .map_err(|err| refuse(format!("{err:?}")))?;
    let (unicode, decoded) = idna::Config::default().to_unicode(&ascii);
    if decoded.is_err() || unicode != label.to_lowercase() {
        return Err(refuse(format!(
            "it would be stored as \"{ascii}\", which reads back as \"{unicode}\""
        )));
    }
    Ok(ascii)
}

/// Case-insensitive domain name comparison. A trailing dot doesn't make a difference.
pub fn names_equal(a: &str, b: &str) -> bool {
    match (Name::from_ascii(a), Name::from_ascii(b)) {
        (Ok(left), Ok(right)) => left == right,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new("messwithdns.example").unwrap()
    }

    #[test]
    fn base_domain_is_dot_terminated_and_lowered() {
        assert_eq!(normalizer().base_domain(), "messwithdns.example.");
        assert_eq!(
            Normalizer::new("MessWithDNS.Example.").unwrap().base_domain(),
            "messwithdns.example."
        );
        assert!(Normalizer::new("bad base").is_err());
        assert!(Normalizer::new(".").is_err());
    }

    #[test]
    fn apex_and_sub_labels() {
        let n = normalizer();
        assert_eq!(n.record_name("@", "test").unwrap(), "test.messwithdns.example.");
        assert_eq!(
            n.record_name("blob", "test").unwrap(),
            "blob.test.messwithdns.example."
        );
        assert_eq!(
            n.record_name("a.b", "test").unwrap(),
            "a.b.test.messwithdns.example."
        );
    }

    #[test]
    fn labels_are_trimmed_and_lowered() {
        let n = normalizer();
        assert_eq!(
            n.record_name("orange ", "test").unwrap(),
            "orange.test.messwithdns.example."
        );
        assert_eq!(
            n.record_name("BANANA", "test").unwrap(),
            "banana.test.messwithdns.example."
        );
        assert_eq!(
            n.record_name("_test", "test").unwrap(),
            "_test.test.messwithdns.example."
        );
    }

    #[test]
    fn unicode_labels_become_punycode() {
        let n = normalizer();
        let name = n.record_name("❤", "test").unwrap();
        assert!(name.starts_with("xn--qei."), "{name}");
        assert_eq!(
            n.record_name("Straße", "test").unwrap(),
            "xn--strae-oqa.test.messwithdns.example."
        );
    }

    #[test]
    fn unicode_is_never_silently_rewritten() {
        let n = normalizer();
        for label in ["Ⅻ", "ab\u{E000}"] {
            assert!(
                matches!(
                    n.record_name(label, "test"),
                    Err(ValidationError::Punycode { label: ref l, .. }) if l == label
                ),
                "{label}"
            );
        }
        let err = n.record_name("Ⅻ", "test").unwrap_err();
        assert!(err.to_string().contains("\"xii\""), "{err}");

        assert_ne!(
            n.record_name("a\u{200D}b", "test").ok().as_deref(),
            Some("ab.test.messwithdns.example.")
        );
    }

    #[test]
    fn spaces_are_reported_with_full_name() {
        let err = normalizer().record_name("new site", "alice").unwrap_err();
        assert_eq!(
            err.to_string(),
            "name \"new site.alice.messwithdns.example.\" contains a space"
        );
    }

    #[test]
    fn invalid_names_are_rejected() {
        let n = normalizer();
        assert!(matches!(
            n.record_name("x..y", "test"),
            Err(ValidationError::InvalidName { .. })
        ));
        assert!(matches!(
            n.record_name("a/b", "test"),
            Err(ValidationError::InvalidName { .. })
        ));
        assert!(matches!(
            n.record_name("www.", "test"),
            Err(ValidationError::InvalidName { .. })
        ));
        assert!(matches!(
            n.record_name("", "test"),
            Err(ValidationError::InvalidName { .. })
        ));
        assert!(matches!(
            n.record_name("@", "not.valid"),
            Err(ValidationError::InvalidUsername(_))
        ));
    }

    #[test]
    fn subdomain_extraction() {
        let zone = "test.messwithdns.example.";
        assert_eq!(Normalizer::subdomain("test.messwithdns.example.", zone), "@");
        assert_eq!(Normalizer::subdomain("TEST.messwithdns.example.", zone), "@");
        assert_eq!(
            Normalizer::subdomain("a.b.test.messwithdns.example.", zone),
            "a.b"
        );
        assert_eq!(
            Normalizer::subdomain("elsewhere.example.", zone),
            "elsewhere.example."
        );
        assert_eq!(
            Normalizer::subdomain("xtest.messwithdns.example.", zone),
            "xtest.messwithdns.example."
        );
    }

    #[test]
    fn names_compare_without_case() {
        assert!(names_equal("WWW.Example.", "www.example."));
        assert!(names_equal("www.example", "www.example."));
        assert!(!names_equal("www.example.", "ww.example."));
    }
}
