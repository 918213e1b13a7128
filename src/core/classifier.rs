//! Content classifier
//!
//! A pure function of (text, denylist). No storage, no network, so it
//! is trivially swappable and unit-testable. Missing text classifies
//! as clean: a song is never blocked just because no provider had its
//! lyrics; the explicit flag remains the fallback signal.

/// Built-in denylist categories. Deployment-specific additions come
/// from settings.
const PROFANITY: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "damn", "fucking", "dick", "pussy", "whore",
];

const SEXUAL: &[&str] = &["sex", "naked"];

const VIOLENCE: &[&str] = &["kill", "murder", "gun", "shoot", "stab"];

const SUBSTANCES: &[&str] = &["drugs", "cocaine", "weed", "alcohol", "drunk"];

/// Terms whose presence marks text as unclean, held lowercased
#[derive(Debug, Clone)]
pub struct Denylist {
    terms: Vec<String>,
}

impl Denylist {
    /// Built-in categories plus deployment additions
    pub fn with_extras(extras: &[String]) -> Self {
        let mut terms: Vec<String> = PROFANITY
            .iter()
            .chain(SEXUAL)
            .chain(VIOLENCE)
            .chain(SUBSTANCES)
            .map(|t| t.to_string())
            .collect();

        for extra in extras {
            let term = extra.trim().to_lowercase();
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }

        Self { terms }
    }

    /// Denylist from an explicit term list (tests, custom deployments)
    pub fn from_terms(terms: &[&str]) -> Self {
        Self {
            terms: terms.iter().map(|t| t.trim().to_lowercase()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Classify text against this denylist. Returns true when clean.
    pub fn classify(&self, text: Option<&str>) -> bool {
        let Some(text) = text else {
            return true;
        };

        let lowered = text.to_lowercase();
        !self.terms.iter().any(|term| lowered.contains(term.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_text_is_clean() {
        let denylist = Denylist::with_extras(&[]);
        assert!(denylist.classify(None));
    }

    #[test]
    fn test_clean_text() {
        let denylist = Denylist::with_extras(&[]);
        assert!(denylist.classify(Some("la la la, sunshine and rainbows")));
    }

    #[test]
    fn test_denylist_term_is_unclean() {
        let denylist = Denylist::with_extras(&[]);
        assert!(!denylist.classify(Some("I will kill the lights")));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let denylist = Denylist::with_extras(&[]);
        assert!(!denylist.classify(Some("KILL the noise")));
        assert!(!denylist.classify(Some("CoCaInE dreams")));
    }

    #[test]
    fn test_substring_containment() {
        let denylist = Denylist::with_extras(&[]);
        // "killing" contains "kill"
        assert!(!denylist.classify(Some("killing me softly")));
    }

    #[test]
    fn test_extras_extend_builtin_categories() {
        let denylist = Denylist::with_extras(&["heck".to_string()]);
        assert!(!denylist.classify(Some("what the heck")));

        let plain = Denylist::with_extras(&[]);
        assert!(plain.classify(Some("what the heck")));
    }

    #[test]
    fn test_extras_are_deduplicated_and_trimmed() {
        let denylist = Denylist::with_extras(&[" Kill ".to_string(), "".to_string()]);
        let baseline = Denylist::with_extras(&[]);
        assert_eq!(denylist.len(), baseline.len());
    }
}
