const INTERROGATIVE_PREFIXES: [&str; 5] = ["what is ", "who is ", "what are ", "who are ", "where is "];

pub struct AnswerMatcher;

impl AnswerMatcher {
    /// Reduce an answer to its comparable form.
    ///
    /// Lower-cases, drops a leading "what is" style phrase, removes `?` and
    /// parentheses, and trims. Applied until stable so that normalizing an
    /// already-normalized answer never changes it.
    pub fn normalize(text: &str) -> String {
        let mut current = Self::normalize_once(text);
        loop {
            let next = Self::normalize_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn normalize_once(text: &str) -> String {
        let mut normalized = text.to_lowercase();

        // Each phrase is only stripped at the very start, checked in order
        for prefix in INTERROGATIVE_PREFIXES {
            if let Some(rest) = normalized.strip_prefix(prefix) {
                normalized = rest.to_string();
            } else if Self::is_bare_phrase(&normalized, prefix) {
                normalized.clear();
            }
        }

        normalized
            .chars()
            .filter(|c| !matches!(c, '?' | '(' | ')'))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// "What is", "who are?" and the like with nothing after the phrase.
    fn is_bare_phrase(text: &str, prefix: &str) -> bool {
        text.strip_prefix(prefix.trim_end()).is_some_and(|rest| {
            rest.chars()
                .all(|c| c.is_whitespace() || matches!(c, '?' | '(' | ')'))
        })
    }

    /// Check whether a submitted answer matches the canonical one.
    ///
    /// Equal normalized forms match, and so does either form containing the
    /// other ("lynchburg" vs "the city of lynchburg"). There is no typo
    /// tolerance. Blank submissions never match.
    pub fn matches(submitted: &str, canonical: &str) -> bool {
        let submitted = Self::normalize(submitted);
        let canonical = Self::normalize(canonical);

        if submitted.is_empty() || canonical.is_empty() {
            return false;
        }

        submitted == canonical || canonical.contains(&submitted) || submitted.contains(&canonical)
    }

    /// True when the answer carries no content once normalized.
    pub fn is_blank(submitted: &str) -> bool {
        Self::normalize(submitted).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_interrogative_prefix() {
        assert_eq!(AnswerMatcher::normalize("What is Lynchburg?"), "lynchburg");
        assert_eq!(AnswerMatcher::normalize("WHO ARE the Beatles?"), "the beatles");
        assert_eq!(AnswerMatcher::normalize("where is Ann Arbor"), "ann arbor");
        assert_eq!(AnswerMatcher::normalize("  Who is (Prince)?  "), "prince");
    }

    #[test]
    fn test_normalize_only_strips_at_start() {
        assert_eq!(
            AnswerMatcher::normalize("I know what is right"),
            "i know what is right"
        );
        // No trailing space, so "what island" keeps its word boundary
        assert_eq!(AnswerMatcher::normalize("What island?"), "what island");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "What is Lynchburg?",
            "where is what is Dublin",
            " (what is IBM)",
            "what is what is what is x",
            "Quad Cities",
            "",
            "   ?  ",
        ];

        for input in inputs {
            let once = AnswerMatcher::normalize(input);
            let twice = AnswerMatcher::normalize(&once);
            assert_eq!(once, twice, "normalize not stable for {:?}", input);
        }
    }

    #[test]
    fn test_matches_exact_and_prefixed() {
        assert!(AnswerMatcher::matches("Lynchburg", "What is Lynchburg?"));
        assert!(AnswerMatcher::matches("what is lynchburg", "What is Lynchburg?"));
        assert!(AnswerMatcher::matches("IBM", "What is IBM?"));
        assert!(!AnswerMatcher::matches("Dublin", "What is Ann Arbor?"));
    }

    #[test]
    fn test_matches_containment_both_directions() {
        assert!(AnswerMatcher::matches("the city of Lynchburg", "What is Lynchburg?"));
        assert!(AnswerMatcher::matches("Quad", "What is Quad Cities?"));
    }

    #[test]
    fn test_matches_has_no_typo_tolerance() {
        assert!(!AnswerMatcher::matches("Lynchberg", "What is Lynchburg?"));
        assert!(!AnswerMatcher::matches("Chobanni", "What is Chobani?"));
    }

    #[test]
    fn test_blank_answers_never_match() {
        assert!(!AnswerMatcher::matches("", "What is Lynchburg?"));
        assert!(!AnswerMatcher::matches("    ", "What is Lynchburg?"));
        assert!(!AnswerMatcher::matches("What is ?", "What is Lynchburg?"));
        assert!(!AnswerMatcher::matches("()", "What is Lynchburg?"));
        assert!(AnswerMatcher::is_blank(" ? "));
        assert!(AnswerMatcher::is_blank("What is"));
        assert!(AnswerMatcher::is_blank("What is?"));
        assert!(AnswerMatcher::is_blank("  who are ( ) "));
        assert!(!AnswerMatcher::matches("What is", "What is Lynchburg?"));
        assert!(!AnswerMatcher::is_blank("What island?"));
        assert!(!AnswerMatcher::is_blank("Rivian"));
    }

    #[test]
    fn test_empty_canonical_never_matches() {
        assert!(!AnswerMatcher::matches("anything", ""));
        assert!(!AnswerMatcher::matches("anything", "What is ?"));
    }
}
