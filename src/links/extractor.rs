//! Scanner for inline `[display](target)` references in generated answers.
//!
//! The grammar is deliberately narrow: `display` is one or more characters
//! other than `]`, `target` is one or more characters other than `)`, and the
//! two halves must be adjacent. Matching is leftmost and non-overlapping; a
//! failed candidate is abandoned and scanning resumes one byte later, so
//! malformed or nested sequences are never partially repaired.

use std::ops::Range;

const EXTERNAL_SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Already an absolute URI; passed through untouched.
    External,
    /// Bare product identifier that must be verified before linking.
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReference {
    pub display: String,
    pub target: String,
    /// Byte range of the whole `[display](target)` match in the source text.
    pub span: Range<usize>,
    pub kind: ReferenceKind,
}

impl CandidateReference {
    pub fn is_identifier(&self) -> bool {
        self.kind == ReferenceKind::Identifier
    }
}

pub fn extract_references(text: &str) -> Vec<CandidateReference> {
    let mut references = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('[') {
        let start = pos + offset;
        match match_reference_at(text, start) {
            Some(reference) => {
                pos = reference.span.end;
                references.push(reference);
            }
            None => pos = start + 1,
        }
    }

    references
}

/// Bare identifier targets in order of appearance (may repeat).
pub fn identifier_targets(references: &[CandidateReference]) -> impl Iterator<Item = &str> {
    references
        .iter()
        .filter(|r| r.is_identifier())
        .map(|r| r.target.as_str())
}

fn match_reference_at(text: &str, start: usize) -> Option<CandidateReference> {
    // All delimiters are ASCII, so byte offsets always land on char boundaries.
    let display_start = start + 1;
    let display_end = display_start + text[display_start..].find(']')?;
    if display_end == display_start {
        return None;
    }

    if text.as_bytes().get(display_end + 1) != Some(&b'(') {
        return None;
    }

    let target_start = display_end + 2;
    let target_end = target_start + text[target_start..].find(')')?;
    if target_end == target_start {
        return None;
    }

    let target = &text[target_start..target_end];
    Some(CandidateReference {
        display: text[display_start..display_end].to_string(),
        target: target.to_string(),
        span: start..target_end + 1,
        kind: classify_target(target),
    })
}

fn classify_target(target: &str) -> ReferenceKind {
    let is_external = EXTERNAL_SCHEMES.iter().any(|scheme| {
        target
            .get(..scheme.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .unwrap_or(false)
    });

    if is_external {
        ReferenceKind::External
    } else {
        ReferenceKind::Identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_identifier_reference_with_span() {
        let text = "See [Saw Blade X](ABC123) for details";
        let refs = extract_references(text);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].display, "Saw Blade X");
        assert_eq!(refs[0].target, "ABC123");
        assert_eq!(refs[0].kind, ReferenceKind::Identifier);
        assert_eq!(&text[refs[0].span.clone()], "[Saw Blade X](ABC123)");
    }

    #[test]
    fn classifies_absolute_urls_as_external() {
        let refs = extract_references(
            "[a](https://example.com/x) [b](HTTP://EXAMPLE.COM) [c](mailto:sales@example.com) [d](M110206-84504-01-00)",
        );

        let kinds: Vec<_> = refs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ReferenceKind::External,
                ReferenceKind::External,
                ReferenceKind::External,
                ReferenceKind::Identifier,
            ]
        );
        assert_eq!(
            identifier_targets(&refs).collect::<Vec<_>>(),
            vec!["M110206-84504-01-00"]
        );
    }

    #[test]
    fn preserves_order_of_multiple_references() {
        let text = "1. [Caliper 150mm](M1-150) - precise\n2. [Caliper 200mm](M1-200) - longer";
        let targets: Vec<_> = extract_references(text)
            .into_iter()
            .map(|r| r.target)
            .collect();
        assert_eq!(targets, vec!["M1-150", "M1-200"]);
    }

    #[test]
    fn ignores_malformed_sequences() {
        assert!(extract_references("[]()").is_empty());
        assert!(extract_references("[empty target]()").is_empty());
        assert!(extract_references("[no paren] (X1)").is_empty());
        assert!(extract_references("[unterminated](X1").is_empty());
        assert!(extract_references("[[nested]](X1)").is_empty());
        assert!(extract_references("plain text (X1) ]").is_empty());
    }

    #[test]
    fn opening_brackets_inside_display_are_kept() {
        let text = "a [b [Drill](D-8)";
        let refs = extract_references(text);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].display, "b [Drill");
        assert_eq!(refs[0].target, "D-8");
    }

    #[test]
    fn restarts_after_a_failed_candidate() {
        let text = "[x] then [Drill](D-8)";
        let refs = extract_references(text);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].display, "Drill");
        assert_eq!(refs[0].span.start, 9);
    }

    #[test]
    fn handles_multibyte_text_around_references() {
        let text = "Ø 254 mm – [Savklinge æøå](W38-1) ✓";
        let refs = extract_references(text);

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].display, "Savklinge æøå");
        assert_eq!(&text[refs[0].span.clone()], "[Savklinge æøå](W38-1)");
    }
}
