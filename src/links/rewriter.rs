use super::extractor::{CandidateReference, ReferenceKind};
use super::site::ProductSite;

/// Rewrites `text` in one left-to-right pass over `references`.
///
/// Identifiers accepted by `is_linkable` become `[display](product_url)`,
/// every other identifier link is reduced to its display text, and external
/// links are copied unchanged. Bytes outside reference spans are copied
/// verbatim. `references` must come from `extract_references(text)`.
///
/// A display text may itself contain `[`: in `[[A](A1)](B2)` the match is
/// `[[A](A1)` and demoting it leaves `[A](B2)`, which a second pass would
/// read as a new reference.
pub fn rewrite_references<F>(
    text: &str,
    references: &[CandidateReference],
    is_linkable: F,
    site: &ProductSite,
) -> String
where
    F: Fn(&str) -> bool,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for reference in references {
        let span = reference.span.clone();
        if span.start < cursor || span.end > text.len() {
            continue;
        }

        out.push_str(&text[cursor..span.start]);
        match reference.kind {
            ReferenceKind::External => out.push_str(&text[span.clone()]),
            ReferenceKind::Identifier if is_linkable(&reference.target) => {
                out.push('[');
                out.push_str(&reference.display);
                out.push_str("](");
                out.push_str(&site.product_url(&reference.target));
                out.push(')');
            }
            ReferenceKind::Identifier => out.push_str(&reference.display),
        }
        cursor = span.end;
    }

    out.push_str(&text[cursor..]);
    out
}
