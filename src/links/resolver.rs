use std::collections::HashSet;

use super::extractor::{extract_references, identifier_targets, CandidateReference};
use super::site::ProductSite;
use super::verifier::{LinkVerifier, VerificationMap};
use crate::retrieval::RetrievedDocument;

/// References found in one answer together with the verification outcome
/// for every identifier the request touches.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub references: Vec<CandidateReference>,
    pub verification: VerificationMap,
}

/// Union of identifiers linked in the answer and identifiers carried by the
/// retrieved documents. Empty identifiers are dropped.
pub fn collect_identifiers(
    references: &[CandidateReference],
    documents: &[RetrievedDocument],
) -> HashSet<String> {
    identifier_targets(references)
        .chain(documents.iter().map(|doc| doc.identifier.as_str()))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts references from `answer` and verifies every identifier the
/// request touches in a single verifier call.
pub async fn resolve(
    answer: &str,
    documents: &[RetrievedDocument],
    verifier: &LinkVerifier,
    site: &ProductSite,
) -> Resolution {
    let references = extract_references(answer);
    let identifiers = collect_identifiers(&references, documents);

    tracing::info!(
        linked = references.iter().filter(|r| r.is_identifier()).count(),
        documents = documents.len(),
        unique = identifiers.len(),
        "Resolved product identifiers"
    );

    let verification = verifier.verify(site, &identifiers).await;
    Resolution {
        references,
        verification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::links::testing::{document, site, verifier, StaticProbe};

    #[test]
    fn unions_text_and_document_identifiers() {
        let refs = extract_references("[A](A1) and [B](B2) and [site](https://example.com) and [A again](A1)");
        let docs = vec![document("B2"), document("C3"), document("")];

        let ids = collect_identifiers(&refs, &docs);

        let expected: HashSet<String> = ["A1", "B2", "C3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn verifies_each_identifier_once() {
        let probe = Arc::new(
            StaticProbe::default()
                .with_status("A1", 200)
                .with_status("B2", 200),
        );
        let answer = "[A](A1), [A](A1) and [B](B2)";
        let docs = vec![document("A1"), document("B2"), document("A1")];

        let resolution = resolve(answer, &docs, &verifier(probe.clone()), &site()).await;

        assert_eq!(resolution.references.len(), 3);
        assert_eq!(resolution.verification.len(), 2);
        let mut probed = probe.probed();
        probed.sort();
        assert_eq!(probed, vec!["A1", "B2"]);
    }

    #[tokio::test]
    async fn no_identifiers_means_no_probes() {
        let probe = Arc::new(StaticProbe::default());
        let resolution = resolve(
            "Nothing to link, see [docs](https://example.com).",
            &[document("")],
            &verifier(probe.clone()),
            &site(),
        )
        .await;

        assert!(resolution.verification.is_empty());
        assert_eq!(probe.calls(), 0);
    }
}
