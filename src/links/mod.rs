//! Link validation for generated answers.
//!
//! Product references in model output are extracted, checked against the
//! live product site, and then used twice: to rewrite the answer text and
//! to build the product list. Both consumers read the same
//! `VerificationMap`, which keeps them consistent.

mod extractor;
mod fields;
mod probe;
mod products;
mod resolver;
mod rewriter;
mod site;
mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use extractor::{extract_references, CandidateReference, ReferenceKind};
pub use fields::{decode_unicode_escapes, parse_records, FieldError, Record};
pub use probe::{HttpProbe, PageProbe, ProbeError};
pub use products::{build_product_list, ProductEntry, ProductList};
pub use resolver::{collect_identifiers, resolve, Resolution};
pub use rewriter::rewrite_references;
pub use site::ProductSite;
pub use verifier::{LinkVerifier, VerificationMap};
