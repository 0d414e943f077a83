//! Product retrieval.
//!
//! - `ProductIndex`: abstract nearest-neighbour index over product records
//! - `ChromaIndex`: Chroma REST implementation
//! - `maximal_marginal_relevance`: diversity re-ranking applied on top

mod chroma;
mod document;
mod mmr;
mod store;

pub use chroma::ChromaIndex;
pub use document::RetrievedDocument;
pub use mmr::{cosine_similarity, maximal_marginal_relevance};
pub use store::{IndexHit, ProductIndex};
