//! Maximal marginal relevance re-ranking.
//!
//! Picks `k` candidates that are relevant to the query while penalising
//! similarity to candidates already picked. `lambda_mult = 1.0` degrades to
//! plain relevance ordering, `0.0` to maximal diversity.

/// Returns indices into `candidates` in selection order.
pub fn maximal_marginal_relevance(
    query: &[f32],
    candidates: &[Vec<f32>],
    lambda_mult: f32,
    k: usize,
) -> Vec<usize> {
    let limit = k.min(candidates.len());
    if limit == 0 {
        return Vec::new();
    }

    let lambda = f64::from(lambda_mult.clamp(0.0, 1.0));
    let to_query: Vec<f64> = candidates
        .iter()
        .map(|candidate| cosine_similarity(query, candidate))
        .collect();

    let first = argmax(&to_query);
    let mut selected = vec![first];
    // Highest similarity of each candidate to anything selected so far.
    let mut redundancy: Vec<f64> = candidates
        .iter()
        .map(|candidate| cosine_similarity(candidate, &candidates[first]))
        .collect();

    while selected.len() < limit {
        let mut best: Option<(usize, f64)> = None;
        for (idx, query_score) in to_query.iter().enumerate() {
            if selected.contains(&idx) {
                continue;
            }
            let score = lambda * query_score - (1.0 - lambda) * redundancy[idx];
            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((idx, score));
            }
        }

        let Some((next, _)) = best else {
            break;
        };
        selected.push(next);
        for (idx, candidate) in candidates.iter().enumerate() {
            let sim = cosine_similarity(candidate, &candidates[next]);
            if sim > redundancy[idx] {
                redundancy[idx] = sim;
            }
        }
    }

    selected
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, value)| {
            if *value > best.1 {
                (idx, *value)
            } else {
                best
            }
        })
        .0
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_relevance_orders_by_similarity() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]];

        assert_eq!(maximal_marginal_relevance(&query, &candidates, 1.0, 3), vec![1, 2, 0]);
    }

    #[test]
    fn diversity_skips_near_duplicates() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            vec![1.0, 0.0],
            vec![0.99, 0.01],
            vec![0.6, 0.8],
        ];

        // With a diversity bias the near-duplicate of the first pick loses
        // to the less relevant but distinct candidate.
        assert_eq!(maximal_marginal_relevance(&query, &candidates, 0.3, 2), vec![0, 2]);
    }

    #[test]
    fn limits_to_available_candidates() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![1.0, 0.0]];

        assert_eq!(maximal_marginal_relevance(&query, &candidates, 0.7, 25), vec![0]);
        assert!(maximal_marginal_relevance(&query, &[], 0.7, 25).is_empty());
        assert!(maximal_marginal_relevance(&query, &candidates, 0.7, 0).is_empty());
    }

    #[test]
    fn cosine_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-9);
    }
}
