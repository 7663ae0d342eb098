//! Dot-product similarity over pair embeddings.
//!
//! When similarity search is enabled, the prediction engine trades the
//! deterministic frequency winner for the continuation whose embedding
//! lies closest (by dot product) to the chosen pair's embedding.

use crate::embedding::{EmbeddingStore, EmbeddingVector, PairEmbedding};
use crate::error::ValidationError;

/// Dimension-checked dot product.
pub fn dot(a: &EmbeddingVector, b: &EmbeddingVector) -> Result<f32, ValidationError> {
    if a.dim() != b.dim() {
        return Err(ValidationError::DimensionMismatch {
            actual: b.dim(),
            expected: a.dim(),
        });
    }
    Ok(a.values()
        .iter()
        .zip(b.values())
        .map(|(&x, &y)| x * y)
        .sum())
}

/// Rank every other pair in the store by similarity to `reference`.
///
/// The reference pair itself is excluded. Sorting is stable and
/// descending, so equal similarities keep store encounter order. All
/// vectors in one store share a dimension, so the dot product cannot
/// fail here.
#[must_use]
pub fn rank_similar<'a>(
    store: &'a EmbeddingStore,
    reference: &PairEmbedding,
) -> Vec<(&'a PairEmbedding, f32)> {
    let mut ranked: Vec<(&PairEmbedding, f32)> = store
        .pairs()
        .iter()
        .filter(|p| !(p.token == reference.token && p.next == reference.next))
        .map(|p| {
            let score = dot(&reference.vector, &p.vector).unwrap_or(0.0);
            (p, score)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{compute_embeddings, EmbeddingVariant, SuffixTagger};
    use crate::tokenizer::{tokenize, TokenizerConfig};
    use crate::trainer::{train_frequencies, FrequencyTable};

    fn store_for(text: &str) -> EmbeddingStore {
        let tokens = tokenize(text, &TokenizerConfig::default());
        let mut table = FrequencyTable::new();
        train_frequencies(&mut table, &tokens);
        compute_embeddings(&table, &SuffixTagger, EmbeddingVariant::Lexical8).unwrap()
    }

    #[test]
    fn dot_product_basics() {
        let a = EmbeddingVector::new(vec![1.0, 0.0, 0.5], 3).unwrap();
        let b = EmbeddingVector::new(vec![0.5, 1.0, 0.5], 3).unwrap();
        let sim = dot(&a, &b).unwrap();
        assert!((sim - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn dot_rejects_mismatched_dims() {
        let a = EmbeddingVector::new(vec![1.0; 8], 8).unwrap();
        let b = EmbeddingVector::new(vec![1.0; 9], 9).unwrap();
        assert!(matches!(
            dot(&a, &b),
            Err(ValidationError::DimensionMismatch {
                actual: 9,
                expected: 8
            })
        ));
    }

    #[test]
    fn ranking_excludes_the_reference_pair() {
        let store = store_for("The cat sat. The cat ran. The dog sat.");
        let reference = store.get("The", "cat").unwrap();
        let ranked = rank_similar(&store, reference);
        assert_eq!(ranked.len(), store.len() - 1);
        assert!(ranked
            .iter()
            .all(|(p, _)| !(p.token == "The" && p.next == "cat")));
    }

    #[test]
    fn ranking_is_descending() {
        let store = store_for("The cat sat. The cat ran. The dog sat. A bird flew.");
        let reference = store.get("The", "cat").unwrap();
        let ranked = rank_similar(&store, reference);
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn identical_lexical_profiles_rank_first() {
        // "sat" follows both "cat" and "dog"; the two pair vectors differ
        // only in frequency/prevalence, so each is the other's nearest.
        let store = store_for("The cat sat. The dog sat.");
        let reference = store.get("cat", "sat").unwrap();
        let ranked = rank_similar(&store, reference);
        assert_eq!(ranked[0].0.next, "sat");
    }
}
