// Reciprocal Rank Fusion (RRF) and score ordering

use super::types::Position;
use crate::config::RRF_K;
use std::collections::HashMap;
use std::hash::Hash;

/// Order scored items by score descending, ties by ascending key.
///
/// This is the single ordering used for sub-index rankings and for final
/// results, so equal scores always break the same way.
pub fn ranking<T: Copy + Ord>(scores: &HashMap<T, f32>) -> Vec<(T, f32)> {
    let mut ranked: Vec<(T, f32)> = scores.iter().map(|(&item, &score)| (item, score)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Combine two rankings using RRF.
///
/// RRF Formula: RRF_score(d) = sum_{r} 1 / (k + rank_r(d) + 1)
///
/// Where:
/// - d is an item
/// - r is a ranking
/// - rank_r(d) is the 0-based rank of d in ranking r
/// - k is a constant (60 in production) damping the weight of top ranks
///
/// Items missing from a ranking get nothing from it. Only ranks are used;
/// the scores carried in the input are ignored.
pub fn reciprocal_rank_fusion<T: Copy + Eq + Hash>(
    results_a: &[(T, f32)],
    results_b: &[(T, f32)],
    k: usize,
) -> HashMap<T, f32> {
    let k_param = k as f32;
    let mut rrf_scores: HashMap<T, f32> = HashMap::new();

    for results in [results_a, results_b] {
        for (rank, (item, _score)) in results.iter().enumerate() {
            *rrf_scores.entry(*item).or_insert(0.0) += 1.0 / (k_param + rank as f32 + 1.0);
        }
    }

    rrf_scores
}

/// Fuse lexical and semantic scores into hybrid RRF scores with `k = RRF_K`.
pub fn fuse(
    lexical: &HashMap<Position, f32>,
    semantic: &HashMap<Position, f32>,
) -> HashMap<Position, f32> {
    reciprocal_rank_fusion(&ranking(lexical), &ranking(semantic), RRF_K)
}

/// Scale lexical scores so the best match is 1.0.
///
/// BM25 scores are unbounded; normalizing makes lexical-mode scores
/// comparable across queries. Non-positive maxima leave scores unchanged.
pub fn normalize_lexical(scores: &HashMap<Position, f32>) -> HashMap<Position, f32> {
    let max = scores.values().copied().fold(0.0_f32, f32::max);
    if max <= 0.0 {
        return scores.clone();
    }
    scores.iter().map(|(&p, &s)| (p, s / max)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(Position, f32)]) -> HashMap<Position, f32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_rrf() {
        // Simulate results from two different search methods
        let vector_results = vec![(1, 0.9), (2, 0.8), (3, 0.7)];
        let keyword_results = vec![(3, 10.0), (1, 8.0), (4, 5.0)];

        let fused = ranking(&reciprocal_rank_fusion(
            &vector_results,
            &keyword_results,
            RRF_K,
        ));

        // 1 and 3 appear in both rankings, 2 and 4 in one each
        let top_ids: Vec<usize> = fused.iter().take(2).map(|(id, _)| *id).collect();
        assert!(top_ids.contains(&1));
        assert!(top_ids.contains(&3));
    }

    #[test]
    fn test_rrf_contribution_uses_zero_based_rank() {
        let fused = reciprocal_rank_fusion(&[(7usize, 1.0)], &[], RRF_K);
        assert!((fused[&7] - 1.0 / 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_in_both_outranks_first_in_one() {
        let lexical = scores(&[(0, 5.0), (1, 1.0)]);
        let semantic = scores(&[(0, 0.9), (2, 0.95)]);

        let fused = fuse(&lexical, &semantic);

        // 0 is first lexically and second semantically
        assert!(fused[&0] > fused[&2]);
        assert!(fused[&0] > fused[&1]);

        let alone = fuse(&scores(&[(0, 5.0)]), &scores(&[(1, 0.9)]));
        let both = fuse(&scores(&[(0, 5.0)]), &scores(&[(0, 0.9)]));
        assert!(both[&0] > alone[&0]);
    }

    #[test]
    fn test_rrf_both_empty() {
        let fused = fuse(&HashMap::new(), &HashMap::new());
        assert!(fused.is_empty());
    }

    #[test]
    fn test_rrf_single_ranker_preserves_order() {
        let fused = fuse(&scores(&[(1, 10.0), (2, 8.0), (3, 5.0)]), &HashMap::new());

        let order: Vec<Position> = ranking(&fused).iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_rrf_score_independence() {
        // RRF should use ranks only, not original scores
        let a = fuse(&scores(&[(1, 100.0), (2, 0.01)]), &HashMap::new());
        let b = fuse(&scores(&[(1, 0.5), (2, 0.4)]), &HashMap::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fusion_is_deterministic() {
        let lexical = scores(&[(0, 2.0), (1, 2.0), (2, 1.0), (5, 0.5)]);
        let semantic = scores(&[(3, 0.1), (1, 0.7), (0, 0.7), (2, -0.2)]);

        let first = ranking(&fuse(&lexical, &semantic));
        for _ in 0..10 {
            assert_eq!(ranking(&fuse(&lexical, &semantic)), first);
        }
    }

    #[test]
    fn test_ranking_breaks_ties_by_position() {
        let ranked = ranking(&scores(&[(4, 1.0), (2, 1.0), (9, 3.0), (0, 1.0)]));
        let order: Vec<Position> = ranked.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![9, 0, 2, 4]);
    }

    #[test]
    fn test_normalize_lexical_scales_to_one() {
        let normalized = normalize_lexical(&scores(&[(0, 4.0), (1, 2.0)]));
        assert_eq!(normalized[&0], 1.0);
        assert_eq!(normalized[&1], 0.5);
        assert!(normalize_lexical(&HashMap::new()).is_empty());
    }
}
