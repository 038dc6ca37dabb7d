use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pearson correlation coefficient using the sum-of-products form.
///
/// Returns 0 when the lengths differ, the input is empty, or either series has
/// zero variance.
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    // NaN covers a negative product from rounding on near-constant input
    if denominator == 0.0 || denominator.is_nan() {
        return 0.0;
    }

    numerator / denominator
}

/// All-pairs correlation matrix, keys kept in the order they were supplied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix<K> {
    pub keys: Vec<K>,
    pub values: Vec<Vec<f64>>,
}

impl<K: PartialEq> CorrelationMatrix<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Correlation between two keys, `None` if either is unknown.
    pub fn get(&self, a: &K, b: &K) -> Option<f64> {
        let i = self.keys.iter().position(|k| k == a)?;
        let j = self.keys.iter().position(|k| k == b)?;
        Some(self.values[i][j])
    }
}

/// Build the full matrix, including each series against itself.
pub fn correlation_matrix<K>(series: &[(K, Vec<f64>)]) -> CorrelationMatrix<K>
where
    K: Clone + Sync,
{
    let values: Vec<Vec<f64>> = series
        .par_iter()
        .map(|(_, x)| series.iter().map(|(_, y)| correlation(x, y)).collect())
        .collect();

    CorrelationMatrix {
        keys: series.iter().map(|(k, _)| k.clone()).collect(),
        values,
    }
}

/// One unordered pair of keys with their correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair<K> {
    pub pair: (K, K),
    pub correlation: f64,
}

/// Unique pairs (`i < j`) sorted by descending `|correlation|`, cut to `limit`.
///
/// The sort is stable, so equal magnitudes keep enumeration order.
pub fn strongest_correlations<K: Clone>(
    matrix: &CorrelationMatrix<K>,
    limit: usize,
) -> Vec<CorrelationPair<K>> {
    let n = matrix.keys.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);

    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push(CorrelationPair {
                pair: (matrix.keys[i].clone(), matrix.keys[j].clone()),
                correlation: matrix.values[i][j],
            });
        }
    }

    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs.truncate(limit);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_with_itself() {
        let x = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        assert!((correlation(&x, &x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![8.0, 6.0, 4.0, 2.0];
        assert!((correlation(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_is_symmetric() {
        let x = vec![0.01, -0.02, 0.015, 0.03, -0.01];
        let y = vec![0.02, -0.01, 0.0, 0.01, 0.005];
        assert_eq!(correlation(&x, &y), correlation(&y, &x));
    }

    #[test]
    fn test_correlation_degenerate_inputs() {
        assert_eq!(correlation(&[], &[]), 0.0);
        assert_eq!(correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(correlation(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_correlation_matrix_symmetric_with_unit_diagonal() {
        let series = vec![
            ("a".to_string(), vec![0.01, 0.02, -0.01, 0.03]),
            ("b".to_string(), vec![0.02, 0.01, -0.02, 0.01]),
            ("c".to_string(), vec![-0.01, 0.0, 0.02, -0.03]),
        ];
        let matrix = correlation_matrix(&series);

        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert!((matrix.values[i][i] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            }
        }
        assert_eq!(matrix.get(&"a".to_string(), &"b".to_string()), Some(matrix.values[0][1]));
        assert!(matrix.get(&"a".to_string(), &"z".to_string()).is_none());
    }

    #[test]
    fn test_correlation_matrix_mismatched_lengths_are_zero() {
        let series = vec![("a", vec![0.01, 0.02, 0.03]), ("b", vec![0.01, 0.02])];
        let matrix = correlation_matrix(&series);
        assert_eq!(matrix.get(&"a", &"b"), Some(0.0));
    }

    #[test]
    fn test_strongest_correlations_ordering() {
        let matrix = CorrelationMatrix {
            keys: vec!["a", "b", "c"],
            values: vec![
                vec![1.0, 0.2, -0.9],
                vec![0.2, 1.0, 0.5],
                vec![-0.9, 0.5, 1.0],
            ],
        };

        let top = strongest_correlations(&matrix, 10);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].pair, ("a", "c"));
        assert_eq!(top[1].pair, ("b", "c"));
        assert_eq!(top[2].pair, ("a", "b"));

        let limited = strongest_correlations(&matrix, 1);
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].correlation, -0.9);
    }

    #[test]
    fn test_strongest_correlations_ties_keep_enumeration_order() {
        let matrix = CorrelationMatrix {
            keys: vec!["a", "b", "c"],
            values: vec![
                vec![1.0, 0.5, -0.5],
                vec![0.5, 1.0, 0.5],
                vec![-0.5, 0.5, 1.0],
            ],
        };

        let top = strongest_correlations(&matrix, 3);
        assert_eq!(top[0].pair, ("a", "b"));
        assert_eq!(top[1].pair, ("a", "c"));
        assert_eq!(top[2].pair, ("b", "c"));
    }
}
