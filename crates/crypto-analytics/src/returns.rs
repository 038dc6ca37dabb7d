/// Period-over-period fractional returns.
///
/// Output has one entry per adjacent pair; a pair whose earlier price is zero
/// contributes `0.0` instead of dividing.
pub fn returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Percent change from `old` to `new`. Returns 0 when `old` is 0.
pub fn percentage_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    (new - old) / old * 100.0
}

/// Trailing simple moving average, same length as `data`.
///
/// The first `window - 1` entries are `NaN` because the window is not full yet.
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; data.len()];
    }

    let mut result = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        if i + 1 < window {
            result.push(f64::NAN);
        } else {
            let sum: f64 = data[i + 1 - window..=i].iter().sum();
            result.push(sum / window as f64);
        }
    }
    result
}

/// Running compounded return: `prod(1 + r) - 1` at every step.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            growth *= 1.0 + r;
            growth - 1.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_basic() {
        let result = returns(&[100.0, 105.0, 103.0, 108.0]);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 0.05).abs() < 1e-3);
        assert!((result[1] - (-0.019)).abs() < 1e-3);
        assert!((result[2] - 0.0485).abs() < 1e-3);
    }

    #[test]
    fn test_returns_short_input() {
        assert!(returns(&[]).is_empty());
        assert!(returns(&[100.0]).is_empty());
    }

    #[test]
    fn test_returns_length_is_one_less() {
        for n in 1..20 {
            let prices: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
            assert_eq!(returns(&prices).len(), n - 1);
        }
    }

    #[test]
    fn test_returns_zero_previous_price() {
        let result = returns(&[0.0, 10.0, 20.0]);
        assert_eq!(result[0], 0.0);
        assert!((result[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(100.0, 150.0), 50.0);
        assert!((percentage_change(150.0, 100.0) - (-33.33)).abs() < 0.01);
        assert_eq!(percentage_change(100.0, 100.0), 0.0);
        assert_eq!(percentage_change(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_moving_average_leading_nan() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = moving_average(&data, 3);

        assert_eq!(result.len(), data.len());
        assert_eq!(result.iter().take_while(|v| v.is_nan()).count(), 2);
        assert!((result[2] - 2.0).abs() < 1e-12);
        assert!((result[3] - 3.0).abs() < 1e-12);
        assert!((result[4] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_longer_than_data() {
        let result = moving_average(&[1.0, 2.0], 5);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_cumulative_returns() {
        let result = cumulative_returns(&[0.1, -0.1, 0.5]);

        assert!((result[0] - 0.1).abs() < 1e-12);
        assert!((result[1] - (1.1 * 0.9 - 1.0)).abs() < 1e-12);
        assert!((result[2] - (1.1 * 0.9 * 1.5 - 1.0)).abs() < 1e-12);
        assert!(cumulative_returns(&[]).is_empty());
    }
}
