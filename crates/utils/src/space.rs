/// Evenly spaced values over a closed interval
///
/// Both endpoints are included and exact. A single sample is placed at
/// `start`, and zero samples give an empty vector.
///
/// ```rust
/// # use volstack_utils::linspace;
/// assert_eq!(linspace(0.0, 9.0, 4), vec![0.0, 3.0, 6.0, 9.0]);
/// assert_eq!(linspace(0.0, 9.0, 1), vec![0.0]);
/// assert!(linspace(0.0, 9.0, 0).is_empty());
/// ```
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// Round an integer up to the next even number
///
/// ```rust
/// # use volstack_utils::round_up_even;
/// assert_eq!(round_up_even(39), 40);
/// assert_eq!(round_up_even(40), 40);
/// assert_eq!(round_up_even(0), 0);
/// ```
pub fn round_up_even(n: usize) -> usize {
    n + n % 2
}
