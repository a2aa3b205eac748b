//! Advisory parameter choices for the hypergraph.
//!
//! `r` is the arity (number of partitions) and `c` the load factor; the graph
//! gets `ceil(c * n / r)` vertices per partition. Values follow from mapping
//! benchmarks: small sets take a larger `r`, large sets settle on `r = 3`.

/// Arities the construction supports.
pub const MIN_ARITY: u8 = 2;
pub const MAX_ARITY: u8 = 10;

/// Arity that keeps the expected number of mapping retries low for `n` elements.
pub fn optimal_arity(n: usize) -> u8 {
    assert!(n > 0, "n is 0");
    match n {
        0..15 => 6,
        15..30 => 5,
        30..240 => 4,
        _ => 3,
    }
}

/// Load factor paired with [`optimal_arity`] for `n` elements.
pub fn optimal_load_factor(n: usize) -> f64 {
    assert!(n > 0, "n is 0");
    match n {
        0..15 => 1.35,
        // 2.45 down to 1.96
        15..30 => 2.45 - (n - 15) as f64 * 0.035,
        // 2.35 down to 1.45
        30..240 => 2.35 - (n - 30) as f64 * 0.0043,
        // 2.25 down to 1.36
        240..1280 => 2.25 - (n - 240) as f64 * 0.00086,
        _ => 1.35,
    }
}

/// Smallest load factor for which acyclic `r`-partite hypergraphs remain likely
/// (Botelho, *Near-Optimal Space Perfect Hashing Algorithms*, 2008).
pub fn minimum_load_factor(r: u8) -> f64 {
    match r {
        2 => 2.05,
        3 => 1.25,
        4 => 1.35,
        5 => 1.45,
        6 => 1.65,
        7 => 1.75,
        8 => 1.95,
        9 => 2.05,
        10 => 2.25,
        _ => panic!("r out of range [2,10]: {r}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_steps_down_with_n() {
        assert_eq!(optimal_arity(1), 6);
        assert_eq!(optimal_arity(14), 6);
        assert_eq!(optimal_arity(15), 5);
        assert_eq!(optimal_arity(29), 5);
        assert_eq!(optimal_arity(30), 4);
        assert_eq!(optimal_arity(239), 4);
        assert_eq!(optimal_arity(240), 3);
        assert_eq!(optimal_arity(1_000_000), 3);
    }

    #[test]
    fn load_factor_bands() {
        assert_eq!(optimal_load_factor(5), 1.35);
        assert!((optimal_load_factor(15) - 2.45).abs() < 1e-9);
        assert!((optimal_load_factor(30) - 2.35).abs() < 1e-9);
        assert!((optimal_load_factor(240) - 2.25).abs() < 1e-9);
        assert_eq!(optimal_load_factor(5_000), 1.35);
    }

    #[test]
    fn load_factor_decreases_inside_each_band() {
        for band in [15..30usize, 30..240, 240..1280] {
            let values: Vec<f64> = band.map(optimal_load_factor).collect();
            assert!(values.windows(2).all(|w| w[1] < w[0]));
        }
    }

    #[test]
    fn optimal_pair_respects_minimum() {
        for n in [15usize, 29, 30, 100, 239, 240, 1279, 10_000] {
            let r = optimal_arity(n);
            assert!(optimal_load_factor(n) >= minimum_load_factor(r), "n = {n}");
        }
    }

    #[test]
    #[should_panic(expected = "r out of range")]
    fn minimum_rejects_arity_one() {
        minimum_load_factor(1);
    }

    #[test]
    #[should_panic(expected = "n is 0")]
    fn arity_rejects_empty_set() {
        optimal_arity(0);
    }
}
