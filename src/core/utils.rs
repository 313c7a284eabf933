//! Utility functions shared by the protocol modules.
//!
//! This module contains helpers for:
//! - Information-theoretic quantities (binary entropy, BB84 security parameter).
//! - Bit string rendering and parity.
//! - Guarded ratios that never produce NaN or infinity.
//! - The monotonic clock used to timestamp qubit creation.

use std::sync::OnceLock;
use std::time::Instant;

/// Binary Shannon entropy $H_2(p) = -p \log_2 p - (1-p) \log_2 (1-p)$.
///
/// Returns 0 at (and beyond) the endpoints, where the limit is 0.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        0.0
    } else {
        -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
    }
}

/// Asymptotic BB84 secret fraction $\max(0, 1 - 2 H_2(e))$.
pub fn security_parameter(error_rate: f64) -> f64 {
    (1.0 - 2.0 * binary_entropy(error_rate)).max(0.0)
}

/// Renders bits as a string of '0' and '1' characters.
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Odd parity -> true
pub fn parity(bits: &[bool]) -> bool {
    bits.iter().filter(|&&b| b).count() % 2 == 1
}

/// `numerator / denominator`, or `default` when the denominator is zero.
pub fn ratio_or(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        default
    } else {
        numerator / denominator
    }
}

/// Seconds elapsed since the first call in this process.
pub fn monotonic_seconds() -> f64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binary_entropy_is_symmetric_and_peaks_at_half() {
        assert_relative_eq!(binary_entropy(0.5), 1.0);
        assert_relative_eq!(binary_entropy(0.11), binary_entropy(0.89), epsilon = 1e-12);
        assert_eq!(binary_entropy(0.0), 0.0);
        assert_eq!(binary_entropy(1.0), 0.0);
    }

    #[test]
    fn security_parameter_vanishes_near_threshold() {
        assert_relative_eq!(security_parameter(0.0), 1.0);
        // H2(0.11) ~ 0.4999
        assert!(security_parameter(0.11) < 0.01);
        assert_eq!(security_parameter(0.25), 0.0);
    }

    #[test]
    fn bit_strings() {
        let bits = vec![true, false, false, true];
        assert_eq!(bits_to_string(&bits), "1001");
        assert_eq!(bits_to_string(&[]), "");
    }

    #[test]
    fn parity_counts_ones() {
        assert!(!parity(&[]));
        assert!(parity(&[true, false]));
        assert!(!parity(&[true, true]));
    }

    #[test]
    fn ratio_guards_zero_denominator() {
        assert_eq!(ratio_or(3.0, 0.0, 1.0), 1.0);
        assert_eq!(ratio_or(3.0, 4.0, 1.0), 0.75);
    }

    #[test]
    fn clock_is_monotonic() {
        let a = monotonic_seconds();
        let b = monotonic_seconds();
        assert!(b >= a);
    }
}
