//! Samplers for secrets and noise.
//!
//! Every function takes the randomness source explicitly; nothing here
//! reads a global generator. Tests pass a seeded
//! [sampling::source::Source] to get reproducible draws.

use crate::error::{Error, Result};
use crate::modulus::WordOps;
use rand::seq::index;
use rand::Rng;
use rand_core::CryptoRng;
use rand_distr::{Distribution, Normal};
use sampling::distributions::Distributions;
use sampling::source::next_u64n;

/// Ternary vector of `length` entries with exactly `hamming_weight` of them in {-1, 1}.
pub fn sample_hamming_weight_array<R: CryptoRng + ?Sized>(
    length: usize,
    hamming_weight: usize,
    rng: &mut R,
) -> Result<Vec<i64>> {
    if hamming_weight > length {
        return Err(Error::HammingWeightTooLarge {
            weight: hamming_weight,
            length,
        });
    }
    let mut out: Vec<i64> = vec![0; length];
    for i in index::sample(rng, length, hamming_weight).iter() {
        out[i] = if rng.random_bool(0.5) { 1 } else { -1 };
    }
    Ok(out)
}

/// `count` values b1 - b2 for independent fair bits b1, b2.
pub fn sample_triangle<R: CryptoRng + ?Sized>(count: usize, rng: &mut R) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(count);
    let mut bits: u64 = 0;
    let mut available: u32 = 0;
    for _ in 0..count {
        if available < 2 {
            bits = rng.next_u64();
            available = u64::BITS;
        }
        out.push((bits & 1) as i64 - ((bits >> 1) & 1) as i64);
        bits >>= 2;
        available -= 2;
    }
    out
}

/// `count` integers uniform in [min, max).
pub fn sample_positive_uniform<R: CryptoRng + ?Sized>(
    min: u64,
    max: u64,
    count: usize,
    rng: &mut R,
) -> Result<Vec<u64>> {
    if min >= max {
        return Err(Error::InvalidSampleRange { min, max });
    }
    Ok((0..count).map(|_| rng.random_range(min..max)).collect())
}

/// `count` residues uniform in [0, q), by rejection on masked words.
pub fn sample_uniform_mod<R: CryptoRng + ?Sized>(q: u64, count: usize, rng: &mut R) -> Result<Vec<u64>> {
    if q == 0 {
        return Err(Error::InvalidSampleRange { min: 0, max: q });
    }
    let mask: u64 = q.mask();
    Ok((0..count).map(|_| next_u64n(rng, q, mask)).collect())
}

/// Rounded samples of `dist`, redrawn while |x| > bound.
pub fn sample_gaussian<R: CryptoRng + ?Sized>(
    dist: &Normal<f64>,
    bound: f64,
    count: usize,
    rng: &mut R,
) -> Result<Vec<i64>> {
    if !bound.is_finite() || bound < 0.0 {
        return Err(Error::InvalidDistribution(format!(
            "bound must be finite and non-negative, got {}",
            bound
        )));
    }
    Ok((0..count)
        .map(|_| loop {
            let x: f64 = dist.sample(rng).round();
            if x.abs() <= bound {
                break x as i64;
            }
        })
        .collect())
}

/// Draws `n` signed coefficients from `dist`.
pub fn sample_noise<R: CryptoRng + ?Sized>(dist: &Distributions, n: usize, rng: &mut R) -> Result<Vec<i64>> {
    match *dist {
        Distributions::Ternary { hamming_weight } => sample_hamming_weight_array(n, hamming_weight, rng),
        Distributions::Triangle => Ok(sample_triangle(n, rng)),
        Distributions::Normal { dist, bound } => sample_gaussian(&dist, bound, n, rng),
        Distributions::Uniform { min, max } => {
            if max > i64::MAX as u64 {
                return Err(Error::InvalidSampleRange { min, max });
            }
            Ok(sample_positive_uniform(min, max, n, rng)?
                .into_iter()
                .map(|x| x as i64)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampling::source::Source;

    #[test]
    fn triangle_values() {
        let mut source: Source = Source::new([5u8; 32]);
        let v: Vec<i64> = sample_triangle(4096, &mut source);
        assert_eq!(v.len(), 4096);
        assert!(v.iter().all(|x| (-1..=1).contains(x)));
        let zeros: usize = v.iter().filter(|x| **x == 0).count();
        // mean 2048, sd 32
        assert!((1800..2300).contains(&zeros));
    }

    #[test]
    fn uniform_mod_range() {
        let mut source: Source = Source::new([9u8; 32]);
        let v: Vec<u64> = sample_uniform_mod(73, 1000, &mut source).unwrap();
        assert!(v.iter().all(|x| *x < 73));
        assert!(sample_uniform_mod(0, 1, &mut source).is_err());

        let q: u64 = 0x7fffffffff620001;
        let v: Vec<u64> = sample_uniform_mod(q, 1000, &mut source).unwrap();
        assert!(v.iter().all(|x| *x < q));
        assert!(v.iter().any(|x| *x >= 1 << 62));
        assert_eq!(sample_uniform_mod(1, 8, &mut source).unwrap(), vec![0; 8]);
    }
}
