//! Arbitrary-precision modular arithmetic.
//!
//! These functions work on [BigUint]/[BigInt] and are meant for
//! construction-time work (prime and generator search, CRT constants).
//! Word-sized hot paths use [crate::modulus::Zp64] instead.

use crate::error::{Error, Result};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use prime_factorization::Factorization;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin witnesses. Fixed, so the answer for a given input never changes.
const MILLER_RABIN_BASES: [u32; 20] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
];

fn check_modulus(m: &BigUint) -> Result<()> {
    if m < &BigUint::from(2u32) {
        return Err(Error::invalid_parameter("modulus", format!("{} < 2", m)));
    }
    Ok(())
}

/// Maps a (possibly negative) integer into [0, m).
pub fn normalize(a: &BigInt, m: &BigUint) -> BigUint {
    let m_signed: BigInt = BigInt::from(m.clone());
    // mod_floor with a positive modulus is non-negative.
    a.mod_floor(&m_signed).magnitude().clone()
}

/// Returns a^-1 mod m, failing if gcd(a, m) != 1.
pub fn mod_inv(a: &BigInt, m: &BigUint) -> Result<BigUint> {
    check_modulus(m)?;
    let a: BigUint = normalize(a, m);
    a.modinv(m).ok_or_else(|| Error::NotInvertible {
        value: a.clone(),
        modulus: m.clone(),
    })
}

/// Returns base^exponent mod m; negative bases are normalized first.
pub fn mod_exp(base: &BigInt, exponent: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(Error::invalid_parameter("modulus", "zero"));
    }
    if m.is_one() {
        return Ok(BigUint::zero());
    }
    Ok(normalize(base, m).modpow(exponent, m))
}

/// Primality test. Exact below 2^64, Miller-Rabin with fixed bases above.
pub fn is_prime(n: &BigUint) -> bool {
    if let Some(small) = n.to_u64() {
        return match small {
            0 | 1 => false,
            2 | 3 => true,
            _ => primality_test::is_prime(small),
        };
    }

    if SMALL_PRIMES.iter().any(|&p| (n % p).is_zero()) {
        return false;
    }

    let one: BigUint = BigUint::one();
    let n_minus_one: BigUint = n - &one;
    let s: u64 = n_minus_one.trailing_zeros().unwrap_or(0);
    let d: BigUint = &n_minus_one >> s;

    'witness: for &base in MILLER_RABIN_BASES.iter() {
        let mut x: BigUint = BigUint::from(base).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&BigUint::from(2u32), n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Returns a nontrivial factor of an odd composite n.
fn pollard_rho(n: &BigUint) -> BigUint {
    let one: BigUint = BigUint::one();
    let mut c: BigUint = BigUint::one();
    loop {
        let step = |x: &BigUint| (x * x + &c) % n;
        let mut x: BigUint = BigUint::from(2u32);
        let mut y: BigUint = BigUint::from(2u32);
        let mut d: BigUint = one.clone();
        while d.is_one() {
            x = step(&x);
            y = step(&step(&y));
            let diff: BigUint = if x > y { &x - &y } else { &y - &x };
            d = diff.gcd(n);
        }
        if &d != n {
            return d;
        }
        c += 1u32;
    }
}

fn factor_into(n: BigUint, factors: &mut Vec<BigUint>) {
    if n.is_one() {
        return;
    }
    if is_prime(&n) {
        factors.push(n);
        return;
    }
    if let Some(small) = n.to_u64() {
        Factorization::run(small)
            .prime_factor_repr()
            .iter()
            .for_each(|(p, _)| factors.push(BigUint::from(*p)));
        return;
    }
    let d: BigUint = pollard_rho(&n);
    let cofactor: BigUint = &n / &d;
    factor_into(d, factors);
    factor_into(cofactor, factors);
}

/// Returns the distinct prime factors of n in ascending order.
pub fn distinct_prime_factors(n: &BigUint) -> Vec<BigUint> {
    let mut factors: Vec<BigUint> = Vec::new();
    if n.is_zero() {
        return factors;
    }

    let mut rest: BigUint = n.clone();
    for &p in SMALL_PRIMES.iter() {
        if (&rest % p).is_zero() {
            factors.push(BigUint::from(p));
            while (&rest % p).is_zero() {
                rest /= p;
            }
        }
    }

    factor_into(rest, &mut factors);
    factors.sort();
    factors.dedup();
    factors
}

fn check_prime(p: &BigUint) -> Result<()> {
    if !is_prime(p) {
        return Err(Error::NotPrime(p.clone()));
    }
    Ok(())
}

/// Returns the multiplicative order of a modulo the prime p.
pub fn multiplicative_order(a: &BigInt, p: &BigUint) -> Result<BigUint> {
    check_prime(p)?;
    let a: BigUint = normalize(a, p);
    if a.is_zero() {
        return Err(Error::NotInvertible {
            value: a,
            modulus: p.clone(),
        });
    }
    let mut order: BigUint = p - 1u32;
    for factor in distinct_prime_factors(&order) {
        while (&order % &factor).is_zero() && a.modpow(&(&order / &factor), p).is_one() {
            order /= &factor;
        }
    }
    Ok(order)
}

/// Returns the smallest g in [2, p) of multiplicative order p-1.
pub fn find_generator(p: &BigUint) -> Result<BigUint> {
    check_prime(p)?;
    let phi: BigUint = p - 1u32;
    let exponents: Vec<BigUint> = distinct_prime_factors(&phi)
        .iter()
        .map(|q| &phi / q)
        .collect();

    let mut g: BigUint = BigUint::from(2u32);
    while &g < p {
        if exponents.iter().all(|e| !g.modpow(e, p).is_one()) {
            return Ok(g);
        }
        g += 1u32;
    }
    Err(Error::NoGenerator(p.clone()))
}

/// Returns g^((p-1)/n) mod p for the smallest generator g, an element of
/// multiplicative order exactly n.
pub fn root_of_unity(n: &BigUint, p: &BigUint) -> Result<BigUint> {
    check_prime(p)?;
    let phi: BigUint = p - 1u32;
    if n.is_zero() || !(&phi % n).is_zero() {
        return Err(Error::NoRootOfUnity {
            order: n.clone(),
            modulus: p.clone(),
        });
    }
    let g: BigUint = find_generator(p)?;
    Ok(g.modpow(&(&phi / n), p))
}
