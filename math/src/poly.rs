use crate::automorphism::GaloisTool;
use crate::crt::CrtContext;
use crate::dft::ntt::NttContext;
use crate::dft::Dft;
use crate::error::{Error, Result};
use crate::modulus::Zp64;
use itertools::izip;
use num_bigint::BigInt;
use std::fmt;

/// Element of Z[X]/(X^N + 1) with machine-word coefficients.
///
/// Operations taking a modulus return a new polynomial with coefficients
/// in [0, q); the operands are never modified.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Poly {
    coeffs: Vec<i64>,
}

/// A multiplication backend for [Poly::mul].
pub trait PolyMul {
    type Output;

    /// Returns a * b mod X^N + 1 (and mod the backend's modulus, if any).
    fn poly_mul(&self, a: &Poly, b: &Poly) -> Result<Self::Output>;
}

impl Poly {
    /// Polynomial of n coefficients; `coeffs` is zero-padded up to n.
    pub fn new(n: usize, coeffs: &[i64]) -> Result<Self> {
        if coeffs.len() > n {
            return Err(Error::DegreeMismatch {
                expected: n,
                got: coeffs.len(),
            });
        }
        let mut v: Vec<i64> = vec![0; n];
        v[..coeffs.len()].copy_from_slice(coeffs);
        Ok(Self { coeffs: v })
    }

    pub fn zero(n: usize) -> Self {
        Self { coeffs: vec![0; n] }
    }

    pub fn from_coeffs(coeffs: Vec<i64>) -> Self {
        Self { coeffs }
    }

    pub fn n(&self) -> usize {
        self.coeffs.len()
    }

    pub fn coeffs(&self) -> &[i64] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == 0)
    }

    fn check_n(&self, n: usize) -> Result<()> {
        if self.n() != n {
            return Err(Error::DegreeMismatch {
                expected: n,
                got: self.n(),
            });
        }
        Ok(())
    }

    /// Coefficients reduced into [0, q).
    pub fn residues(&self, prime: &Zp64) -> Vec<u64> {
        self.coeffs.iter().map(|c| prime.reduce(*c)).collect()
    }

    fn from_residues(residues: Vec<u64>) -> Self {
        Self {
            coeffs: residues.into_iter().map(|c| c as i64).collect(),
        }
    }

    pub fn add(&self, other: &Poly, prime: &Zp64) -> Result<Poly> {
        other.check_n(self.n())?;
        Ok(Self::from_residues(
            izip!(self.coeffs.iter(), other.coeffs.iter())
                .map(|(a, b)| prime.add(*a, *b))
                .collect(),
        ))
    }

    pub fn sub(&self, other: &Poly, prime: &Zp64) -> Result<Poly> {
        other.check_n(self.n())?;
        Ok(Self::from_residues(
            izip!(self.coeffs.iter(), other.coeffs.iter())
                .map(|(a, b)| prime.sub(*a, *b))
                .collect(),
        ))
    }

    pub fn neg(&self, prime: &Zp64) -> Poly {
        Self::from_residues(self.coeffs.iter().map(|a| prime.neg(*a)).collect())
    }

    /// Multiplies by `other` with the algorithm chosen by `backend`:
    /// schoolbook for a [Zp64], NTT for an [NttContext], exact CRT for a [CrtContext].
    pub fn mul<B: PolyMul>(&self, other: &Poly, backend: &B) -> Result<B::Output> {
        backend.poly_mul(self, other)
    }

    /// O(n^2) negacyclic convolution mod q.
    pub fn mul_schoolbook(&self, other: &Poly, prime: &Zp64) -> Result<Poly> {
        other.check_n(self.n())?;
        let n: usize = self.n();
        let a: Vec<u64> = self.residues(prime);
        let b: Vec<u64> = other.residues(prime);
        let mut c: Vec<u64> = vec![0; n];
        for (i, ai) in a.iter().enumerate() {
            if *ai == 0 {
                continue;
            }
            for (j, bj) in b.iter().enumerate() {
                let prod: u64 = prime.mul(*ai, *bj);
                let k: usize = i + j;
                if k < n {
                    c[k] = prime.add(c[k], prod);
                } else {
                    c[k - n] = prime.sub(c[k - n], prod);
                }
            }
        }
        Ok(Self::from_residues(c))
    }

    /// Product in the evaluation domain of `dft`.
    pub fn mul_ntt<D: Dft>(&self, other: &Poly, dft: &D) -> Result<Poly> {
        self.check_n(dft.n())?;
        other.check_n(dft.n())?;
        let prime: &Zp64 = dft.modulus();
        let mut a: Vec<u64> = self.residues(prime);
        let mut b: Vec<u64> = other.residues(prime);
        dft.forward_inplace(&mut a)?;
        dft.forward_inplace(&mut b)?;
        izip!(a.iter_mut(), b.iter()).for_each(|(x, y)| *x = prime.mul(*x, *y));
        dft.backward_inplace(&mut a)?;
        Ok(Self::from_residues(a))
    }

    /// Exact integer product, coefficients centered modulo the CRT modulus.
    pub fn mul_crt(&self, other: &Poly, crt: &CrtContext) -> Result<Vec<BigInt>> {
        crt.multiply(&self.coeffs, &other.coeffs)
    }

    /// Applies X -> X^elt, reducing the result mod q.
    pub fn automorphism(&self, elt: u64, tool: &GaloisTool, prime: &Zp64) -> Result<Poly> {
        tool.apply_galois(&self.residues(prime), elt, prime)
            .map(Self::from_residues)
    }
}

impl PolyMul for Zp64 {
    type Output = Poly;

    fn poly_mul(&self, a: &Poly, b: &Poly) -> Result<Poly> {
        a.mul_schoolbook(b, self)
    }
}

impl PolyMul for NttContext {
    type Output = Poly;

    fn poly_mul(&self, a: &Poly, b: &Poly) -> Result<Poly> {
        a.mul_ntt(b, self)
    }
}

impl PolyMul for CrtContext {
    type Output = Vec<BigInt>;

    fn poly_mul(&self, a: &Poly, b: &Poly) -> Result<Vec<BigInt>> {
        a.mul_crt(b, self)
    }
}

/// Descending powers, zero terms omitted: `5x^3 + 4x^2 + 1x`.
impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first: bool = true;
        for (i, c) in self.coeffs.iter().enumerate().rev() {
            if *c == 0 {
                continue;
            }
            if !first {
                f.write_str(" + ")?;
            }
            first = false;
            match i {
                0 => write!(f, "{}", c)?,
                1 => write!(f, "{}x", c)?,
                _ => write!(f, "{}x^{}", c, i)?,
            }
        }
        if first {
            f.write_str("0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pads() {
        let p: Poly = Poly::new(4, &[1, 2]).unwrap();
        assert_eq!(p.coeffs(), &[1, 2, 0, 0]);
        assert_eq!(Poly::zero(4), Poly::new(4, &[]).unwrap());
        assert!(Poly::new(2, &[1, 2, 3]).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Poly::new(4, &[0, 1, 4, 5]).unwrap().to_string(), "5x^3 + 4x^2 + 1x");
        assert_eq!(Poly::new(3, &[7, 0, -2]).unwrap().to_string(), "-2x^2 + 7");
        assert_eq!(Poly::zero(8).to_string(), "0");
    }

    #[test]
    fn equality_depends_on_degree() {
        assert_ne!(Poly::zero(4), Poly::zero(8));
        assert_ne!(
            Poly::new(4, &[1]).unwrap(),
            Poly::new(4, &[0, 1]).unwrap()
        );
    }
}
