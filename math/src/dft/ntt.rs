use crate::dft::Dft;
use crate::error::{Error, Result};
use crate::modulus::barrett::Barrett;
use crate::modulus::{ReduceOnce, WordOps, Zp64};
use itertools::izip;
use tracing::{debug, instrument};

/// Number-theoretic transform tables for Z_q[X]/(X^N + 1).
///
/// `root_of_unity_array[i] = psi^i` and `root_of_unity_inv_array[i] = psi^-i`
/// for i in [0, N), where psi is a primitive 2N-th root of unity mod q.
pub struct NttContext {
    prime: Zp64,
    n: usize,
    log_n: u32,
    psi: u64,
    root_of_unity_array: Vec<u64>,
    root_of_unity_inv_array: Vec<u64>,
    psi_forward: Vec<Barrett<u64>>,
    psi_backward: Vec<Barrett<u64>>,
    /// n^-1 * psi^-i, folds the scaling into the inverse twist.
    psi_backward_scaled: Vec<Barrett<u64>>,
    n_inv: u64,
}

impl NttContext {
    /// Builds the tables for dimension n over the prime q; requires q = 1 mod 2n.
    #[instrument(level = "debug")]
    pub fn new(n: usize, q: u64) -> Result<Self> {
        Self::from_prime(n, Zp64::new(q)?)
    }

    #[instrument(level = "debug", skip(prime), fields(q = prime.q()))]
    pub fn from_prime(n: usize, prime: Zp64) -> Result<Self> {
        if !n.is_power_of_two() {
            return Err(Error::NotPowerOfTwo(n));
        }

        let q: u64 = prime.q();
        let nth_root: u64 = (n as u64) << 1;
        let rem: u64 = (q - 1) % nth_root;
        if rem != 0 {
            return Err(Error::NotNttFriendly { q, n, rem });
        }

        let psi: u64 = prime.root_of_unity(nth_root)?;
        let psi_inv: u64 = prime.inv(psi)?;
        let n_inv: u64 = prime.inv(n as u64)?;

        let mut root_of_unity_array: Vec<u64> = Vec::with_capacity(n);
        let mut root_of_unity_inv_array: Vec<u64> = Vec::with_capacity(n);

        let mut powers_forward: u64 = 1;
        let mut powers_backward: u64 = 1;
        for _ in 0..n {
            root_of_unity_array.push(powers_forward);
            root_of_unity_inv_array.push(powers_backward);
            powers_forward = prime.mul(powers_forward, psi);
            powers_backward = prime.mul(powers_backward, psi_inv);
        }

        let psi_forward: Vec<Barrett<u64>> = root_of_unity_array
            .iter()
            .map(|&x| prime.prepare(x))
            .collect();
        let psi_backward: Vec<Barrett<u64>> = root_of_unity_inv_array
            .iter()
            .map(|&x| prime.prepare(x))
            .collect();
        let psi_backward_scaled: Vec<Barrett<u64>> = root_of_unity_inv_array
            .iter()
            .map(|&x| prime.prepare(prime.mul(x, n_inv)))
            .collect();

        debug!(n, q, psi, n_inv, "ntt tables ready");

        Ok(Self {
            log_n: n.trailing_zeros(),
            prime,
            n,
            psi,
            root_of_unity_array,
            root_of_unity_inv_array,
            psi_forward,
            psi_backward,
            psi_backward_scaled,
            n_inv,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn prime(&self) -> &Zp64 {
        &self.prime
    }

    pub fn q(&self) -> u64 {
        self.prime.q()
    }

    /// Primitive 2N-th root of unity the tables are built from.
    pub fn psi(&self) -> u64 {
        self.psi
    }

    /// N^-1 mod q.
    pub fn n_inv(&self) -> u64 {
        self.n_inv
    }

    pub fn root_of_unity_array(&self) -> &[u64] {
        &self.root_of_unity_array
    }

    pub fn root_of_unity_inv_array(&self) -> &[u64] {
        &self.root_of_unity_inv_array
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.n {
            return Err(Error::DegreeMismatch {
                expected: self.n,
                got: len,
            });
        }
        Ok(())
    }

    /// In-place cyclic transform of length N with omega = root_powers[2]:
    /// a[k] <- sum_j a[j] * root_powers[2 * j * k mod 2N].
    ///
    /// With [NttContext::root_of_unity_inv_array] followed by
    /// [NttContext::scale_by_n_inv] this is the inverse transform.
    pub fn ntt(&self, a: &mut [u64], root_powers: &[u64]) -> Result<()> {
        self.check_len(a.len())?;
        if root_powers.len() != self.n {
            return Err(Error::LengthMismatch {
                expected: self.n,
                got: root_powers.len(),
            });
        }
        let q: u64 = self.q();
        a.iter_mut().for_each(|x| *x %= q);
        self.transform(a, |k, x| self.prime.mul(x, root_powers[k]));
        Ok(())
    }

    /// Multiplies every entry by N^-1 mod q.
    pub fn scale_by_n_inv(&self, a: &mut [u64]) -> Result<()> {
        self.check_len(a.len())?;
        let n_inv: Barrett<u64> = self.prime.prepare(self.n_inv);
        let barrett = self.prime.barrett();
        a.iter_mut().for_each(|x| barrett.mul_external_assign(n_inv, x));
        Ok(())
    }

    /// Negacyclic forward transform: a[i] *= psi^i, then [NttContext::ntt].
    /// Entry k of the result is a(psi^(2k+1)).
    pub fn forward_inplace(&self, a: &mut [u64]) -> Result<()> {
        self.check_len(a.len())?;
        let barrett = self.prime.barrett();
        izip!(a.iter_mut(), self.psi_forward.iter()).for_each(|(x, psi)| {
            *x = barrett.mul_external(*psi, *x);
        });
        self.transform(a, |k, x| barrett.mul_external(self.psi_forward[k], x));
        Ok(())
    }

    /// Inverse of [NttContext::forward_inplace]: inverse transform, scaling
    /// by N^-1 and a[i] *= psi^-i.
    pub fn inverse_inplace(&self, a: &mut [u64]) -> Result<()> {
        self.check_len(a.len())?;
        let barrett = self.prime.barrett();
        let q: u64 = self.q();
        a.iter_mut().for_each(|x| *x %= q);
        self.transform(a, |k, x| barrett.mul_external(self.psi_backward[k], x));
        izip!(a.iter_mut(), self.psi_backward_scaled.iter()).for_each(|(x, psi)| {
            *x = barrett.mul_external(*psi, *x);
        });
        Ok(())
    }

    pub fn forward(&self, a: &[u64]) -> Result<Vec<u64>> {
        let mut b: Vec<u64> = a.to_vec();
        self.forward_inplace(&mut b)?;
        Ok(b)
    }

    pub fn inverse(&self, a: &[u64]) -> Result<Vec<u64>> {
        let mut b: Vec<u64> = a.to_vec();
        self.inverse_inplace(&mut b)?;
        Ok(b)
    }

    /// Returns a * b mod (X^N + 1, q).
    pub fn multiply(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        let mut a_ntt: Vec<u64> = self.forward(a)?;
        let b_ntt: Vec<u64> = self.forward(b)?;
        izip!(a_ntt.iter_mut(), b_ntt.iter()).for_each(|(x, y)| *x = self.prime.mul(*x, *y));
        self.inverse_inplace(&mut a_ntt)?;
        Ok(a_ntt)
    }

    /// Iterative radix-2 Cooley-Tukey: bit-reversal permutation then log N
    /// butterfly layers. `mul_root(k, x)` returns x * psi^k for k < N.
    fn transform<F>(&self, a: &mut [u64], mul_root: F)
    where
        F: Fn(usize, u64) -> u64,
    {
        let n: usize = self.n;
        let q: u64 = self.q();

        for i in 0..n {
            let j: usize = i.reverse_bits_msb(self.log_n);
            if i < j {
                a.swap(i, j);
            }
        }

        for layer in 0..self.log_n {
            let half: usize = 1 << layer;
            let t: usize = half << 1;
            // omega_t = psi^(2N/t)
            let stride: usize = (n << 1) / t;
            a.chunks_exact_mut(t).for_each(|chunk| {
                let (lo, hi) = chunk.split_at_mut(half);
                izip!(lo.iter_mut(), hi.iter_mut())
                    .enumerate()
                    .for_each(|(j, (u, v))| {
                        debug_assert!(*u < q && *v < q);
                        let w: u64 = mul_root(j * stride, *v);
                        *v = (*u + q - w).reduce_once(q);
                        *u = (*u + w).reduce_once(q);
                    });
            });
        }
    }
}

impl Dft for NttContext {
    fn n(&self) -> usize {
        self.n
    }

    fn modulus(&self) -> &Zp64 {
        &self.prime
    }

    fn forward_inplace(&self, a: &mut [u64]) -> Result<()> {
        NttContext::forward_inplace(self, a)
    }

    fn backward_inplace(&self, a: &mut [u64]) -> Result<()> {
        self.inverse_inplace(a)
    }
}
