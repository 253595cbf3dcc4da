pub mod barrett;
pub mod prime;
pub mod zp64;

pub use zp64::Zp64;

/// Word-sized moduli are kept below 2^MAX_MODULUS_BITS so that the sum of
/// two residues, and 2q, never overflow a u64.
pub const MAX_MODULUS_BITS: u32 = 63;

pub trait WordOps<O> {
    fn log2(self) -> usize;
    fn reverse_bits_msb(self, n: u32) -> O;
    fn mask(self) -> O;
}

impl WordOps<u64> for u64 {
    /// Returns ceil(log2(self)).
    #[inline(always)]
    fn log2(self) -> usize {
        (u64::BITS - (self - 1).leading_zeros()) as _
    }
    /// Reverses the n least significant bits.
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> u64 {
        if n == 0 {
            return 0;
        }
        self.reverse_bits() >> (u64::BITS - n)
    }
    /// Returns the smallest all-ones mask covering self - 1.
    #[inline(always)]
    fn mask(self) -> u64 {
        match self.log2() {
            64 => u64::MAX,
            bits => (1 << bits) - 1,
        }
    }
}

impl WordOps<usize> for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        if n == 0 {
            return 0;
        }
        self.reverse_bits() >> (usize::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> usize {
        match self.log2() as u32 {
            usize::BITS => usize::MAX,
            bits => (1 << bits) - 1,
        }
    }
}

pub trait ReduceOnce<O> {
    /// Assigns self-q to self if self >= q.
    /// User must ensure that 2q fits in O.
    fn reduce_once_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self.
    /// User must ensure that 2q fits in O.
    fn reduce_once(&self, q: O) -> O;
}

impl ReduceOnce<u64> for u64 {
    #[inline(always)]
    fn reduce_once_assign(&mut self, q: u64) {
        debug_assert!(q < 0x8000000000000000, "2q >= 2^64");
        *self = (*self).min(self.wrapping_sub(q))
    }

    #[inline(always)]
    fn reduce_once(&self, q: u64) -> u64 {
        debug_assert!(q < 0x8000000000000000, "2q >= 2^64");
        (*self).min(self.wrapping_sub(q))
    }
}

/// Machine integers that can be mapped into [0, q).
///
/// Signed values are normalized with a non-negative remainder, so
/// `(-1).residue(19) == 18`.
pub trait Residue: Copy {
    fn residue(self, q: u64) -> u64;
}

macro_rules! impl_residue_unsigned {
    ($($t:ty),*) => {
        $(
            impl Residue for $t {
                #[inline(always)]
                fn residue(self, q: u64) -> u64 {
                    (self as u128 % q as u128) as u64
                }
            }
        )*
    };
}

macro_rules! impl_residue_signed {
    ($($t:ty),*) => {
        $(
            impl Residue for $t {
                #[inline(always)]
                fn residue(self, q: u64) -> u64 {
                    (self as i128).rem_euclid(q as i128) as u64
                }
            }
        )*
    };
}

impl_residue_unsigned!(u8, u16, u32, u64, u128, usize);
impl_residue_signed!(i8, i16, i32, i64, isize);

impl Residue for i128 {
    #[inline(always)]
    fn residue(self, q: u64) -> u64 {
        self.rem_euclid(q as i128) as u64
    }
}
