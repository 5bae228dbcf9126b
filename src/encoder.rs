//! LDPC systematic encoder.
//!
//! This module implements a systematic encoder for LDPC (n, k) codes in which
//! the parity check matrix H has size (n-k) x n (i.e., has maximum rank) and
//! the square matrix formed by the last n-k columns of H is invertible. For
//! these codes, the encoder uses the first k symbols of the codeword as
//! systematic.
//!
//! Writing H = [H0 H1], where H1 is square and invertible, the encoder
//! computes G0 = H1^{-1}H0, which in general is a dense matrix. To encode a
//! message, the matrix G0 is multiplied by the k message bits (as a column
//! vector on the right) to obtain the n-k parity check bits.

use crate::{gf2::GF2, sparse::SparseMatrix};
use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix1};
use num_traits::One;
use thiserror::Error;

mod gauss;

/// LDPC encoder error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The square submatrix formed by the last columns of the parity check
    /// matrix is not invertible, so the encoder cannot be constructed.
    #[error("the square matrix formed by the last columns of the parity check is not invertible")]
    SubmatrixNotInvertible,
    /// The parity check matrix has at least as many rows as columns, so the
    /// code has no information bits.
    #[error("the parity check matrix leaves no room for information bits")]
    NoInformationBits,
}

/// LDPC systematic encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    generator: Array2<GF2>,
}

impl Encoder {
    /// Creates the systematic encoder corresponding to a parity check matrix.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the parity check matrix does not admit a
    /// systematic encoder.
    pub fn from_h(h: &SparseMatrix) -> Result<Encoder, Error> {
        let m = h.num_rows();
        let n = h.num_cols();
        if n <= m {
            return Err(Error::NoInformationBits);
        }
        let k = n - m;

        // If H = [H0 H1] with H0 m x k and H1 m x m, assemble A = [H1 H0] and
        // Gauss-reduce it to [I G0], with G0 = H1^{-1}H0.
        let mut a = Array2::zeros((m, n));
        for (j, t) in h.iter_all() {
            let t = if t < k { t + m } else { t - k };
            a[[j, t]] = GF2::one();
        }
        match gauss::gauss_reduction(&mut a) {
            Ok(()) => (),
            Err(gauss::Error::NotInvertible) => return Err(Error::SubmatrixNotInvertible),
        }

        Ok(Encoder {
            generator: a.slice(s![.., m..]).to_owned(),
        })
    }

    /// Encodes a message into a codeword.
    ///
    /// The codeword is formed by the message followed by the parity bits.
    pub fn encode<S>(&self, message: &ArrayBase<S, Ix1>) -> Array1<GF2>
    where
        S: Data<Elem = GF2>,
    {
        let parity = self.generator.dot(message);
        ndarray::concatenate(ndarray::Axis(0), &[message.view(), parity.view()]).unwrap()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rand::{Rng, SeedableRng};
    use num_traits::Zero;
    use rand::Rng as _;

    fn random_message(rng: &mut Rng, k: usize) -> Array1<GF2> {
        Array1::from_iter((0..k).map(|_| GF2::from(rng.gen::<bool>())))
    }

    fn parity_checks_satisfied(h: &SparseMatrix, codeword: &Array1<GF2>) -> bool {
        (0..h.num_rows()).all(|r| h.iter_row(r).map(|&c| codeword[c]).sum::<GF2>().is_zero())
    }

    #[test]
    fn encode_satisfies_parity_checks() {
        // (8, 4) code with an invertible parity submatrix
        let mut h = SparseMatrix::new(4, 8);
        h.insert_row(0, [0, 1, 4].iter());
        h.insert_row(1, [1, 2, 4, 5].iter());
        h.insert_row(2, [0, 2, 3, 6].iter());
        h.insert_row(3, [1, 3, 6, 7].iter());
        let encoder = Encoder::from_h(&h).unwrap();
        let mut rng = Rng::seed_from_u64(0);
        for _ in 0..20 {
            let message = random_message(&mut rng, 4);
            let codeword = encoder.encode(&message);
            assert_eq!(codeword.len(), 8);
            // systematic part
            assert_eq!(codeword.slice(s![..4]), message);
            assert!(parity_checks_satisfied(&h, &codeword));
        }
    }

    #[test]
    fn not_invertible() {
        // the last two columns are equal, so H1 is singular
        let mut h = SparseMatrix::new(2, 4);
        h.insert_row(0, [0, 2, 3].iter());
        h.insert_row(1, [1, 2, 3].iter());
        assert_eq!(
            Encoder::from_h(&h).unwrap_err(),
            Error::SubmatrixNotInvertible
        );
    }

    #[test]
    fn no_information_bits() {
        let h = SparseMatrix::new(4, 4);
        assert_eq!(Encoder::from_h(&h).unwrap_err(), Error::NoInformationBits);
    }
}
