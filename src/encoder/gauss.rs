use ndarray::{Array2, LinalgScalar};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Error {
    NotInvertible,
}

// Reduces the left square block of `array` to the identity by row operations,
// applying the same operations to the remaining columns.
pub fn gauss_reduction<A: LinalgScalar + PartialEq>(array: &mut Array2<A>) -> Result<(), Error> {
    let (n, m) = array.dim();

    // Forward elimination: upper triangular with ones on the diagonal.
    for j in 0..n {
        // Find a non-zero pivot in the current column.
        let Some(k) = (j..n).find(|&k| !array[[k, j]].is_zero()) else {
            return Err(Error::NotInvertible);
        };
        if k != j {
            for t in j..m {
                array.swap([j, t], [k, t]);
            }
        }

        let pivot = array[[j, j]];
        if !pivot.is_one() {
            for t in j..m {
                array[[j, t]] = array[[j, t]] / pivot;
            }
        }

        for t in (j + 1)..n {
            let x = array[[t, j]];
            if !x.is_zero() {
                for u in j..m {
                    array[[t, u]] = array[[t, u]] - x * array[[j, u]];
                }
            }
        }
    }

    // Back substitution: clear the entries above the diagonal.
    for j in (0..n).rev() {
        for t in 0..j {
            let x = array[[t, j]];
            if !x.is_zero() {
                for u in j..m {
                    array[[t, u]] = array[[t, u]] - x * array[[j, u]];
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gf2::GF2;
    use ndarray::arr2;
    use num_traits::{One, Zero};

    #[test]
    fn reduce_to_identity() {
        let i = GF2::one();
        let o = GF2::zero();
        let mut a = arr2(&[
            [i, o, i, i, i, o, i, o, i],
            [i, i, o, o, i, i, o, i, o],
            [i, i, i, o, o, i, i, o, i],
        ]);
        gauss_reduction(&mut a).unwrap();
        let expected = arr2(&[
            [i, o, o, i, o, o, o, i, o],
            [o, i, o, i, i, i, o, o, o],
            [o, o, i, o, i, o, i, i, i],
        ]);
        assert_eq!(&a, &expected);
    }

    #[test]
    fn singular() {
        let i = GF2::one();
        let o = GF2::zero();
        let mut a = arr2(&[[i, i, o], [i, i, i]]);
        assert_eq!(gauss_reduction(&mut a), Err(Error::NotInvertible));
    }
}
