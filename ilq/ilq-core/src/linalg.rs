//! Dense linear algebra: LU with partial pivoting, eigenvalue flooring.
//!
//! Pure math routines with no solver state dependencies. The LQ recursion
//! factors the block coupling matrix once per time step and applies the
//! factorization to the gain and offset right-hand sides together;
//! quadraticization uses the eigenvalue floor to keep cost Hessians
//! positive-definite.

use nalgebra::{DMatrix, DVector};

/// Marker for a factorization that hit a (near-)zero pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Singular;

/// Pivot magnitudes below this are treated as singular.
const MIN_PIVOT: f64 = 1e-30;

/// Factor `A = P·L·U` in place. Stores `L` (unit lower) and `U` (upper) in
/// `a` and the pivot permutation in `piv`. O(n³/3).
///
/// # Errors
///
/// Returns [`Singular`] if any pivot magnitude falls below `1e-30`.
pub fn lu_factor_in_place(a: &mut DMatrix<f64>, piv: &mut [usize]) -> Result<(), Singular> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(piv.len(), n);

    for k in 0..n {
        // Partial pivot: max |a[i,k]| for i in k..n
        let mut max_val = a[(k, k)].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = a[(i, k)].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }
        if !(max_val >= MIN_PIVOT) {
            // NaN pivots land here too.
            return Err(Singular);
        }
        piv[k] = max_row;

        if max_row != k {
            a.swap_rows(k, max_row);
        }

        for i in (k + 1)..n {
            a[(i, k)] /= a[(k, k)];
            for j in (k + 1)..n {
                a[(i, j)] -= a[(i, k)] * a[(k, j)];
            }
        }
    }
    Ok(())
}

/// Solve `P·L·U·x = b` using precomputed factors. Non-destructive on
/// `a`/`piv`; can be called repeatedly for different right-hand sides.
pub fn lu_solve_factored(a: &DMatrix<f64>, piv: &[usize], x: &mut DVector<f64>) {
    let n = a.nrows();

    for k in 0..n {
        if piv[k] != k {
            x.swap_rows(k, piv[k]);
        }
    }

    // Forward substitution (L·y = Pb)
    for i in 1..n {
        for k in 0..i {
            x[i] -= a[(i, k)] * x[k];
        }
    }

    // Back substitution (U·x = y)
    for i in (0..n).rev() {
        for k in (i + 1)..n {
            x[i] -= a[(i, k)] * x[k];
        }
        x[i] /= a[(i, i)];
    }
}

/// Solve `P·L·U·X = B` for every column of `x` simultaneously.
///
/// The outer loops sweep the factors once while the inner loop runs across
/// columns, so the factor matrix is read O(1) times rather than once per
/// right-hand side.
pub fn lu_solve_factored_multi(a: &DMatrix<f64>, piv: &[usize], x: &mut DMatrix<f64>) {
    let n = a.nrows();
    let m = x.ncols();

    for k in 0..n {
        if piv[k] != k {
            x.swap_rows(k, piv[k]);
        }
    }

    for i in 1..n {
        for k in 0..i {
            let l_ik = a[(i, k)];
            for c in 0..m {
                x[(i, c)] -= l_ik * x[(k, c)];
            }
        }
    }

    for i in (0..n).rev() {
        for k in (i + 1)..n {
            let u_ik = a[(i, k)];
            for c in 0..m {
                x[(i, c)] -= u_ik * x[(k, c)];
            }
        }
        let inv_diag = 1.0 / a[(i, i)];
        for c in 0..m {
            x[(i, c)] *= inv_diag;
        }
    }
}

/// Symmetrize `m` and floor its spectrum at `floor`.
///
/// Leaves the matrix untouched (beyond symmetrization) when all eigenvalues
/// already sit at or above the floor; otherwise reconstructs it with the
/// offending eigenvalues clamped. Used to keep state Hessians and
/// own-control Hessians positive-definite.
pub fn psd_floor(m: &mut DMatrix<f64>, floor: f64) {
    let sym = (&*m + m.transpose()) * 0.5;
    let mut eigen = sym.clone().symmetric_eigen();
    if eigen.eigenvalues.iter().all(|&e| e >= floor) {
        *m = sym;
        return;
    }
    for e in eigen.eigenvalues.iter_mut() {
        *e = e.max(floor);
    }
    *m = eigen.recompose();
}
