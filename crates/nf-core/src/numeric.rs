/// Floating point type of every field and coefficient.
pub type Real = f64;

/// Largest spatial dimension; vectors are stored as `[Real; MAX_DIM]`.
pub const MAX_DIM: usize = 3;

/// Conserved variables per node: ρ, ρv (n_dim components) and ρE.
#[inline]
pub const fn n_var(n_dim: usize) -> usize {
    n_dim + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_count_follows_dimension() {
        assert_eq!(n_var(2), 4);
        assert_eq!(n_var(3), 5);
        assert!(n_var(MAX_DIM) <= 5);
    }
}
