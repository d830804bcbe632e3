//! The `n`-th prime, counting from one.

use anyhow::ensure;

use crate::math::PrimeTable;

crate::problem! {
    (n: usize) {
        ensure!(n >= 1, "primes are counted from 1");
        let table = PrimeTable::new();
        Ok(table.nth(n - 1)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p007() {
        assert_eq!(solve_raw(6).unwrap(), "13");
        assert_eq!(solve_raw(10_001).unwrap(), "104743");
        assert!(solve_raw(0).is_err());
    }
}
