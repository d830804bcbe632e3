//! Sum of the primes below `n`.

use itertools::Itertools;

use crate::math::primes;

crate::problem! {
    (n: u64, running: bool) {
        let sums = primes().take_while(move |&p| p < n).summatory();
        if running {
            return Ok(sums.to_vec()?.iter().join(","));
        }
        Ok(sums.last()?.unwrap_or(0).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p010() {
        assert_eq!(solve_raw(10, false).unwrap(), "17");
        assert_eq!(solve_raw(10, true).unwrap(), "2,5,10,17");
        assert_eq!(solve_raw(2, false).unwrap(), "0");
        assert_eq!(solve_raw(2_000_000, false).unwrap(), "142913828922");
    }
}
