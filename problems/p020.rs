//! Digit sum of `n!`.

use num_traits::One;

use crate::{math::naturals, value::Num};

crate::problem! {
    (n: usize) {
        let fact = naturals(1u64)
            .take(n)
            .map(Num::from)
            .reduce(Num::one(), |acc, k| acc * k)?;
        let digits: u32 = fact.to_string().chars().filter_map(|c| c.to_digit(10)).sum();
        Ok(digits.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p020() {
        assert_eq!(solve_raw(0).unwrap(), "1");
        assert_eq!(solve_raw(10).unwrap(), "27");
        assert_eq!(solve_raw(100).unwrap(), "648");
    }
}
