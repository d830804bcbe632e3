//! Sum of the multiples of 3 or 5 below `n`.

use crate::math::naturals;

crate::problem! {
    (n: u64) {
        let sum = naturals(1u64)
            .take_while(move |&k| k < n)
            .filter(|k| k % 3 == 0 || k % 5 == 0)
            .reduce(0, |acc, k| acc + k)?;
        Ok(sum.to_string())
    }
}
