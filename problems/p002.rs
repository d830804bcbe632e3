//! Sum of the even Fibonacci numbers not exceeding `limit`.

use crate::math::fibonacci;

crate::problem! {
    (limit: u64) {
        let sum = fibonacci()
            .take_while(move |&f| f <= limit)
            .filter(|f| f % 2 == 0)
            .reduce(0, |acc, f| acc + f)?;
        Ok(sum.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p002() {
        assert_eq!(solve_raw(100).unwrap(), "44");
        assert_eq!(solve_raw(4_000_000).unwrap(), "4613732");
    }
}
