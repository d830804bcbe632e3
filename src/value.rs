use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Add, AddAssign, Mul},
};

use num_traits::{One, Zero};
use rug::Integer as Int;

/// Representation normalization, applied element-wise by [`Sequence::shrink`].
///
/// [`Sequence::shrink`]: crate::seq::Sequence::shrink
pub trait Shrink: Sized {
    fn shrink(self) -> Self;
}

/// An integer that lives in a machine word while it fits and spills into a
/// `rug::Integer` when it does not.
///
/// Equality, ordering and hashing go by numeric value, whichever representation holds it.
#[derive(Debug, Clone)]
pub enum Num {
    Small(i64),
    Big(Int),
}

impl Num {
    pub fn to_int(&self) -> Int {
        match self {
            Num::Small(v) => Int::from(*v),
            Num::Big(b) => b.clone(),
        }
    }
}

impl PartialEq for Num {
    fn eq(&self, other: &Num) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Num {}

impl Ord for Num {
    fn cmp(&self, other: &Num) -> Ordering {
        match (self, other) {
            (Num::Small(a), Num::Small(b)) => a.cmp(b),
            (Num::Big(a), Num::Big(b)) => a.cmp(b),
            (Num::Small(a), Num::Big(b)) => Int::from(*a).cmp(b),
            (Num::Big(a), Num::Small(b)) => a.cmp(&Int::from(*b)),
        }
    }
}

impl PartialOrd for Num {
    fn partial_cmp(&self, other: &Num) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Num {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // a Big that fits a word must hash like the Small it equals
        match self {
            Num::Small(v) => v.hash(state),
            Num::Big(b) => match b.to_i64() {
                Some(v) => v.hash(state),
                None => b.hash(state),
            },
        }
    }
}

impl Shrink for Num {
    /// `Big` values that fit an `i64` come back down; everything else is left alone.
    fn shrink(self) -> Self {
        match self {
            Num::Big(b) => match b.to_i64() {
                Some(v) => Num::Small(v),
                None => Num::Big(b),
            },
            small => small,
        }
    }
}

impl From<i64> for Num {
    fn from(v: i64) -> Self {
        Num::Small(v)
    }
}

impl From<u64> for Num {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Num::Small(v),
            Err(_) => Num::Big(Int::from(v)),
        }
    }
}

impl From<Int> for Num {
    fn from(v: Int) -> Self {
        Num::Big(v)
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Small(v) => write!(f, "{v}"),
            Num::Big(b) => write!(f, "{b}"),
        }
    }
}

// arithmetic stays in i64 until it overflows, then promotes; results are never shrunk
// implicitly

impl Add for Num {
    type Output = Num;
    fn add(self, rhs: Num) -> Num {
        match (&self, &rhs) {
            (Num::Small(a), Num::Small(b)) => match a.checked_add(*b) {
                Some(v) => Num::Small(v),
                None => Num::Big(Int::from(*a) + *b),
            },
            _ => Num::Big(self.to_int() + rhs.to_int()),
        }
    }
}

impl<'a> AddAssign<&'a Num> for Num {
    fn add_assign(&mut self, rhs: &'a Num) {
        let lhs = std::mem::replace(self, Num::Small(0));
        *self = lhs + rhs.clone();
    }
}

impl Mul for Num {
    type Output = Num;
    fn mul(self, rhs: Num) -> Num {
        match (&self, &rhs) {
            (Num::Small(a), Num::Small(b)) => match a.checked_mul(*b) {
                Some(v) => Num::Small(v),
                None => Num::Big(Int::from(*a) * *b),
            },
            _ => Num::Big(self.to_int() * rhs.to_int()),
        }
    }
}

impl Zero for Num {
    fn zero() -> Self {
        Num::Small(0)
    }

    fn is_zero(&self) -> bool {
        match self {
            Num::Small(v) => *v == 0,
            Num::Big(b) => *b == 0,
        }
    }
}

impl One for Num {
    fn one() -> Self {
        Num::Small(1)
    }
}

/// A loosely shaped value: a number or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Num(Num),
    List(Vec<Value>),
}

impl Shrink for Value {
    /// Collapses single-element lists (recursively) and shrinks every number.
    fn shrink(self) -> Self {
        match self {
            Value::Num(n) => Value::Num(n.shrink()),
            Value::List(items) => match <[Value; 1]>::try_from(items) {
                Ok([only]) => only.shrink(),
                Err(items) => Value::List(items.into_iter().map(Shrink::shrink).collect()),
            },
        }
    }
}

impl From<Num> for Value {
    fn from(n: Num) -> Self {
        Value::Num(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Num(Num::Small(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_shrink() {
        assert!(matches!(Num::Big(Int::from(-42)).shrink(), Num::Small(-42)));
        assert!(matches!(Num::Big(Int::from(i64::MAX)).shrink(), Num::Small(i64::MAX)));
        let huge: Int = Int::from(i64::MAX) + 1;
        assert_eq!(Num::Big(huge.clone()).shrink(), Num::Big(huge));
        assert_eq!(Num::Small(3).shrink(), Num::Small(3));
    }

    #[test]
    fn test_num_promotes() {
        let a = Num::Small(i64::MAX);
        let sum = a.clone() + Num::Small(1);
        assert_eq!(sum, Num::Big(Int::from(i64::MAX) + 1));
        let prod = a * Num::Small(2);
        assert_eq!(prod.to_string(), "18446744073709551614");
        assert_eq!(Num::from(u64::MAX).to_string(), u64::MAX.to_string());
        // promotion is one-way until shrink is asked for
        let back = Num::Big(Int::from(5)) + Num::Small(1);
        assert!(matches!(back, Num::Big(_)));
        assert!(matches!(back.shrink(), Num::Small(6)));
    }

    #[test]
    fn test_num_compares_by_value() {
        use std::collections::HashSet;

        use itertools::Itertools;

        let six = Num::Big(Int::from(6));
        assert_eq!(six, Num::Small(6));
        assert!(Num::Small(3) > Num::Big(Int::from(-5)));
        assert!(Num::Big(Int::from(i64::MAX) + 1) > Num::Small(i64::MAX));

        let mixed = vec![Num::Big(Int::from(9)), Num::Small(-1), six.clone(), Num::Small(6)];
        let sorted = mixed.iter().cloned().sorted().collect_vec();
        assert_eq!(sorted.iter().map(ToString::to_string).join(","), "-1,6,6,9");
        let distinct: HashSet<Num> = mixed.into_iter().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn test_value_shrink() {
        let v = Value::from(vec![Value::from(vec![Value::Num(Num::Big(Int::from(9)))])]);
        assert_eq!(v.shrink(), Value::Num(Num::Small(9)));

        let v = Value::from(vec![Value::from(1), Value::from(vec![Value::from(2)])]);
        assert_eq!(v.shrink(), Value::from(vec![1i64, 2]));

        assert_eq!(Value::List(vec![]).shrink(), Value::List(vec![]));
    }
}
