//! Digit reduction: the arithmetic every other module is built on.

use serde::{Deserialize, Serialize};

use crate::constants::MASTER_NUMBERS;

/// A reduced number together with the chain that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reduction {
    /// Traditional notation, e.g. `"3811/2"`.
    pub path: String,
    /// The single digit at the end of the chain.
    pub value: u8,
}

/// Sum of the decimal digits of `n`.
pub fn digit_sum(mut n: u64) -> u64 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

/// Sum digits until a single digit remains. 0 stays 0.
pub fn reduce(n: u64) -> u8 {
    reduce_with(n, false)
}

/// Like [`reduce`], but optionally stops at a master number (11, 22, 33).
pub fn reduce_with(mut n: u64, keep_master: bool) -> u8 {
    while n > 9 {
        if keep_master && MASTER_NUMBERS.contains(&n) {
            break;
        }
        n = digit_sum(n);
    }
    // n <= 33 here
    n as u8
}

/// Traditional reduction notation: every intermediate sum concatenated,
/// then `/` and the final digit. Single digits render as themselves.
pub fn tradition_path(n: u64) -> String {
    let mut chain = vec![n.to_string()];
    let mut curr = n;
    while curr > 9 {
        curr = digit_sum(curr);
        chain.push(curr.to_string());
    }
    match chain.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}/{last}", rest.concat()),
        _ => n.to_string(),
    }
}

pub fn reduction(n: u64) -> Reduction {
    Reduction {
        path: tradition_path(n),
        value: reduce(n),
    }
}
