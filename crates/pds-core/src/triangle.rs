//! Natal triangle: eight base digits from DDMMYYYY, four foundation digits,
//! three core digits, and the composite codes read off them.

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::digits::reduce;

/// The seven foundation/core digits a renderer needs to draw the triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct TriangleParams {
    pub O: u8,
    pub M: u8,
    pub N: u8,
    pub I: u8,
    pub J: u8,
    pub K: u8,
    pub L: u8,
}

impl TriangleParams {
    /// M, N, I, J, K, L: the digits weighted 1 in the family radar.
    pub fn secondary(&self) -> [u8; 6] {
        [self.M, self.N, self.I, self.J, self.K, self.L]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleChart {
    /// A..H: day tens/ones, month tens/ones, year digits.
    pub base: [u8; 8],
    /// I, J, K, L.
    pub foundation: [u8; 4],
    /// M, N, O.
    pub core: [u8; 3],
    /// Digits 1..=9 absent from A..O, ascending.
    pub missing: Vec<u8>,
    pub anchor: String,
    pub inner: u8,
    pub thinking: String,
    pub subconscious: u8,
    pub peak: String,
    pub relationship: String,
}

impl TriangleChart {
    pub fn compute(date: Date) -> Self {
        let [e, f, g, h, c, d, a, b] = date.digits();

        let i = reduce(u64::from(a + b));
        let j = reduce(u64::from(c + d));
        let k = reduce(u64::from(e + f));
        let l = reduce(u64::from(g + h));

        let m = reduce(u64::from(i + j));
        let n = reduce(u64::from(k + l));
        let o = reduce(u64::from(m + n));

        let present = [a, b, c, d, e, f, g, h, i, j, k, l, m, n, o];
        let missing = (1..=9).filter(|x| !present.contains(x)).collect();

        Self {
            base: [a, b, c, d, e, f, g, h],
            foundation: [i, j, k, l],
            core: [m, n, o],
            missing,
            anchor: format!("{m}{n}{o}"),
            inner: reduce(u64::from(m + o)),
            thinking: format!("{i}{m}{o}"),
            subconscious: reduce(u64::from(i + l + o)),
            peak: format!("{j}{i}{n}"),
            relationship: format!("{k}{l}{n}"),
        }
    }

    pub fn params(&self) -> TriangleParams {
        let [i, j, k, l] = self.foundation;
        let [m, n, o] = self.core;
        TriangleParams {
            O: o,
            M: m,
            N: n,
            I: i,
            J: j,
            K: k,
            L: l,
        }
    }

    /// Missing digits as a comma-separated list, e.g. `"4,5,6,7,8"`.
    pub fn missing_display(&self) -> String {
        self.missing
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
