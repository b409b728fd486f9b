//! Linear-arithmetic reification helpers shared by [`crate::constraints`]
//! and [`crate::objective`].
//!
//! `selen`'s own example usage (see `other_examples/…selen…` in the
//! reference pack) only exercises `m.sum(..)` and comparisons of a
//! `VarId` against an `int(n)` literal, with `n: i32`. Every hard
//! constraint and objective term in this crate that needs a reified
//! boolean (`y ≡ a ∧ b`, `y ≡ Σ ≥ k`) or a deviation pair (`pos`/`neg`
//! from a target) needs genuine linear combinations — `a + b - y`,
//! `s - k*y`, and so on — over bounds and targets that are naturally
//! `i64` in this crate's domain model. We assume `selen::Model`'s
//! constraint expressions support the standard `+`, `-`, and scalar `*`
//! operators over `VarId`, and that both `Model::int` and the `int(..)`
//! literal helper are generic over `i64` the way the rest of this
//! ecosystem's numeric-domain crates are, even though the one retrieved
//! `selen` usage sample only ever passed `i32`. This is the single
//! place that assumption is exercised; see `DESIGN.md`.

use selen::prelude::*;

/// Upper bound used for otherwise-unbounded non-negative auxiliary
/// variables (deviation and shortfall terms).
pub const LARGE: i64 = 1_000_000;

/// `y ≡ a ∧ b`, encoded as `y ≤ a`, `y ≤ b`, `a + b - y ≤ 1`.
pub fn reify_and(m: &mut Model, a: VarId, b: VarId) -> VarId {
    let y = m.int(0, 1);
    m.c(y).le(a);
    m.c(y).le(b);
    m.c(a + b - y).le(int(1));
    y
}

/// `y ≡ Σ terms ≥ k`, for `terms` all boolean, via the standard
/// big-M linearization `s - k*y ≥ 0` and `s - n*y ≤ k - 1`, where
/// `n = terms.len()`.
pub fn reify_at_least(m: &mut Model, terms: &[VarId], k: i64) -> VarId {
    if terms.is_empty() {
        return m.int(if k <= 0 { 1 } else { 0 }, if k <= 0 { 1 } else { 0 });
    }
    let y = m.int(0, 1);
    let s = m.sum(terms);
    let n = terms.len() as i64;
    m.c(s - y * n).le(int(k - 1));
    m.c(s - y * k).ge(int(0));
    y
}

/// Non-negative `pos`/`neg` deviation of `value` from a fixed target:
/// `pos ≥ value − target`, `neg ≥ target − value`.
pub fn deviation_pair(m: &mut Model, value: VarId, target: i64) -> (VarId, VarId) {
    let pos = m.int(0, LARGE);
    let neg = m.int(0, LARGE);
    m.c(pos - value).ge(int(-target));
    m.c(neg + value).ge(int(target));
    (pos, neg)
}

/// Non-negative `pos`/`neg` deviation between two variable quantities:
/// `pos ≥ a − b`, `neg ≥ b − a`.
pub fn deviation_pair_vars(m: &mut Model, a: VarId, b: VarId) -> (VarId, VarId) {
    let pos = m.int(0, LARGE);
    let neg = m.int(0, LARGE);
    m.c(pos - a + b).ge(int(0));
    m.c(neg - b + a).ge(int(0));
    (pos, neg)
}
