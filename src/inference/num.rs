use serde_json::Number;

/// True when the number has no fractional part (`1`, `-3.0`, `1e3`).
///
/// serde_json keeps integer literals as `i64`/`u64` and everything else as
/// `f64`, so only the float case needs the truncation check.
pub fn is_integral(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    match n.as_f64() {
        Some(f) => f.is_finite() && f.trunc() == f,
        None => false,
    }
}
