use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half a cent rounding away from zero.
pub fn round2(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum that clamps at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Monetary amount with exactly two fraction digits, e.g. `1234.50`.
pub fn format_amount(v: Decimal) -> String {
    format!("{:.2}", round2(v))
}

pub fn format_money(v: Decimal, currency_symbol: &str) -> String {
    format!("{}{}", currency_symbol, format_amount(v))
}

/// Percentage with one or two fraction digits: `3.5`, `3.0`, `2.45`.
pub fn format_percentage(p: Decimal) -> String {
    let s = format!("{:.2}", round2(p));
    match s.strip_suffix('0') {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}
