//! pt-BR currency display: `R$ 1.234,56`.

/// Format an amount as BRL with `.` thousands and `,` decimals.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    // No sign for values that round to zero
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}
