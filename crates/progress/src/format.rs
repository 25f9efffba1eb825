//! Number parsing and display formatting.
//!
//! Input may use either `1234.56` or `1.234,56` conventions: the last `.` or
//! `,` is the decimal separator and every other one is a thousands
//! separator. A trailing separator with no digits after it is ignored.

use kpiboard_core::{FormatConfig, ValidationError, ValueClass, CURRENCY_SYMBOLS};

/// Reduce a number string to canonical `-?digits(.digits)?` form.
///
/// Accepts surrounding whitespace, a leading sign, one of
/// [`CURRENCY_SYMBOLS`] as prefix and a trailing `%`. Anything else is
/// rejected with `None`.
pub fn canonicalize(input: &str) -> Option<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    // The sign may sit before or after the currency prefix, not both.
    let (outer_minus, rest) = strip_sign(&compact);
    let rest = strip_currency(rest);
    let (inner_minus, rest) = strip_sign(rest);
    if outer_minus && inner_minus {
        return None;
    }
    let negative = outer_minus || inner_minus;
    let rest = rest.strip_suffix('%').unwrap_or(rest);

    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let canon = match rest.rfind(['.', ',']) {
        Some(pos) => {
            let after = rest[pos + 1..].chars().filter(char::is_ascii_digit).count();
            if after == 0 {
                digits
            } else {
                let int_len = digits.len() - after;
                if int_len == 0 {
                    format!("0.{}", digits)
                } else {
                    format!("{}.{}", &digits[..int_len], &digits[int_len..])
                }
            }
        }
        None => digits,
    };

    Some(if negative { format!("-{}", canon) } else { canon })
}

/// Parse a number string with [`canonicalize`] rules.
pub fn parse_number(input: &str) -> Option<f64> {
    canonicalize(input)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// [`parse_number`] for entry fields: unparseable input is a
/// [`ValidationError::NotNumeric`] naming the field.
pub fn require_number(field: &str, input: &str) -> Result<f64, ValidationError> {
    parse_number(input).ok_or_else(|| ValidationError::NotNumeric {
        field: field.to_string(),
        value: input.to_string(),
    })
}

/// Plain grouped decimal, e.g. `1.234,56`.
///
/// Without decimal places digits are not grouped: `1.234` would read back
/// as a fraction.
pub fn format_number(value: f64, cfg: &FormatConfig) -> String {
    let fixed = format!("{:.*}", cfg.decimal_places, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && frac_part.is_some() && (int_part.len() - i) % 3 == 0 {
            grouped.push(cfg.thousands_separator);
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push(cfg.decimal_separator);
        grouped.push_str(frac);
    }

    // No "-0,00" after rounding.
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a numeric value for its class; `None` or non-finite gives the
/// placeholder.
pub fn format_amount(value: Option<f64>, class: ValueClass, cfg: &FormatConfig) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return cfg.placeholder.clone();
    };
    let number = format_number(value, cfg);
    match class {
        ValueClass::Monetary => match number.strip_prefix('-') {
            Some(abs) => format!("-{} {}", cfg.currency_symbol, abs),
            None => format!("{} {}", cfg.currency_symbol, number),
        },
        ValueClass::Percentage => format!("{}%", number),
        ValueClass::Numeric => number,
    }
}

/// Parse a raw string and format it for its class; unparseable input gives
/// the placeholder.
pub fn format_value(raw: &str, class: ValueClass, cfg: &FormatConfig) -> String {
    format_amount(parse_number(raw), class, cfg)
}

fn strip_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    }
}

fn strip_currency(s: &str) -> &str {
    CURRENCY_SYMBOLS
        .iter()
        .find_map(|symbol| s.strip_prefix(symbol))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> FormatConfig {
        FormatConfig::default()
    }

    #[test]
    fn test_last_separator_wins() {
        assert_eq!(canonicalize("1234.56").as_deref(), Some("1234.56"));
        assert_eq!(canonicalize("1.234,56").as_deref(), Some("1234.56"));
        assert_eq!(canonicalize("1,234.56").as_deref(), Some("1234.56"));
        assert_eq!(canonicalize("100,5").as_deref(), Some("100.5"));
        assert_eq!(canonicalize("1.234.567").as_deref(), Some("1234.567"));
        assert_eq!(canonicalize(",5").as_deref(), Some("0.5"));
        assert_eq!(canonicalize("12,").as_deref(), Some("12"));
        assert_eq!(canonicalize(" 1 234,5 ").as_deref(), Some("1234.5"));
    }

    #[test]
    fn test_sign_currency_and_percent() {
        assert_eq!(canonicalize("-3,5").as_deref(), Some("-3.5"));
        assert_eq!(canonicalize("R$ 1.234,56").as_deref(), Some("1234.56"));
        assert_eq!(canonicalize("-R$ 10,00").as_deref(), Some("-10.00"));
        assert_eq!(canonicalize("R$ -10,00").as_deref(), Some("-10.00"));
        assert_eq!(canonicalize("US$ 3.5").as_deref(), Some("3.5"));
        assert_eq!(canonicalize("€12").as_deref(), Some("12"));
        assert_eq!(canonicalize("15,00%").as_deref(), Some("15.00"));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(canonicalize(""), None);
        assert_eq!(canonicalize("abc"), None);
        assert_eq!(canonicalize("12abc"), None);
        assert_eq!(canonicalize(".,"), None);
        assert_eq!(canonicalize("1-2"), None);
        assert_eq!(canonicalize("abc12"), None);
        assert_eq!(canonicalize("x1.234,5"), None);
        assert_eq!(canonicalize("R$R$ 5"), None);
        assert_eq!(parse_number("BRL 10"), None);
        assert_eq!(format_value("n/a", ValueClass::Numeric, &cfg()), "—");
        assert_eq!(format_value("NA5", ValueClass::Numeric, &cfg()), "—");
    }

    #[test]
    fn test_require_number_names_the_field() {
        assert_eq!(require_number("value", "1.234,5"), Ok(1234.5));
        assert_eq!(
            require_number("value", "x12"),
            Err(ValidationError::NotNumeric {
                field: "value".to_string(),
                value: "x12".to_string(),
            })
        );
    }

    #[test]
    fn test_format_by_class() {
        assert_eq!(format_value("1234.5", ValueClass::Numeric, &cfg()), "1.234,50");
        assert_eq!(format_value("1.234,56", ValueClass::Monetary, &cfg()), "R$ 1.234,56");
        assert_eq!(format_value("15", ValueClass::Percentage, &cfg()), "15,00%");
        assert_eq!(format_value("1234567,891", ValueClass::Numeric, &cfg()), "1.234.567,89");
        assert_eq!(format_amount(Some(-1500.0), ValueClass::Monetary, &cfg()), "-R$ 1.500,00");
        assert_eq!(format_amount(Some(-0.001), ValueClass::Numeric, &cfg()), "0,00");
        assert_eq!(format_amount(None, ValueClass::Numeric, &cfg()), "—");
        assert_eq!(format_amount(Some(f64::INFINITY), ValueClass::Numeric, &cfg()), "—");
    }

    #[test]
    fn test_format_with_other_locale() {
        let us = FormatConfig {
            decimal_places: 1,
            currency_symbol: "$".to_string(),
            thousands_separator: ',',
            decimal_separator: '.',
            placeholder: "-".to_string(),
        };
        assert_eq!(format_amount(Some(98765.43), ValueClass::Monetary, &us), "$ 98,765.4");
        assert_eq!(format_amount(Some(999.0), ValueClass::Numeric, &us), "999.0");
    }

    #[test]
    fn test_format_then_parse_keeps_value() {
        let configs = [
            cfg(),
            FormatConfig { decimal_places: 0, ..cfg() },
            FormatConfig { decimal_places: 1, ..cfg() },
            FormatConfig { decimal_places: 4, ..cfg() },
            FormatConfig {
                thousands_separator: ',',
                decimal_separator: '.',
                currency_symbol: "$".to_string(),
                ..cfg()
            },
            FormatConfig {
                decimal_places: 0,
                thousands_separator: ',',
                decimal_separator: '.',
                ..cfg()
            },
            FormatConfig { thousands_separator: ' ', currency_symbol: "€".to_string(), ..cfg() },
        ];
        for fc in &configs {
            assert!(fc.validate().is_ok());
            let half_unit = 0.5 * 10f64.powi(-(fc.decimal_places as i32)) + 1e-9;
            for class in [ValueClass::Numeric, ValueClass::Monetary, ValueClass::Percentage] {
                for raw in ["0", "0.5", "12.34", "1234", "1234.56", "-987654.32", "1000000"] {
                    let value: f64 = raw.parse().unwrap();
                    let shown = format_value(raw, class, fc);
                    let back = parse_number(&shown).unwrap();
                    assert!((back - value).abs() <= half_unit, "{fc:?}: {raw} -> {shown} -> {back}");
                }
            }
        }
    }

    #[test]
    fn test_no_grouping_without_decimals() {
        let whole = FormatConfig { decimal_places: 0, ..cfg() };
        assert_eq!(format_amount(Some(1234.0), ValueClass::Numeric, &whole), "1234");
        assert_eq!(parse_number(&format_amount(Some(1234.0), ValueClass::Numeric, &whole)), Some(1234.0));
        assert_eq!(format_amount(Some(1234567.4), ValueClass::Monetary, &whole), "R$ 1234567");
    }
}
