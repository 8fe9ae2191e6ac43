use crate::form::{CalculationOptions, DisplayAs};

/// Decimal places beyond this are clamped.
pub const MAX_DECIMAL_PLACES: u32 = 10;

pub fn round_to(value: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places.min(MAX_DECIMAL_PLACES) as i32);
    let rounded = (value * factor).round() / factor;
    // Normalise negative zero.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Renders a raw calculated value for display, using `,` as the thousands separator.
pub fn format(
    raw: f64,
    display_as: DisplayAs,
    decimal_places: u32,
    prefix: &str,
    suffix: &str,
) -> String {
    render(raw, display_as, decimal_places, prefix, suffix, ",")
}

/// Renders a raw calculated value using every display option of the field.
pub fn format_with(raw: f64, options: &CalculationOptions) -> String {
    render(
        raw,
        options.display_as,
        options.decimal_places,
        &options.prefix,
        &options.suffix,
        &options.thousands_separator,
    )
}

fn render(
    raw: f64,
    display_as: DisplayAs,
    decimal_places: u32,
    prefix: &str,
    suffix: &str,
    separator: &str,
) -> String {
    let places = decimal_places.min(MAX_DECIMAL_PLACES) as usize;
    let fixed = format!("{:.*}", places, round_to(raw, decimal_places));
    let body = match display_as {
        DisplayAs::Number => fixed,
        DisplayAs::Percentage => format!("{}%", fixed),
        DisplayAs::Currency => group_thousands(&fixed, separator),
    };
    format!("{}{}{}", prefix, body, suffix)
}

fn group_thousands(fixed: &str, separator: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::with_capacity(fixed.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(*digit);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Reduces a previously formatted display value back to a bare number.
pub fn parse_display(display: &str, options: &CalculationOptions) -> Option<f64> {
    let mut text = display.trim();
    if !options.prefix.is_empty() {
        text = text.strip_prefix(options.prefix.as_str()).unwrap_or(text);
    }
    if !options.suffix.is_empty() {
        text = text.strip_suffix(options.suffix.as_str()).unwrap_or(text);
    }
    let text = text.trim().trim_end_matches('%');
    let cleaned = if options.thousands_separator.is_empty() {
        text.to_string()
    } else {
        text.replace(options.thousands_separator.as_str(), "")
    };

    cleaned.trim().parse::<f64>().ok().or_else(|| {
        let digits: String = cleaned
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        digits.parse::<f64>().ok()
    })
    .filter(|n| n.is_finite())
}
