//! Display helpers used when rendering ledger data

use rust_decimal::{Decimal, RoundingStrategy};

/// Insert thousands separators into the integer part of a plain number string
pub fn format_number<T: ToString>(n: T, separator: &str) -> String {
    let s = n.to_string();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let mut result: String = grouped.chars().rev().collect();
    result.insert_str(0, sign);
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }
    result
}

/// Money formatting settings
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    pub symbol: String,
    pub symbol_before: bool,
    pub decimal_places: u32,
    pub thousands_separator: String,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "€".to_string(),
            symbol_before: true,
            decimal_places: 2,
            thousands_separator: String::new(),
        }
    }
}

impl MoneyFormat {
    /// Render `amount` with a fixed number of decimals and the currency symbol
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount
            .round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        let digits = format!("{:.*}", self.decimal_places as usize, rounded);
        let number = if self.thousands_separator.is_empty() {
            digits
        } else {
            format_number(digits, &self.thousands_separator)
        };

        if self.symbol_before {
            match number.strip_prefix('-') {
                Some(abs) => format!("-{}{}", self.symbol, abs),
                None => format!("{}{}", self.symbol, number),
            }
        } else {
            format!("{} {}", number, self.symbol)
        }
    }
}

/// `62.5` becomes `62.5%`; trailing zeros are dropped
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.normalize())
}

/// Pad or cut `text` to exactly `width` characters
pub fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{}{}", text, " ".repeat(width - count))
    } else if width == 0 {
        String::new()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}
