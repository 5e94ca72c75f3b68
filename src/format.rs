//! Currency formatting for presentation records.
//!
//! Every monetary value leaving the crate passes through [`CurrencyFormat::format`],
//! so two views of the same stored amount always render identically.

use serde::{Deserialize, Serialize};

/// How monetary amounts are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimals: u8,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    /// US dollars: `$1,234.50`.
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 2,
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl CurrencyFormat {
    /// Indonesian rupiah: `Rp15.000`.
    pub fn rupiah() -> Self {
        CurrencyFormat {
            symbol: "Rp".to_string(),
            decimals: 0,
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }

    /// Render `amount`. Non-finite amounts render as zero.
    pub fn format(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let fixed = format!("{:.*}", self.decimals as usize, amount.abs());

        let (whole, fraction) = match fixed.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut out = String::with_capacity(fixed.len() + self.symbol.len() + 4);
        // Rounding may have produced zero; never print "-$0.00"
        if amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push_str(&group_thousands(whole, self.thousands_separator));
        if let Some(fraction) = fraction {
            out.push(self.decimal_separator);
            out.push_str(fraction);
        }
        out
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// Format with the default (US dollar) format.
pub fn format_currency(amount: f64) -> String {
    CurrencyFormat::default().format(amount)
}
