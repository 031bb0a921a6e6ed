// Locale-aware formatting of numbers, currency amounts and dates for the admin screens.
// Chilean conventions (es-CL, CLP) are the default: "." groups thousands, "," separates decimals.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub const INVALID_DATE: &str = "Invalid Date";

/// Separators and names needed to render values for one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleFormat {
    pub tag: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub currency_symbol: String,
    pub month_names: [&'static str; 12],
}

impl LocaleFormat {
    pub fn es_cl() -> Self {
        Self {
            tag: "es-CL".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            currency_symbol: "$".to_string(),
            month_names: SPANISH_MONTHS,
        }
    }

    /// es-CL month names with custom separators, e.g. taken from user settings.
    pub fn with_separators(mut self, thousands: char, decimal: char) -> Self {
        self.thousands_separator = thousands;
        self.decimal_separator = decimal;
        self
    }
}

impl Default for LocaleFormat {
    fn default() -> Self {
        Self::es_cl()
    }
}

/// Number, currency and date formatting for a single locale.
#[derive(Debug, Clone, Default)]
pub struct Formatters {
    locale: LocaleFormat,
}

impl Formatters {
    pub fn new(locale: LocaleFormat) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> &LocaleFormat {
        &self.locale
    }

    /// Groups the integer part in thousands. The fractional digits are kept as the
    /// shortest representation of `value`.
    pub fn format_number(&self, value: f64) -> String {
        if let Some(special) = non_finite(value) {
            return special.to_string();
        }
        let digits = value.abs().to_string();
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits.as_str(), None),
        };
        self.assemble(value < 0.0, int_part, frac_part)
    }

    /// Formats a numeric string. Localized input (`1.234,5`, `1.234`) is read with the
    /// locale's separators; other plain input (`2500.75`) is read as a Rust float.
    /// Anything else comes back unchanged.
    pub fn format_numeric_str(&self, input: &str) -> String {
        let trimmed = input.trim();
        let localized = if self.is_localized(trimmed) {
            self.parse_decimal(trimmed)
        } else {
            None
        };
        let parsed = localized.or_else(|| trimmed.parse::<f64>().ok().filter(|v| v.is_finite()));
        match parsed {
            Some(value) => self.format_number(value),
            None => input.to_string(),
        }
    }

    /// Fixed number of decimals with locale separators, e.g. `1.234,50`.
    pub fn format_decimal(&self, value: f64, decimals: usize) -> String {
        if let Some(special) = non_finite(value) {
            return special.to_string();
        }
        let digits = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits.as_str(), None),
        };
        let is_zero = digits.bytes().all(|b| b == b'0' || b == b'.');
        self.assemble(value < 0.0 && !is_zero, int_part, frac_part)
    }

    pub fn format_percent(&self, value: f64, decimals: usize) -> String {
        format!("{}%", self.format_decimal(value, decimals))
    }

    /// Whole currency units, rounded half away from zero: `$1.234.567`, `-$1.234`.
    pub fn format_currency(&self, amount: f64) -> String {
        let symbol = &self.locale.currency_symbol;
        if let Some(special) = non_finite(amount) {
            return format!("{}{}", symbol, special);
        }
        let rounded = amount.round();
        let digits = format!("{:.0}", rounded.abs());
        let grouped = group_thousands(&digits, self.locale.thousands_separator);
        if rounded < 0.0 {
            format!("-{}{}", symbol, grouped)
        } else {
            format!("{}{}", symbol, grouped)
        }
    }

    /// Long date such as `15 de marzo de 2024`. Unparseable input yields `Invalid Date`.
    pub fn format_date(&self, input: &str) -> String {
        match parse_date_like(input) {
            Some(date) => {
                let month = self.locale.month_names[date.month0() as usize];
                format!("{} de {} de {}", date.day(), month, date.year())
            }
            None => INVALID_DATE.to_string(),
        }
    }

    /// Parses a localized decimal such as `1.234,56`.
    pub fn parse_decimal(&self, input: &str) -> Option<f64> {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| *c != self.locale.thousands_separator)
            .map(|c| if c == self.locale.decimal_separator { '.' } else { c })
            .collect();
        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// True when every thousands separator in `input` sits between well-formed groups of
    /// three digits, and at most one decimal separator follows them.
    fn is_localized(&self, input: &str) -> bool {
        let thousands = self.locale.thousands_separator;
        let decimal = self.locale.decimal_separator;
        let (int_part, frac_part) = match input.split_once(decimal) {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (input, None),
        };
        if frac_part.is_some_and(|f| f.contains(thousands) || f.contains(decimal)) {
            return false;
        }
        let int_part = int_part.trim_start_matches(['-', '+']);
        if !int_part.contains(thousands) {
            return true;
        }
        let mut groups = int_part.split(thousands);
        let first_ok = groups
            .next()
            .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
        first_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
    }

    fn assemble(&self, negative: bool, int_part: &str, frac_part: Option<&str>) -> String {
        let mut out = String::with_capacity(int_part.len() + 8);
        if negative {
            out.push('-');
        }
        out.push_str(&group_thousands(int_part, self.locale.thousands_separator));
        if let Some(frac) = frac_part.filter(|f| !f.is_empty()) {
            out.push(self.locale.decimal_separator);
            out.push_str(frac);
        }
        out
    }
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("∞")
    } else if value == f64::NEG_INFINITY {
        Some("-∞")
    } else {
        None
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

fn parse_date_like(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
}
