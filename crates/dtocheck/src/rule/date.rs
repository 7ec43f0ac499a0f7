//! Reference-date layouts.
//!
//! A layout spells the reference moment `2006-01-02 15:04:05` in the shape
//! the input must take, e.g. `02/01/2006` for day-first dates. Layouts are
//! translated once into an anchored shape pattern, which fixes the digit
//! count of every token, and into chrono strftime syntax for the calendar
//! check.

use chrono::format::{Parsed, StrftimeItems, parse};
use regex::Regex;

/// Layout used when a `date` hint carries no layout of its own.
pub const DEFAULT_DATE_LAYOUT: &str = "2006-01-02";

/// Layout tokens with their strftime item and digit pattern, longest first
/// so `2006` wins over `2`.
const TOKENS: [(&str, &str, &str); 11] = [
    ("2006", "%Y", "[0-9]{4}"),
    ("01", "%m", "[0-9]{2}"),
    ("02", "%d", "[0-9]{2}"),
    ("06", "%y", "[0-9]{2}"),
    ("15", "%H", "[0-9]{2}"),
    ("04", "%M", "[0-9]{2}"),
    ("05", "%S", "[0-9]{2}"),
    ("1", "%m", "[0-9]{1,2}"),
    ("2", "%d", "[0-9]{1,2}"),
    ("4", "%M", "[0-9]{1,2}"),
    ("5", "%S", "[0-9]{1,2}"),
];

/// A compiled reference-date layout.
#[derive(Debug, Clone)]
pub struct DateLayout {
    layout: String,
    strftime: String,
    /// `None` when the layout is too large to compile; it then matches nothing.
    shape: Option<Regex>,
    full_date: bool,
}

impl DateLayout {
    /// Compiles a layout. Characters that are not layout tokens are literals.
    #[must_use]
    pub fn new(layout: impl Into<String>) -> Self {
        let layout = layout.into();
        let mut strftime = String::with_capacity(layout.len() * 2);
        let mut shape = String::from("^");
        let (mut year, mut month, mut day) = (false, false, false);

        let mut rest = layout.as_str();
        while let Some(c) = rest.chars().next() {
            let token = TOKENS.iter().find(|(t, _, _)| rest.starts_with(t));
            if let Some((token, item, digits)) = token {
                match *item {
                    "%Y" | "%y" => year = true,
                    "%m" => month = true,
                    "%d" => day = true,
                    _ => {}
                }
                strftime.push_str(item);
                shape.push_str(digits);
                rest = &rest[token.len()..];
            } else {
                if c == '%' {
                    strftime.push_str("%%");
                } else {
                    strftime.push(c);
                }
                shape.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                rest = &rest[c.len_utf8()..];
            }
        }

        shape.push('$');

        Self {
            shape: Regex::new(&shape).ok(),
            layout,
            strftime,
            full_date: year && month && day,
        }
    }

    /// The layout as written, used as the rule argument.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.layout
    }

    /// The equivalent chrono strftime pattern.
    #[must_use]
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// True when `input` has the layout's exact shape, parses under it and,
    /// for layouts naming a full date, denotes a real calendar day.
    ///
    /// Zero-padded tokens take exactly their digit count; signs and
    /// surrounding whitespace are rejected.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        if !self.shape.as_ref().is_some_and(|shape| shape.is_match(input)) {
            return false;
        }
        let mut parsed = Parsed::new();
        if parse(&mut parsed, input, StrftimeItems::new(&self.strftime)).is_err() {
            return false;
        }
        !self.full_date || parsed.to_naive_date().is_ok()
    }
}

impl PartialEq for DateLayout {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout
    }
}

impl Eq for DateLayout {}

impl Default for DateLayout {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_LAYOUT)
    }
}
