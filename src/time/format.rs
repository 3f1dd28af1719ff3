//! Human readable date format shorthand
//!
//! Lets users write `YYYY/MM/DD` instead of `%Y/%m/%d` for the directory
//! layout.

use std::path::MAIN_SEPARATOR;

/// Tokens recognised in a shorthand format, longest first
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"), // 2017
    ("YY", "%y"),   // 17
    ("MM", "%m"),   // 12
    ("M", "%B"),    // December
    ("m", "%b"),    // Dec
    ("DDD", "%j"),  // day of year
    ("DD", "%d"),   // 25
];

/// Convert a shorthand date format into a strftime template.
///
/// Both `/` and `\` become the platform path separator. Anything else is
/// copied through unchanged.
pub fn parse_date_format(shorthand: &str) -> String {
    let mut out = String::with_capacity(shorthand.len() * 2);
    let mut rest = shorthand;

    'outer: while let Some(c) = rest.chars().next() {
        if c == '/' || c == '\\' {
            out.push(MAIN_SEPARATOR);
            rest = &rest[c.len_utf8()..];
            continue;
        }
        for (token, replacement) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sep(s: &str) -> String {
        s.replace('/', &MAIN_SEPARATOR.to_string())
    }

    #[test]
    fn test_common_layouts() {
        assert_eq!(parse_date_format("YYYY/MM/DD"), sep("%Y/%m/%d"));
        assert_eq!(parse_date_format("YYYY\\MM"), sep("%Y/%m"));
        assert_eq!(parse_date_format("YYYY-MM"), "%Y-%m");
        assert_eq!(parse_date_format("YY m"), "%y %b");
        assert_eq!(parse_date_format("YYYY M DDD"), "%Y %B %j");
    }

    #[test]
    fn test_output_is_valid_strftime() {
        use std::fmt::Write;

        let format = parse_date_format("YYYY YY m MM M DDD DD \\ /");
        let now = chrono::Local::now().naive_local();
        let mut rendered = String::new();
        assert!(write!(rendered, "{}", now.format(&format)).is_ok());
    }

    #[test]
    fn test_literals_pass_through() {
        assert_eq!(parse_date_format("photos_YYYY"), "photos_%Y");
        assert_eq!(parse_date_format(""), "");
    }
}
