//! Number formatting and parsing
//!
//! `Number::toString` and `StringToNumber` are pure functions over `f64`/`str`; the
//! realm-aware conversions in `conversion` build on them.

/// `Number::toString(x)` with radix 10
///
/// Uses the shortest digit string that round-trips (Rust's `{:e}` formatting gives
/// exactly that) and lays it out by the language's exponent rules.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    let (digits, exponent) = shortest_digits(n);
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        let mut s = digits;
        s.extend(std::iter::repeat_n('0', (point - k) as usize));
        return s;
    }
    if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        return format!("{}.{}", int_part, frac_part);
    }
    if -6 < point && point <= 0 {
        let zeros = "0".repeat((-point) as usize);
        return format!("0.{}{}", zeros, digits);
    }

    let exp = point - 1;
    let sign = if exp < 0 { '-' } else { '+' };
    let mut chars = digits.chars();
    let first = chars.next().unwrap_or('0');
    let rest: String = chars.collect();
    if rest.is_empty() {
        format!("{}e{}{}", first, sign, exp.abs())
    } else {
        format!("{}.{}e{}{}", first, rest, sign, exp.abs())
    }
}

/// Decimal digits (no leading/trailing zeros) and the exponent of the first digit
fn shortest_digits(n: f64) -> (String, i32) {
    let formatted = format!("{:e}", n);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    (digits.to_string(), exponent)
}

/// `Number.prototype.toString(radix)` for radix other than 10
pub fn number_to_string_radix(n: f64, radix: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if radix == 10 || !n.is_finite() {
        return number_to_string(n);
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let negative = n < 0.0;
    let n = n.abs();
    let mut int_part = n.trunc();
    let mut frac_part = n - int_part;
    let radix_f = radix as f64;

    let mut int_digits = Vec::new();
    if int_part == 0.0 {
        int_digits.push(b'0');
    }
    while int_part >= 1.0 {
        let digit = (int_part % radix_f) as usize;
        int_digits.push(DIGITS.get(digit).copied().unwrap_or(b'0'));
        int_part = (int_part / radix_f).trunc();
    }
    int_digits.reverse();

    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.extend(int_digits.iter().map(|b| *b as char));

    if frac_part > 0.0 {
        result.push('.');
        // 52 bits of mantissa never need more than this many digits in radix 2
        let mut remaining = 52;
        while frac_part > 0.0 && remaining > 0 {
            frac_part *= radix_f;
            let digit = frac_part.trunc() as usize;
            result.push(DIGITS.get(digit).map_or('0', |b| *b as char));
            frac_part -= frac_part.trunc();
            remaining -= 1;
        }
    }
    result
}

fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{000A}'
            | '\u{000D}'
            | '\u{2028}'
            | '\u{2029}'
    ) || (c.is_whitespace() && !c.is_ascii())
}

/// Trim whitespace and line terminators the way `StringToNumber` and `parseInt` do
pub fn trim_js_whitespace(s: &str) -> &str {
    s.trim_matches(is_js_whitespace)
}

/// `StringToNumber`
///
/// Accepts the StringNumericLiteral grammar: optional whitespace, then either an
/// empty string (0), `0x`/`0o`/`0b` integer literals (unsigned), or a signed decimal
/// literal including `Infinity`. Anything else is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let s = trim_js_whitespace(s);
    if s.is_empty() {
        return 0.0;
    }

    let bytes = s.as_bytes();
    if bytes.len() > 2 && bytes.first() == Some(&b'0') {
        let radix = match bytes.get(1) {
            Some(b'x' | b'X') => Some(16),
            Some(b'o' | b'O') => Some(8),
            Some(b'b' | b'B') => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix_digits(s.get(2..).unwrap_or(""), radix).unwrap_or(f64::NAN);
        }
    }

    let (sign, unsigned) = match bytes.first() {
        Some(b'-') => (-1.0, s.get(1..).unwrap_or("")),
        Some(b'+') => (1.0, s.get(1..).unwrap_or("")),
        _ => (1.0, s),
    };

    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_str_decimal_literal(unsigned) {
        return f64::NAN;
    }
    unsigned.parse::<f64>().map_or(f64::NAN, |n| sign * n)
}

/// Every character must be a digit of `radix`; an empty digit string is rejected
fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut value = 0.0f64;
    for c in digits.chars() {
        let digit = c.to_digit(radix)?;
        value = value * radix as f64 + digit as f64;
    }
    Some(value)
}

/// StrUnsignedDecimalLiteral: `digits[.digits][e±digits]` or `.digits[e±digits]`
fn is_str_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut int_digits = 0;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
        int_digits += 1;
    }
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
            frac_digits += 1;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let mut exp_digits = 0;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
            exp_digits += 1;
        }
        if exp_digits == 0 {
            return false;
        }
    }
    i == bytes.len()
}

/// `parseInt(string, radix)` once both arguments are converted
pub fn parse_int(input: &str, radix: i32) -> f64 {
    let s = trim_js_whitespace(input);

    let (sign, mut s) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, s.get(1..).unwrap_or("")),
        Some(b'+') => (1.0, s.get(1..).unwrap_or("")),
        _ => (1.0, s),
    };

    let mut radix = radix;
    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return f64::NAN;
        }
        if radix != 16 {
            strip_prefix = false;
        }
    } else {
        radix = 10;
    }
    if strip_prefix {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }

    let end = s
        .char_indices()
        .find(|(_, c)| c.to_digit(radix as u32).is_none())
        .map_or(s.len(), |(i, _)| i);
    let digits = s.get(..end).unwrap_or("");
    if digits.is_empty() {
        return f64::NAN;
    }
    if radix == 10 {
        // Decimal keeps full precision through the float parser
        return digits.parse::<f64>().map_or(f64::NAN, |n| sign * n);
    }
    parse_radix_digits(digits, radix as u32).map_or(f64::NAN, |n| sign * n)
}

/// `parseFloat(string)` once the argument is converted
pub fn parse_float(input: &str) -> f64 {
    let s = trim_js_whitespace(input);
    let (sign, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, s.get(1..).unwrap_or("")),
        Some(b'+') => (1.0, s.get(1..).unwrap_or("")),
        _ => (1.0, s),
    };
    if unsigned.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    // Longest prefix that is a StrDecimalLiteral
    let bytes = unsigned.as_bytes();
    let mut best = None;
    let mut i = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'0'..=b'9' => {
                seen_digit = true;
                best = Some(i + 1);
            }
            b'.' if !seen_dot => seen_dot = true,
            b'e' | b'E' if seen_digit => {
                let mut j = i + 1;
                if matches!(bytes.get(j), Some(b'+' | b'-')) {
                    j += 1;
                }
                let start = j;
                while bytes.get(j).is_some_and(u8::is_ascii_digit) {
                    j += 1;
                }
                if j > start {
                    best = Some(j);
                }
                break;
            }
            _ => break,
        }
        i += 1;
    }

    match best.and_then(|end| unsigned.get(..end)) {
        Some(prefix) => prefix.parse::<f64>().map_or(f64::NAN, |n| sign * n),
        None => f64::NAN,
    }
}
