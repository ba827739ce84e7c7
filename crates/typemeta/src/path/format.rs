// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integer format specifiers.
//!
//! A specifier is one letter with an optional precision (`N2`, `D6`, `X4`):
//!
//! - `D`: decimal, zero-padded to the precision
//! - `N`: thousands separators, precision decimals (default 2)
//! - `F`: fixed point, precision decimals (default 2)
//! - `X` / `x`: hexadecimal, zero-padded to the precision
//! - `G`: plain decimal
//!
//! Anything else is not a recognised specifier.

/// Render an integer with a specifier; `None` for an unknown specifier.
pub fn format_integer(value: i128, spec: &str) -> Option<String> {
    let mut chars = spec.chars();
    let letter = chars.next()?;
    let digits = chars.as_str();
    let precision = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<usize>().ok()?)
    };

    match letter {
        'D' | 'd' => Some(with_sign(value, |abs| {
            format!("{:0width$}", abs, width = precision.unwrap_or(0))
        })),
        'N' | 'n' => Some(with_sign(value, |abs| {
            decimals(group_thousands(&abs.to_string()), precision.unwrap_or(2))
        })),
        'F' | 'f' => Some(with_sign(value, |abs| {
            decimals(abs.to_string(), precision.unwrap_or(2))
        })),
        'X' | 'x' => {
            let bits = hex_bits(value)?;
            let width = precision.unwrap_or(0);
            Some(if letter == 'X' {
                format!("{:0width$X}", bits, width = width)
            } else {
                format!("{:0width$x}", bits, width = width)
            })
        }
        'G' | 'g' => Some(value.to_string()),
        _ => None,
    }
}

fn with_sign(value: i128, render: impl FnOnce(u128) -> String) -> String {
    let body = render(value.unsigned_abs());
    if value < 0 {
        format!("-{}", body)
    } else {
        body
    }
}

fn decimals(mut integral: String, places: usize) -> String {
    if places > 0 {
        integral.push('.');
        integral.push_str(&"0".repeat(places));
    }
    integral
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Two's complement bits; negative values use the 64-bit representation.
fn hex_bits(value: i128) -> Option<u128> {
    if value >= 0 {
        u128::try_from(value).ok()
    } else {
        i64::try_from(value).ok().map(|v| u128::from(v as u64))
    }
}
