// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Run-time variable vocabulary for `$(Name)` references.
//!
//! | Name        | Value                                   |
//! |-------------|-----------------------------------------|
//! | `Now`       | local date-time                         |
//! | `UtcNow`    | UTC date-time                           |
//! | `Today`     | local midnight of the current day       |
//! | `UtcToday`  | UTC midnight of the current day         |
//! | `Timestamp` | Unix time in seconds (`i64`)            |
//!
//! Names match case-insensitively.

use crate::value::Value;
use chrono::{Local, TimeZone, Utc};

/// Every variable name, canonical spelling.
pub const VARIABLES: [&str; 5] = ["Now", "UtcNow", "Today", "UtcToday", "Timestamp"];

/// Name inside a whole-string `$(Name)` reference.
pub fn parse_deferred(text: &str) -> Option<&str> {
    let name = text.strip_prefix("$(")?.strip_suffix(')')?;
    if name.is_empty() || name.contains(['(', ')']) {
        return None;
    }
    Some(name.trim())
}

/// Current value of a variable.
pub fn lookup(name: &str) -> Option<Value> {
    let canonical = VARIABLES
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))?;
    match *canonical {
        "Now" => Some(Value::DateTime(Local::now().fixed_offset())),
        "UtcNow" => Some(Value::DateTime(Utc::now().fixed_offset())),
        "Today" => {
            let midnight = Local::now().date_naive().and_hms_opt(0, 0, 0)?;
            let local = Local.from_local_datetime(&midnight).earliest()?;
            Some(Value::DateTime(local.fixed_offset()))
        }
        "UtcToday" => {
            let midnight = Utc::now().date_naive().and_hms_opt(0, 0, 0)?;
            Some(Value::DateTime(Utc.from_utc_datetime(&midnight).fixed_offset()))
        }
        "Timestamp" => Some(Value::I64(Utc::now().timestamp())),
        _ => None,
    }
}

/// Replace a whole-string `$(Name)` by the variable's current value.
///
/// Anything else, including references to unknown variables, is returned
/// unchanged.
pub fn expand_deferred(value: Value) -> Value {
    let resolved = match &value {
        Value::String(text) => parse_deferred(text).and_then(lookup),
        _ => None,
    };
    resolved.unwrap_or(value)
}
