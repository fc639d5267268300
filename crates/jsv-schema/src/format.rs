//! # Format Registry
//!
//! Maps `format` names to checks. Each format declares the instance kinds
//! it applies to; for any other kind the format accepts the instance
//! unchecked.
//!
//! ## Default Formats
//!
//! | name | check |
//! |------|-------|
//! | `date-time` | RFC 3339 timestamp (`chrono`) |
//! | `date` | `YYYY-MM-DD` (`chrono`) |
//! | `time` | `HH:MM:SS[.frac]` (`chrono`) |
//! | `email` | `local@domain` with a hostname domain |
//! | `hostname` | RFC 1123 labels, 255 characters max |
//! | `ipv4` | dotted quad (`std::net`) |
//! | `ipv6` | (`std::net`) |
//! | `uri` | absolute URI (`url`) |
//! | `regex` | compiles with `regex` |
//! | `uuid` | hyphenated UUID (`uuid`) |

use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;

use jsv_core::{NodeType, Report};

use crate::context::{ValidationContext, ValidationResult};
use crate::validator::{KeywordValidator, Validator};

/// A format check on the instance value. `Err` carries the reason.
pub type FormatCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
struct FormatEntry {
    kinds: Vec<NodeType>,
    check: FormatCheck,
}

/// Named format checks.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    entries: HashMap<String, FormatEntry>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FormatRegistry").field("formats", &names).finish()
    }
}

impl FormatRegistry {
    /// An empty registry: every format is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for instances of `kinds`, replacing any existing
    /// entry.
    pub fn register<F>(&mut self, name: impl Into<String>, kinds: &[NodeType], check: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.entries.insert(
            name.into(),
            FormatEntry {
                kinds: kinds.to_vec(),
                check: Arc::new(check),
            },
        );
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The validator for `name` against `instance`: `None` for an unknown
    /// format, `AlwaysTrue` when the format does not apply to the
    /// instance's kind.
    pub fn format_validator_for(&self, name: &str, instance: &Value) -> Option<Validator> {
        let entry = self.entries.get(name)?;
        if !entry.kinds.contains(&NodeType::of(instance)) {
            return Some(Validator::AlwaysTrue);
        }
        Some(Validator::Single(Arc::new(FormatValidator {
            name: name.to_string(),
            check: Arc::clone(&entry.check),
        })))
    }

    /// The draft-04 formats plus `date`, `time`, `regex` and `uuid`.
    pub fn draft4() -> Self {
        let strings = [NodeType::String];
        let mut r = Self::new();
        r.register("date-time", &strings, string_check(check_date_time));
        r.register("date", &strings, string_check(check_date));
        r.register("time", &strings, string_check(check_time));
        r.register("email", &strings, string_check(check_email));
        r.register("hostname", &strings, string_check(check_hostname));
        r.register("ipv4", &strings, string_check(check_ipv4));
        r.register("ipv6", &strings, string_check(check_ipv6));
        r.register("uri", &strings, string_check(check_uri));
        r.register("regex", &strings, string_check(check_regex));
        r.register("uuid", &strings, string_check(check_uuid));
        r
    }
}

struct FormatValidator {
    name: String,
    check: FormatCheck,
}

impl fmt::Debug for FormatValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatValidator").field("name", &self.name).finish()
    }
}

impl KeywordValidator for FormatValidator {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        match (self.check)(instance) {
            Ok(()) => Ok(Report::success()),
            Err(reason) => ctx.fail("format", format!("{instance} is not a valid {}: {reason}", self.name)),
        }
    }
}

fn string_check(
    check: fn(&str) -> Result<(), String>,
) -> impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static {
    move |value| match value {
        Value::String(s) => check(s),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn check_date_time(s: &str) -> Result<(), String> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn check_date(s: &str) -> Result<(), String> {
    if s.len() != 10 {
        return Err("expected YYYY-MM-DD".to_string());
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn check_time(s: &str) -> Result<(), String> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn hostname_label() -> Option<&'static Regex> {
    static LABEL: OnceLock<Option<Regex>> = OnceLock::new();
    LABEL
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").ok())
        .as_ref()
}

fn check_hostname(s: &str) -> Result<(), String> {
    if s.is_empty() || s.len() > 255 {
        return Err("hostname must be 1 to 255 characters".to_string());
    }
    let host = s.strip_suffix('.').unwrap_or(s);
    let valid = |label: &str| hostname_label().is_some_and(|re| re.is_match(label));
    match host.split('.').find(|&label| !valid(label)) {
        Some(label) => Err(format!("invalid label '{label}'")),
        None => Ok(()),
    }
}

fn check_email(s: &str) -> Result<(), String> {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return Err("missing '@'".to_string());
    };
    if local.is_empty() || local.len() > 64 || local.chars().any(char::is_whitespace) {
        return Err("invalid local part".to_string());
    }
    check_hostname(domain).map_err(|reason| format!("invalid domain: {reason}"))
}

fn check_ipv4(s: &str) -> Result<(), String> {
    s.parse::<Ipv4Addr>().map(|_| ()).map_err(|e| e.to_string())
}

fn check_ipv6(s: &str) -> Result<(), String> {
    s.parse::<Ipv6Addr>().map(|_| ()).map_err(|e| e.to_string())
}

fn check_uri(s: &str) -> Result<(), String> {
    url::Url::parse(s).map(|_| ()).map_err(|e| e.to_string())
}

fn check_regex(s: &str) -> Result<(), String> {
    Regex::new(s).map(|_| ()).map_err(|e| e.to_string())
}

fn check_uuid(s: &str) -> Result<(), String> {
    if s.len() != 36 {
        return Err("expected the hyphenated 8-4-4-4-12 form".to_string());
    }
    uuid::Uuid::parse_str(s).map(|_| ()).map_err(|e| e.to_string())
}
