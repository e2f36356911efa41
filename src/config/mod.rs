//! Run configuration: what to extract and how to scale it.
//!
//! Everything here is resolved once at startup from the command line. The
//! decoder only ever sees the validated form.

pub mod files;
pub mod unit;

pub use files::{DEFAULT_LOG_FILE, ROTATED_LOG_GLOB, default_log_files};
pub use unit::Unit;

use regex::Regex;
use std::collections::HashSet;

/// Filters and scaling applied while decoding log lines.
#[derive(Debug, Clone)]
pub struct Filters {
    /// Anchored at the start of the timestamp.
    pub timestamp: Option<Regex>,
    pub cgroups: Option<HashSet<String>>,
    pub params: Option<HashSet<String>>,
    pub divisor: u64,
}

impl Default for Filters {
    fn default() -> Self {
        Self::new(None, None, None, Unit::default())
    }
}

impl Filters {
    pub fn new(
        timestamp: Option<Regex>,
        cgroups: Option<HashSet<String>>,
        params: Option<HashSet<String>>,
        unit: Unit,
    ) -> Self {
        Self {
            timestamp,
            cgroups,
            params,
            divisor: unit.divisor(),
        }
    }

    pub fn accepts_timestamp(&self, timestamp: &str) -> bool {
        self.timestamp
            .as_ref()
            .is_none_or(|re| re.is_match(timestamp))
    }

    pub fn accepts_cgroup(&self, cgroup: &str) -> bool {
        allowed(self.cgroups.as_ref(), cgroup)
    }

    pub fn accepts_param(&self, param: &str) -> bool {
        allowed(self.params.as_ref(), param)
    }
}

fn allowed(list: Option<&HashSet<String>>, name: &str) -> bool {
    match list {
        Some(names) if !names.is_empty() => names.contains(name),
        _ => true,
    }
}

/// Compile a user supplied timestamp pattern so that it only matches at the
/// beginning of the timestamp.
///
/// The pattern must be valid on its own before it is wrapped; otherwise
/// unbalanced groups could close the anchoring group early.
pub fn compile_timestamp_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(pattern)?;
    Regex::new(&format!("^(?:{})", pattern))
}

/// Split a comma separated allow-list. An empty argument means "no filter".
pub fn parse_name_list(arg: &str) -> Option<HashSet<String>> {
    if arg.is_empty() {
        return None;
    }
    Some(arg.split(',').map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_pattern_is_prefix_anchored() {
        let re = compile_timestamp_pattern("2020-10-01").unwrap();
        assert!(re.is_match("2020-10-01T10:00:00.000000+02:00"));
        assert!(!re.is_match("x2020-10-01T10:00:00"));
    }

    #[test]
    fn alternation_stays_anchored() {
        let re = compile_timestamp_pattern("2020-10-01|2020-10-02").unwrap();
        assert!(re.is_match("2020-10-02T00:00:00"));
        assert!(!re.is_match("1999 2020-10-02"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(compile_timestamp_pattern("2020-(10").is_err());
    }

    #[test]
    fn unbalanced_groups_cannot_close_the_anchor() {
        assert!(compile_timestamp_pattern(")(").is_err());
        assert!(compile_timestamp_pattern("2020)|(10:00").is_err());
    }

    #[test]
    fn empty_allow_list_accepts_everything() {
        let filters = Filters {
            cgroups: Some(HashSet::new()),
            ..Filters::default()
        };
        assert!(filters.accepts_cgroup("hana"));
        assert!(filters.accepts_param("memory.current"));
        assert!(filters.accepts_timestamp("anything"));
    }

    #[test]
    fn allow_list_restricts_names() {
        let filters = Filters::new(
            None,
            parse_name_list("hana.slice,sapstart"),
            None,
            Unit::B,
        );
        assert!(filters.accepts_cgroup("sapstart"));
        assert!(!filters.accepts_cgroup("user.slice"));
        assert_eq!(filters.divisor, 1);
    }

    #[test]
    fn name_list_parsing() {
        assert_eq!(parse_name_list(""), None);
        let names = parse_name_list("a,b,a").unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("a") && names.contains("b"));
    }
}
