//! HTTP request-line parsing and dispatch
//!
//! Only the first line of a request matters. Routes are recognized by
//! substring match, checked in priority order: `/update`, `/on`, `/off`;
//! everything else just gets the status page. Query parameters are
//! parsed one by one - a malformed value never spoils the rest.

use crate::config::Config;

/// One parsed control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// `/update` with whatever parameters survived parsing.
    Update(UpdateParams),
    /// `/on` - enable the display.
    On,
    /// `/off` - disable and immediately blank the display.
    Off,
    /// Anything else - render the status page, change nothing.
    Status,
}

/// Parsed `/update` parameters. A `None` field was absent or malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateParams {
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub tz: Option<i32>,
}

/// Side effects the caller must carry out after [`Request::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    /// Persist the whole record.
    pub persist: bool,
    /// Blank the display right now, ahead of the next loop tick.
    pub clear_display: bool,
}

/// Parse one request line.
pub fn parse(line: &str) -> Request {
    if line.contains("/update") {
        Request::Update(parse_update(line))
    } else if line.contains("/on") {
        Request::On
    } else if line.contains("/off") {
        Request::Off
    } else {
        Request::Status
    }
}

/// Extract `start`/`end`/`tz` from the query string. The last occurrence
/// of a key that parses as an integer wins; failures leave the field at
/// its previous value.
fn parse_update(line: &str) -> UpdateParams {
    let mut params = UpdateParams::default();
    let Some(q) = line.find('?') else {
        return params;
    };
    let query = &line[q + 1..];
    let query = &query[..query.find(' ').unwrap_or(query.len())];

    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("start=") {
            parse_into(&mut params.start, value);
        } else if let Some(value) = pair.strip_prefix("end=") {
            parse_into(&mut params.end, value);
        } else if let Some(value) = pair.strip_prefix("tz=") {
            parse_into(&mut params.tz, value);
        }
    }
    params
}

fn parse_into(slot: &mut Option<i32>, value: &str) {
    if let Ok(parsed) = value.parse::<i32>() {
        *slot = Some(parsed);
    }
}

impl Request {
    /// Apply this request to the configuration. Out-of-range values are
    /// rejected by the `Config` setters; the caller only sees the
    /// resulting effects.
    pub fn apply(self, config: &mut Config) -> Effects {
        match self {
            Request::Update(params) => {
                if let Some(value) = params.start {
                    config.set_start_hour(value);
                }
                if let Some(value) = params.end {
                    config.set_end_hour(value);
                }
                if let Some(value) = params.tz {
                    config.set_timezone(value);
                }
                Effects { persist: true, clear_display: false }
            }
            Request::On => {
                config.enabled = true;
                Effects { persist: true, clear_display: false }
            }
            Request::Off => {
                config.enabled = false;
                Effects { persist: true, clear_display: true }
            }
            Request::Status => Effects::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_priority() {
        assert_eq!(parse("GET /on HTTP/1.1"), Request::On);
        assert_eq!(parse("GET /off HTTP/1.1"), Request::Off);
        assert!(matches!(parse("GET /update?start=5 HTTP/1.1"), Request::Update(_)));
        // `/update` outranks an `/on` substring elsewhere in the line.
        assert!(matches!(parse("GET /update?next=/on HTTP/1.1"), Request::Update(_)));
        assert_eq!(parse("GET / HTTP/1.1"), Request::Status);
        assert_eq!(parse("GET /favicon.ico HTTP/1.1"), Request::Status);
        assert_eq!(parse(""), Request::Status);
    }

    #[test]
    fn update_parses_any_subset() {
        let Request::Update(p) = parse("GET /update?end=20 HTTP/1.1") else {
            panic!("not an update");
        };
        assert_eq!(p, UpdateParams { start: None, end: Some(20), tz: None });
    }

    #[test]
    fn update_last_occurrence_wins() {
        let Request::Update(p) = parse("GET /update?start=3&start=9 HTTP/1.1") else {
            panic!("not an update");
        };
        assert_eq!(p.start, Some(9));
    }

    #[test]
    fn bad_parameter_does_not_spoil_the_others() {
        let Request::Update(p) = parse("GET /update?start=abc&end=5 HTTP/1.1") else {
            panic!("not an update");
        };
        assert_eq!(p.start, None);
        assert_eq!(p.end, Some(5));

        let mut config = Config::default();
        let before = config.start_hour;
        let effects = Request::Update(p).apply(&mut config);
        assert_eq!(config.start_hour, before);
        assert_eq!(config.end_hour, 5);
        assert!(effects.persist);
    }

    #[test]
    fn update_without_query_changes_nothing() {
        let Request::Update(p) = parse("GET /update HTTP/1.1") else {
            panic!("not an update");
        };
        assert_eq!(p, UpdateParams::default());
    }

    #[test]
    fn query_stops_at_the_protocol_field() {
        let Request::Update(p) = parse("GET /update?tz=2 HTTP/1.1") else {
            panic!("not an update");
        };
        assert_eq!(p.tz, Some(2));
    }

    #[test]
    fn on_is_idempotent_and_persists_both_times() {
        let mut config = Config::default();
        config.enabled = false;

        let first = Request::On.apply(&mut config);
        let after_first = config.clone();
        let second = Request::On.apply(&mut config);

        assert!(config.enabled);
        assert_eq!(config, after_first);
        assert_eq!(first, second);
        assert!(first.persist && second.persist);
    }

    #[test]
    fn off_disables_and_requests_a_blank() {
        let mut config = Config::default();
        let effects = Request::Off.apply(&mut config);
        assert!(!config.enabled);
        assert!(effects.persist);
        assert!(effects.clear_display);
    }

    #[test]
    fn out_of_range_update_is_rejected_field_by_field() {
        let mut config = Config::default();
        let Request::Update(p) = parse("GET /update?start=24&end=23&tz=99 HTTP/1.1") else {
            panic!("not an update");
        };
        Request::Update(p).apply(&mut config);
        assert_eq!(config.start_hour, Config::default().start_hour);
        assert_eq!(config.end_hour, 23);
        assert_eq!(config.timezone, Config::default().timezone);
    }
}
