use lazy_static::lazy_static;
use regex::Regex;

// log_format ui_short '$remote_addr  $remote_user $http_x_real_ip [$time_local] "$request" '
//                     '$status $body_bytes_sent "$http_referer" '
//                     '"$http_user_agent" "$http_x_forwarded_for" "$http_X_REQUEST_ID" "$http_X_RB_USER" '
//                     '$request_time';
lazy_static! {
    static ref LINE_PATTERN: Regex = Regex::new(concat!(
        r"(?P<remote_addr>\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})\s",
        r"(?P<remote_user>\w+)?[\s-]",
        r"(?P<http_x_real_ip>.+?)",
        r"\[(?P<time_local>\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})\]\s+",
        r#""(?P<method>\S{3,10}) (?P<request>\S+) HTTP/1\.\d" "#,
        r"(?P<status>\d{3}) (?P<body_bytes_sent>\d+) ",
        r#""(?P<http_referer>[-|\S]+)?" "#,
        r#""(?P<http_user_agent>.+)" "#,
        r#""(?P<http_x_forwarded_for>.+)" "#,
        r#""(?P<http_x_request_id>.+)" "#,
        r#""(?P<http_x_rb_user>.+)" "#,
        r"(?P<request_time>\d+\.\d+)",
    ))
    .unwrap();
}

/// Result of parsing one access log line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Record { url: String, duration: f64 },
    Unparsable,
}

impl ParsedLine {
    #[cfg(test)]
    pub(crate) fn is_unparsable(&self) -> bool {
        matches!(self, ParsedLine::Unparsable)
    }
}

/// Extracts the request path and request time from `ui_short` log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct LineParser;

impl LineParser {
    /// Parse a line, never failing: anything off-grammar is `Unparsable`
    pub fn parse(&self, line: &str) -> ParsedLine {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(captures) = LINE_PATTERN.captures(line) else {
            return ParsedLine::Unparsable;
        };

        match captures["request_time"].parse::<f64>() {
            Ok(duration) if duration.is_finite() && duration >= 0.0 => ParsedLine::Record {
                url: captures["request"].to_string(),
                duration,
            },
            _ => ParsedLine::Unparsable,
        }
    }
}
