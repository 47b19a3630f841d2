//! Process-wide logger: `env_logger` behind the `log` facade.
//!
//! Lines look like
//! `2024-01-01T00:00:00.000Z INFO  hello_service::api::users Users retrieved count=3`.
//! Structured fields come from the record's key/values.

use chrono::{SecondsFormat, Utc};
use log::kv::{self, Key, Source, Value, VisitSource};
use std::fmt::Write as _;
use std::io::Write as _;

/// Installs the logger. `RUST_LOG` sets the filter, `info` by default.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {} {}{}",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                record.level(),
                record.target(),
                record.args(),
                render_fields(record.key_values()),
            )
        })
        .init();
}

/// Renders key/values as ` key=value` pairs. Values containing whitespace
/// are quoted.
pub fn render_fields(source: &dyn Source) -> String {
    let mut fields = FieldWriter(String::new());
    if source.visit(&mut fields).is_err() {
        fields.0.push_str(" fields=<unrenderable>");
    }
    fields.0
}

struct FieldWriter(String);

impl<'kvs> VisitSource<'kvs> for FieldWriter {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        let rendered = value.to_string();
        let written = if rendered.contains(char::is_whitespace) {
            write!(self.0, " {}={:?}", key, rendered)
        } else {
            write!(self.0, " {}={}", key, rendered)
        };
        written.map_err(|_| kv::Error::msg("failed to render log field"))
    }
}
