//! JSON and console record encoders.

use std::fmt;
use std::panic::Location;

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use crate::field::{Field, ObjectEncoder, ObjectMarshaler};
use crate::level::Level;

/// ISO8601 with milliseconds and numeric offset.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Everything about a record except its fields.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub level: Level,
    pub time: DateTime<Local>,
    pub logger_name: Option<&'a str>,
    pub message: &'a str,
    pub caller: Option<&'static Location<'static>>,
}

/// Key names and level style of an encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub time_key: &'static str,
    pub level_key: &'static str,
    pub name_key: &'static str,
    pub caller_key: &'static str,
    pub message_key: &'static str,
    pub line_ending: &'static str,
    /// Wrap console levels in ANSI colors.
    pub color_level: bool,
}

impl EncoderConfig {
    /// Keys used for file output. Existing log consumers depend on these names.
    pub fn production() -> Self {
        Self {
            time_key: "ts",
            level_key: "level",
            name_key: "logger",
            caller_key: "caller",
            message_key: "msg",
            line_ending: "\n",
            color_level: false,
        }
    }

    /// Keys used for console output.
    pub fn console() -> Self {
        Self {
            time_key: "time",
            level_key: "level",
            name_key: "logger",
            caller_key: "caller",
            message_key: "message",
            line_ending: "\n",
            color_level: true,
        }
    }
}

/// Record encoder.
#[derive(Debug, Clone)]
pub enum Encoder {
    /// One JSON object per line.
    Json(EncoderConfig),
    /// Tab-separated columns, extra fields as trailing JSON, text stacks on following lines.
    Console(EncoderConfig),
}

impl Encoder {
    pub fn json() -> Self {
        Encoder::Json(EncoderConfig::production())
    }

    pub fn console() -> Self {
        Encoder::Console(EncoderConfig::console())
    }

    /// Encode one record, bound fields first. Later duplicates overwrite earlier values.
    pub fn encode(&self, entry: &Entry<'_>, bound: &[Field], fields: &[Field]) -> Vec<u8> {
        match self {
            Encoder::Json(cfg) => encode_json(cfg, entry, bound, fields),
            Encoder::Console(cfg) => encode_console(cfg, entry, bound, fields),
        }
    }
}

fn encode_json(cfg: &EncoderConfig, entry: &Entry<'_>, bound: &[Field], fields: &[Field]) -> Vec<u8> {
    let mut map = Map::new();
    map.insert(
        cfg.time_key.to_string(),
        Value::String(entry.time.format(TIME_FORMAT).to_string()),
    );
    map.insert(cfg.level_key.to_string(), Value::String(entry.level.as_str().to_string()));
    if let Some(name) = entry.logger_name {
        map.insert(cfg.name_key.to_string(), Value::String(name.to_string()));
    }
    if let Some(caller) = entry.caller {
        map.insert(cfg.caller_key.to_string(), Value::String(short_caller(caller)));
    }
    map.insert(cfg.message_key.to_string(), Value::String(entry.message.to_string()));

    let mut enc = MapEncoder::from_map(map);
    for field in bound.iter().chain(fields) {
        field.encode(&mut enc);
    }

    let mut line = serde_json::to_vec(&enc.into_map()).unwrap_or_default();
    line.extend_from_slice(cfg.line_ending.as_bytes());
    line
}

fn encode_console(
    cfg: &EncoderConfig,
    entry: &Entry<'_>,
    bound: &[Field],
    fields: &[Field],
) -> Vec<u8> {
    let mut columns = vec![entry.time.format(TIME_FORMAT).to_string()];

    if cfg.color_level {
        columns.push(format!(
            "\x1b[{}m{}\x1b[0m",
            entry.level.color(),
            entry.level.capital_str()
        ));
    } else {
        columns.push(entry.level.capital_str().to_string());
    }
    if let Some(name) = entry.logger_name {
        columns.push(name.to_string());
    }
    if let Some(caller) = entry.caller {
        columns.push(short_caller(caller));
    }
    columns.push(entry.message.to_string());

    let mut enc = MapEncoder::detaching();
    for field in bound.iter().chain(fields) {
        field.encode(&mut enc);
    }
    let stacktrace = enc.stacktrace.take();
    let context = enc.into_map();
    if !context.is_empty() {
        columns.push(serde_json::to_string(&context).unwrap_or_default());
    }

    let mut line = columns.join("\t");
    line.push_str(cfg.line_ending);
    if let Some(stack) = stacktrace {
        line.push_str(&stack);
        line.push_str(cfg.line_ending);
    }
    line.into_bytes()
}

/// `dir/file.rs:line`, the last two path components of the call site.
pub fn short_caller(location: &Location<'_>) -> String {
    let file = location.file();
    let is_sep = |c: char| c == '/' || c == '\\';
    let short = match file.rfind(is_sep) {
        Some(last) => match file[..last].rfind(is_sep) {
            Some(prev) => &file[prev + 1..],
            None => file,
        },
        None => file,
    };
    format!("{}:{}", short, location.line())
}

/// Encoder that collects fields into an ordered JSON map.
#[derive(Debug, Default)]
pub struct MapEncoder {
    map: Map<String, Value>,
    detach_stacktrace: bool,
    stacktrace: Option<String>,
}

impl MapEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            map,
            ..Self::default()
        }
    }

    /// Text stacktraces are held aside instead of becoming fields.
    fn detaching() -> Self {
        Self {
            detach_stacktrace: true,
            ..Self::default()
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.map
    }
}

impl ObjectEncoder for MapEncoder {
    fn add_string(&mut self, key: &str, value: &str) {
        self.map.insert(key.to_string(), Value::String(value.to_string()));
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.map.insert(key.to_string(), Value::from(value));
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.map.insert(key.to_string(), Value::from(value));
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        // Non-finite floats have no JSON form and become null
        self.map.insert(key.to_string(), Value::from(value));
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.map.insert(key.to_string(), Value::Bool(value));
    }

    fn add_json(&mut self, key: &str, value: &Value) {
        self.map.insert(key.to_string(), value.clone());
    }

    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) {
        let mut child = MapEncoder::new();
        value.marshal_log_object(&mut child);
        self.map.insert(key.to_string(), Value::Object(child.map));
    }

    fn add_stacktrace(&mut self, key: &str, value: &dyn fmt::Display) {
        if self.detach_stacktrace {
            self.stacktrace = Some(value.to_string());
        } else {
            self.add_string(key, &value.to_string());
        }
    }
}
