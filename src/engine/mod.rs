//! The leveled logging engine the facade writes through.
//!
//! An [`Engine`] is a cheap, cloneable value: a shared [`Core`] plus the
//! fields bound to this particular branch. Binding fields builds a new
//! engine and leaves the original untouched.

mod cores;
mod encoder;

pub use cores::{Core, IoCore, TracingCore};
pub use encoder::{short_caller, Encoder, EncoderConfig, Entry, MapEncoder};

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use chrono::Local;

use crate::field::Field;
use crate::level::Level;

/// What a `Fatal` record does once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FatalHook {
    /// Exit the process with status 1.
    #[default]
    Exit,
    /// Panic instead, so tests can observe fatal records.
    Panic,
}

/// A core plus bound context.
#[derive(Clone)]
pub struct Engine {
    core: Arc<dyn Core>,
    fields: Arc<[Field]>,
    name: Option<Arc<str>>,
    add_caller: bool,
    fatal_hook: FatalHook,
}

impl Engine {
    pub fn new(core: Arc<dyn Core>) -> Self {
        Self {
            core,
            fields: Arc::from(Vec::new()),
            name: None,
            add_caller: false,
            fatal_hook: FatalHook::Exit,
        }
    }

    /// Annotate records with the call site.
    pub fn with_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    pub fn with_fatal_hook(mut self, hook: FatalHook) -> Self {
        self.fatal_hook = hook;
        self
    }

    /// A child engine whose name is appended to this one's with a dot.
    pub fn named(&self, name: &str) -> Self {
        let name: Arc<str> = match &self.name {
            Some(parent) if !name.is_empty() => format!("{parent}.{name}").into(),
            Some(parent) => parent.clone(),
            None => name.into(),
        };
        Self {
            name: Some(name),
            ..self.clone()
        }
    }

    /// A new engine with `fields` bound after the fields already bound here.
    pub fn with(&self, fields: Vec<Field>) -> Self {
        if fields.is_empty() {
            return self.clone();
        }

        let mut bound = Vec::with_capacity(self.fields.len() + fields.len());
        bound.extend_from_slice(&self.fields);
        bound.extend(fields);

        Self {
            fields: bound.into(),
            ..self.clone()
        }
    }

    /// Fields bound to this engine.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    /// Write a record attributed to the caller.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: Vec<Field>) {
        self.log_at(level, message, fields, Location::caller());
    }

    /// Write a record attributed to `caller`.
    ///
    /// Filtering happens here. `Panic` panics and `Fatal` runs the fatal hook
    /// after the record is written, even when the level is filtered out.
    pub fn log_at(
        &self,
        level: Level,
        message: &str,
        fields: Vec<Field>,
        caller: &'static Location<'static>,
    ) {
        if self.core.enabled(level) {
            let entry = Entry {
                level,
                time: Local::now(),
                logger_name: self.name.as_deref(),
                message,
                caller: self.add_caller.then_some(caller),
            };
            self.core.write(&entry, &self.fields, &fields);
        }

        match level {
            Level::Panic => panic!("{message}"),
            Level::Fatal => {
                self.core.sync();
                match self.fatal_hook {
                    FatalHook::Exit => std::process::exit(1),
                    FatalHook::Panic => panic!("fatal: {message}"),
                }
            }
            _ => {}
        }
    }

    /// Flush the core.
    pub fn sync(&self) {
        self.core.sync();
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("fields", &self.fields)
            .field("name", &self.name)
            .field("add_caller", &self.add_caller)
            .field("fatal_hook", &self.fatal_hook)
            .finish_non_exhaustive()
    }
}
