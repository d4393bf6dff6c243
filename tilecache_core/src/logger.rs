//! Injected logging handle for cache components.
//!
//! Components do not log through a module-level logger. Each one receives a
//! [`CacheLogger`] when it is constructed and writes its records through it. By default
//! a `CacheLogger` forwards to the global [`log`] logger under its own target; tests and
//! embedders can hand in any [`log::Log`] implementation instead.
//!
//! ```
//! use tilecache_core::CacheLogger;
//!
//! let logger = CacheLogger::new("tilecache::geopackage");
//! logger.debug(format_args!("opened {}", "cache.gpkg"));
//! assert_eq!(logger.target(), "tilecache::geopackage");
//! ```

use log::{Level, Log, Record};
use std::{
	fmt::{self, Debug},
	sync::Arc,
};

#[derive(Clone)]
enum Sink {
	Global,
	Custom(Arc<dyn Log>),
}

/// A cloneable logging handle with a fixed target.
#[derive(Clone)]
pub struct CacheLogger {
	sink: Sink,
	target: Arc<str>,
}

impl CacheLogger {
	/// Log through the global `log` logger under `target`.
	#[must_use]
	pub fn new(target: &str) -> CacheLogger {
		CacheLogger {
			sink: Sink::Global,
			target: Arc::from(target),
		}
	}

	/// Log through `sink` under `target`.
	#[must_use]
	pub fn with_sink(sink: Arc<dyn Log>, target: &str) -> CacheLogger {
		CacheLogger {
			sink: Sink::Custom(sink),
			target: Arc::from(target),
		}
	}

	/// A handle for a sub-component, sharing the sink and appending `name` to the target.
	#[must_use]
	pub fn child(&self, name: &str) -> CacheLogger {
		CacheLogger {
			sink: self.sink.clone(),
			target: Arc::from(format!("{}::{name}", self.target)),
		}
	}

	#[must_use]
	pub fn target(&self) -> &str {
		&self.target
	}

	pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
		match &self.sink {
			Sink::Global => {
				if level <= log::max_level() {
					emit(log::logger(), level, &self.target, args);
				}
			}
			Sink::Custom(sink) => emit(sink.as_ref(), level, &self.target, args),
		}
	}

	pub fn warn(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Warn, args);
	}

	pub fn debug(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Debug, args);
	}

	pub fn trace(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Trace, args);
	}
}

fn emit(sink: &dyn Log, level: Level, target: &str, args: fmt::Arguments<'_>) {
	let record = Record::builder().args(args).level(level).target(target).build();
	if sink.enabled(record.metadata()) {
		sink.log(&record);
	}
}

impl Default for CacheLogger {
	fn default() -> Self {
		CacheLogger::new("tilecache")
	}
}

impl Debug for CacheLogger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sink = match self.sink {
			Sink::Global => "global",
			Sink::Custom(_) => "custom",
		};
		f.debug_struct("CacheLogger")
			.field("target", &self.target)
			.field("sink", &sink)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use log::Metadata;
	use parking_lot::Mutex;

	#[derive(Default)]
	struct Collect(Mutex<Vec<String>>);

	impl Log for Collect {
		fn enabled(&self, metadata: &Metadata) -> bool {
			metadata.level() <= Level::Debug
		}

		fn log(&self, record: &Record) {
			self
				.0
				.lock()
				.push(format!("{} {}: {}", record.level(), record.target(), record.args()));
		}

		fn flush(&self) {}
	}

	#[test]
	fn custom_sink_receives_records() {
		let sink = Arc::new(Collect::default());
		let logger = CacheLogger::with_sink(sink.clone(), "cache");
		let child = logger.child("connection");

		logger.debug(format_args!("lookup {}", 1));
		child.warn(format_args!("still borrowed"));
		child.trace(format_args!("filtered out"));

		assert_eq!(
			*sink.0.lock(),
			vec!["DEBUG cache: lookup 1", "WARN cache::connection: still borrowed"]
		);
	}

	#[test]
	fn debug_format() {
		let logger = CacheLogger::default();
		assert_eq!(
			format!("{logger:?}"),
			"CacheLogger { target: \"tilecache\", sink: \"global\" }"
		);
	}
}
