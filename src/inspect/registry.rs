use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::inspect::{InspectError, Result};

/// Category every registration is grouped under.
pub const CATEGORY: &str = "rapidjson";

/// Node adapter selected for a matched type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
	/// The address holds a tagged value.
	Value,
	/// The address holds a view with a pointer to a tagged value.
	Wrapper,
}

impl Provider {
	/// Stable display name.
	pub fn name(self) -> &'static str {
		match self {
			Self::Value => "value",
			Self::Wrapper => "wrapper",
		}
	}
}

/// One row of the registration table.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
	/// Unqualified template name.
	pub type_name: &'static str,
	/// Pattern matched against fully qualified type names.
	pub pattern: &'static str,
	/// Adapter used for matches.
	pub provider: Provider,
}

/// Types routed to a node adapter.
pub const REGISTRATIONS: &[Registration] = &[
	Registration {
		type_name: "GenericValue",
		pattern: r"^rapidjson::GenericValue<.+>$",
		provider: Provider::Value,
	},
	Registration {
		type_name: "GenericDocument",
		pattern: r"^rapidjson::GenericDocument<.+>$",
		provider: Provider::Value,
	},
	Registration {
		type_name: "GenericArray",
		pattern: r"^rapidjson::GenericArray<.+>$",
		provider: Provider::Wrapper,
	},
	Registration {
		type_name: "GenericObject",
		pattern: r"^rapidjson::GenericObject<.+>$",
		provider: Provider::Wrapper,
	},
];

static PATTERNS: LazyLock<std::result::Result<Vec<Regex>, regex::Error>> =
	LazyLock::new(|| REGISTRATIONS.iter().map(|registration| Regex::new(registration.pattern)).collect());

/// Compiled patterns, index-aligned with [`REGISTRATIONS`]; built on first use.
pub fn compiled_patterns() -> Result<&'static [Regex]> {
	match &*PATTERNS {
		Ok(patterns) => Ok(patterns.as_slice()),
		Err(err) => Err(InspectError::Pattern(err.clone())),
	}
}

/// Find the registration a fully qualified type name routes to.
pub fn lookup(type_name: &str) -> Result<&'static Registration> {
	let type_name = type_name.trim();
	for (registration, pattern) in REGISTRATIONS.iter().zip(compiled_patterns()?) {
		if pattern.is_match(type_name) {
			trace!(type_name, provider = registration.provider.name(), "type matched");
			return Ok(registration);
		}
	}

	Err(InspectError::UnknownType {
		name: type_name.to_owned(),
	})
}
