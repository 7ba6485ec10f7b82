use std::path::PathBuf;

use rjview::inspect::{InspectError, Result, parse_address};

/// Render an address as fixed-width hex.
pub(crate) fn ptr_hex(value: u64) -> String {
	format!("0x{value:016x}")
}

/// Split an `ADDR=PATH` memory map argument.
pub(crate) fn parse_map_spec(spec: &str) -> Result<(u64, PathBuf)> {
	let invalid = || InspectError::InvalidMapSpec { spec: spec.to_owned() };
	let (addr, path) = spec.split_once('=').ok_or_else(invalid)?;
	if path.is_empty() {
		return Err(invalid());
	}
	let start = parse_address(addr).map_err(|_| invalid())?;
	Ok((start, PathBuf::from(path)))
}

/// Cut `text` to at most `max` characters, marking the cut.
pub(crate) fn truncate_text(text: &str, max: usize) -> String {
	if text.chars().count() <= max {
		return text.to_owned();
	}
	let mut out: String = text.chars().take(max).collect();
	out.push_str("...");
	out
}

/// Print a JSON payload on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encode failed: {err}"),
	}
}
