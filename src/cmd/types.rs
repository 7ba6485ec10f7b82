use rjview::inspect::{CATEGORY, Provider, REGISTRATIONS, Registration, Result, lookup};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// Report which registration a fully qualified type name routes to.
	#[arg(long = "match")]
	pub type_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List the registration table or route one type name through it.
pub fn run(args: Args) -> Result<()> {
	let Args { type_name, json } = args;

	if let Some(type_name) = type_name {
		let registration = lookup(&type_name)?;
		if json {
			emit_json(&MatchJson {
				type_name,
				category: CATEGORY,
				registration: row(registration),
			});
		} else {
			println!("{} {}", registration.type_name, registration.provider.name());
		}
		return Ok(());
	}

	if json {
		emit_json(&TableJson {
			category: CATEGORY,
			registrations: REGISTRATIONS.iter().map(row).collect(),
		});
		return Ok(());
	}

	println!("category: {CATEGORY}");
	for registration in REGISTRATIONS {
		println!(
			"{:<16} {:<8} {}",
			registration.type_name,
			registration.provider.name(),
			registration.pattern
		);
	}
	Ok(())
}

fn row(registration: &Registration) -> RegistrationJson {
	RegistrationJson {
		type_name: registration.type_name,
		pattern: registration.pattern,
		provider: registration.provider,
	}
}

#[derive(serde::Serialize)]
struct RegistrationJson {
	type_name: &'static str,
	pattern: &'static str,
	provider: Provider,
}

#[derive(serde::Serialize)]
struct TableJson {
	category: &'static str,
	registrations: Vec<RegistrationJson>,
}

#[derive(serde::Serialize)]
struct MatchJson {
	#[serde(rename = "type")]
	type_name: String,
	category: &'static str,
	registration: RegistrationJson,
}
