use crate::inspect::flags::*;

#[test]
fn closed_table_classifies_to_documented_kinds() {
	let table = [
		(NULL_FLAG, Kind::Null),
		(FALSE_FLAG, Kind::False),
		(TRUE_FLAG, Kind::True),
		(ARRAY_FLAG, Kind::Array),
		(OBJECT_FLAG, Kind::Object),
		(CONST_STRING_FLAG, Kind::String),
		(COPY_STRING_FLAG, Kind::String),
		(SHORT_STRING_FLAG, Kind::ShortString),
		(NUMBER_INT_FLAG, Kind::NumberInt64),
		(NUMBER_TYPE | NUMBER | INT, Kind::NumberInt),
		(NUMBER_TYPE | NUMBER | UINT, Kind::NumberUint),
		(NUMBER_UINT_FLAG, Kind::NumberUint64),
		(NUMBER_INT64_FLAG, Kind::NumberInt64),
		(NUMBER_UINT64_FLAG, Kind::NumberUint64),
		(NUMBER_DOUBLE_FLAG, Kind::NumberDouble),
	];

	for (flags, expected) in table {
		assert_eq!(classify(flags), expected, "flags=0x{flags:04x}");
		assert_eq!(classify(flags), classify(flags), "classification must be stable");
	}
}

#[test]
fn composite_flag_values_match_rapidjson_abi() {
	assert_eq!(TRUE_FLAG, 0x000A);
	assert_eq!(FALSE_FLAG, 0x0009);
	assert_eq!(NUMBER_INT_FLAG, 0x00B6);
	assert_eq!(NUMBER_UINT_FLAG, 0x01D6);
	assert_eq!(NUMBER_DOUBLE_FLAG, 0x0216);
	assert_eq!(CONST_STRING_FLAG, 0x0405);
	assert_eq!(COPY_STRING_FLAG, 0x0C05);
	assert_eq!(SHORT_STRING_FLAG, 0x1C05);
}

#[test]
fn numeric_precedence_is_double_uint64_int64_uint_int() {
	assert_eq!(classify(NUMBER_TYPE | NUMBER | DOUBLE | UINT64), Kind::NumberDouble);
	assert_eq!(classify(NUMBER_ANY_FLAG), Kind::NumberDouble);
	assert_eq!(classify(NUMBER_TYPE | NUMBER | UINT64 | INT64 | UINT | INT), Kind::NumberUint64);
	assert_eq!(classify(NUMBER_TYPE | NUMBER | INT64 | UINT | INT), Kind::NumberInt64);
	assert_eq!(classify(NUMBER_TYPE | NUMBER | UINT | INT), Kind::NumberUint);
}

#[test]
fn unknown_combinations_are_unrecognized() {
	for flags in [
		0x0007,
		ARRAY_FLAG | BOOL,
		OBJECT_FLAG | COPY,
		NULL_TYPE | NUMBER,
		NUMBER_TYPE,
		NUMBER_TYPE | NUMBER,
		NUMBER_TYPE | INT,
		STRING_TYPE,
		STRING_TYPE | STRING | DOUBLE,
		NUMBER_DOUBLE_FLAG | 0x4000,
		0xFFFF,
	] {
		assert_eq!(classify(flags), Kind::Unrecognized(flags), "flags=0x{flags:04x}");
	}
}

#[test]
fn kind_helpers_partition_the_vocabulary() {
	assert!(Kind::ShortString.is_string());
	assert!(Kind::String.is_string());
	assert!(Kind::NumberDouble.is_number());
	assert!(!Kind::True.is_number());
	assert!(Kind::Object.is_container());
	assert!(!Kind::Unrecognized(7).is_container());
	assert_eq!(Kind::NumberUint64.name(), "uint64");
}
