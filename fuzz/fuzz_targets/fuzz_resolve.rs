// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use dirsort::categories::{CategoryTable, OTHER, SCHOOL};
use dirsort::metadata::Provenance;
use dirsort::provenance::decode_where_froms;

#[derive(Arbitrary, Debug)]
struct Input {
    extension: String,
    source: Option<String>,
    school: String,
    payload: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let _ = decode_where_froms(&input.payload);

    let table = CategoryTable::default();
    let provenance = Provenance::from_source(input.source, &input.school);
    let school = provenance == Provenance::School;
    let decision = table.resolve_parts(&input.extension, &provenance);

    assert!(!decision.category.is_empty());
    if school {
        assert_eq!(decision.category, SCHOOL);
    } else {
        assert!(decision.category == OTHER || table.labels().contains(&decision.category.as_str()));
    }
});
