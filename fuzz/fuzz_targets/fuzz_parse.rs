// SPDX-License-Identifier: AGPL-3.0-or-later
#![no_main]

use kindred_core::{compute_layout, GedcomHandler, LayoutConfig, ParseConfig, Parser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let outcome = GedcomHandler::new().parse(&input, &ParseConfig::default());
    let _ = compute_layout(&outcome.graph, &LayoutConfig::default());
});
