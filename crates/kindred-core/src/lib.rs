// SPDX-License-Identifier: AGPL-3.0-or-later
//! Kindred Core - Genealogy line-format ingestion and family tree layout
//!
//! This crate provides:
//! - A family graph model of people and unions
//! - A GEDCOM-style parser with reference linking, validation and
//!   structural recovery, plus a writer for the same format
//! - A deterministic layout engine assigning coordinates to people and unions
//! - C FFI exports for embedding front-ends

pub mod formats;
pub mod layout;
pub mod model;
pub mod traits;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use formats::GedcomHandler;
pub use layout::{compute_layout, Bounds, LayoutConfig, LayoutResult, Point};
pub use model::{
    DatePrecision, Diagnostic, DiagnosticKind, DiagnosticSink, FamilyGraph, Gender, ParseOutcome,
    Person, StructuredDate, Union,
};
pub use traits::{KindredError, ParseConfig, Parser, RenderConfig, Renderer, Result};
