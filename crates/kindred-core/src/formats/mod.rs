// SPDX-License-Identifier: AGPL-3.0-or-later
//! Format handlers

pub mod gedcom;

pub use gedcom::GedcomHandler;
