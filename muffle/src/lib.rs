// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod config;
pub mod context;
pub mod grouping;
pub mod model;
pub mod modes;
pub mod parsers;
pub mod report;
pub mod severity;
