//! edfin_report - School District Finance Report Generator
//!
//! A batch pipeline over a delimited export of U.S. public school district
//! per-pupil finance records: load -> clean -> analyze -> render. Produces a
//! single HTML report embedding two grouped bar charts (year-over-year change
//! and within-state funding equity) plus a narrative summary.

pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
