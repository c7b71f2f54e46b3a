//! Per-site layouts

pub mod kyou;
