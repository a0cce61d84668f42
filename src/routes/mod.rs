//! HTTP Routes
//!
//! `api` serves JSON under `/api`; `ui` serves HTML fragments for an
//! HTMX-driven page.

pub mod api;
pub mod ui;
