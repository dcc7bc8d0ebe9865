//! # ptdgen-render
//!
//! Output backends for ptdgen schedule grids.
//!
//! This crate provides:
//! - XLSX output of a `Grid` with merges, styles, column widths and frozen panes
//!
//! ## Example
//!
//! ```rust,ignore
//! use ptdgen_core::Renderer;
//! use ptdgen_render::ExcelGridRenderer;
//!
//! let renderer = ExcelGridRenderer::new();
//! let xlsx_bytes = renderer.render(&grid)?;
//! std::fs::write("schedule_grid.xlsx", xlsx_bytes)?;
//! ```

pub mod excel;

pub use excel::ExcelGridRenderer;
