//! Cell-related types
//!
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] / [`CellRange`] - A1-style locations
//! - [`CellData`] / [`CellStorage`] - Value plus style, and the sparse grid holding them

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange};
pub use storage::{CellData, CellStorage};
pub use value::CellValue;
