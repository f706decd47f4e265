//! Document model types for positioned page content.
//!
//! This module defines the representation that bridges PDF parsing and
//! conversion: pages holding unordered, geometrically positioned blocks.
//! Coordinates use a top-left origin, so a smaller `y0` is higher on the page.

mod block;
mod page;

pub use block::{BBox, Block, BlockContent, Line, Span};
pub use page::{Document, Page};
