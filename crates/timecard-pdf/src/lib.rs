//! PDF structure analysis and regeneration
//!
//! The analyzer recovers a table layout (columns, font, row pitch) from an
//! existing report; the writer produces a new document from records laid out
//! on that model.

pub mod analyzer;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod rtl;
pub mod writer;

pub use analyzer::{analyze_fragments, analyze_pdf, ColumnSpec, StructureModel};
pub use error::PdfError;
pub use geometry::{first_page_fragments, fragments_to_lines, TextFragment};
pub use writer::{render, write_records};
