pub mod backend;
pub mod convert;
pub mod document;
pub mod error;
pub mod export;
pub mod flatten;
pub mod literal;
pub mod normalize;
pub mod postprocess;
pub mod shape;
pub mod topology;

pub use convert::{ConversionRequest, ConvertConfig, Converter};
pub use document::ExportDocument;
pub use error::{ConvertError, ParseError};
pub use shape::{Imported, Shape, ShapeHandle, ShapeKind, ShapeSequence};
