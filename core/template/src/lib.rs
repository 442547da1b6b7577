pub mod parser;
pub mod functions;
pub mod engine;

pub use parser::{parse, TemplateSegment};
pub use functions::FunctionRegistry;
pub use engine::{TemplateContext, TemplateEngine};
