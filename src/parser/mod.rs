mod common;
mod csharp;

pub use common::{DeclaredType, FieldDeclaration, SourceParser};
pub use csharp::CSharpParser;
