pub mod ast;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod location;
pub mod script;
pub mod session;

pub use ast::{AstNode, AstNodeKind, Item, OperatorTable, Parser, SyntaxError, Token, TokenKind};
pub use config::{CompilerConfig, ConfigError};
pub use error::{Level, PosecErrorExt};
pub use ir::{Evaluated, IrModule, LoweringContext, LoweringError, Machine};
pub use layout::{RecordLayout, RecordRegistry};
pub use location::{Location, Span};
pub use script::Script;
pub use session::{CompilationContext, ItemOutcome, ItemReport, SessionReport};

pub fn generate_error_report(error: &dyn PosecErrorExt) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("POSEC | {} | {} | {}", level, location, message)
}

/// Compile a loaded script in a fresh session.
pub fn compile_script(script: &Script, config: CompilerConfig) -> (CompilationContext, SessionReport) {
    let mut session = CompilationContext::new(config);
    let report = session.compile_source(&script.name, &script.content);
    (session, report)
}
