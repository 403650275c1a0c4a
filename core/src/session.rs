//! file: core/src/session.rs
//! description: top-level compilation driver.
//!
//! `CompilationContext` owns everything one compilation session needs: the
//! operator table, the record layouts, the prototype symbol table and the IR
//! module. It walks a token stream item by item (`def`, `extern`, or a bare
//! expression), lowers each into the module and reports one outcome per item.
//! A failing item is reported and skipped; later items still compile.

use log::{debug, info, warn};

use crate::ast::{ANON_EXPR_NAME, Item, OperatorTable, Parser, Token, TokenKind, tokenize};
use crate::config::CompilerConfig;
use crate::error::PosecErrorExt;
use crate::ir::exec::{Evaluated, Machine};
use crate::ir::lower::{self, LoweringContext};
use crate::ir::module::{IrFunction, IrModule};
use crate::layout::RecordRegistry;

#[derive(Debug, Clone)]
pub enum ItemOutcome {
    /// An `extern` was declared.
    Declared { name: String },
    /// A `def` was lowered and committed.
    Defined { name: String },
    /// A top-level expression was lowered and run.
    Evaluated { value: Evaluated },
    /// A top-level expression was lowered but not run.
    Lowered { function: IrFunction },
}

impl std::fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemOutcome::Declared { name } => write!(f, "declared {}", name),
            ItemOutcome::Defined { name } => write!(f, "defined {}", name),
            ItemOutcome::Evaluated { value } => write!(f, "evaluated to {}", value),
            ItemOutcome::Lowered { function } => write!(f, "lowered ({} blocks)", function.blocks.len()),
        }
    }
}

#[derive(Debug)]
pub struct ItemReport {
    pub index: usize,
    /// Short description of the item, e.g. `def f(a b)`.
    pub summary: String,
    /// The parsed item; `None` when parsing failed.
    pub item: Option<Item>,
    pub result: Result<ItemOutcome, Box<dyn PosecErrorExt>>,
}

impl ItemReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct SessionReport {
    pub items: Vec<ItemReport>,
    /// Text written by `printd`/`putchard` during evaluation.
    pub output: String,
}

impl SessionReport {
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|r| !r.is_ok())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Values of evaluated top-level expressions, in source order.
    pub fn values(&self) -> Vec<&Evaluated> {
        self.items
            .iter()
            .filter_map(|r| match &r.result {
                Ok(ItemOutcome::Evaluated { value }) => Some(value),
                _ => None,
            })
            .collect()
    }
}

pub struct CompilationContext {
    config: CompilerConfig,
    operators: OperatorTable,
    records: RecordRegistry,
    ctx: LoweringContext,
    module: IrModule,
}

impl CompilationContext {
    pub fn new(config: CompilerConfig) -> Self {
        let operators = config.operator_table();
        let records = config.record_registry();
        let module = IrModule::new(records.clone());
        CompilationContext { config, operators, records, ctx: LoweringContext::new(), module }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    pub fn context(&self) -> &LoweringContext {
        &self.ctx
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Lex `source` and compile every item in it.
    pub fn compile_source(&mut self, name: &str, source: &str) -> SessionReport {
        let tokens = tokenize(name, source);
        self.compile_tokens(&tokens)
    }

    pub fn compile_tokens(&mut self, tokens: &[Token]) -> SessionReport {
        let mut report = SessionReport::default();
        let mut parser = Parser::new(tokens, &self.operators, &self.records);

        loop {
            while parser.current().is_operator(';') {
                parser.advance();
            }
            if parser.is_at_end() {
                break;
            }

            let index = report.items.len();
            let start = parser.position();
            let summary = summarize(parser.current());

            let item = match parser.parse_item() {
                Ok(item) => item,
                Err(e) => {
                    warn!("item {} ({}): {}", index, summary, e);
                    if parser.position() == start {
                        parser.advance();
                    }
                    while !parser.is_at_end()
                        && !parser.check(TokenKind::Def)
                        && !parser.check(TokenKind::Extern)
                        && !parser.current().is_operator(';')
                    {
                        parser.advance();
                    }
                    report.items.push(ItemReport {
                        index,
                        summary,
                        item: None,
                        result: Err(Box::new(e) as Box<dyn PosecErrorExt>),
                    });
                    continue;
                }
            };
            debug!("parsed item {}: {}", index, item);

            let result = lower_item(&item, &self.config, &mut self.ctx, &mut self.module, &mut report.output);
            if let Err(e) = &result {
                warn!("item {} ({}): {}", index, summary, e);
            }
            let summary = match &item {
                Item::Definition(func) => format!("def {}", func.proto),
                Item::Extern(proto) => format!("extern {}", proto),
                Item::Expression(func) => func.body.to_string(),
            };
            report.items.push(ItemReport { index, summary, item: Some(item), result });
        }

        info!(
            "compiled {} item(s), {} failed, module holds {} function(s)",
            report.items.len(),
            report.failures().count(),
            self.module.len()
        );
        report
    }
}

fn summarize(token: &Token) -> String {
    match token.kind {
        TokenKind::Def => "def".to_string(),
        TokenKind::Extern => "extern".to_string(),
        _ => format!("expression at {}", token),
    }
}

fn lower_item(
    item: &Item,
    config: &CompilerConfig,
    ctx: &mut LoweringContext,
    module: &mut IrModule,
    output: &mut String,
) -> Result<ItemOutcome, Box<dyn PosecErrorExt>> {
    match item {
        Item::Extern(proto) => {
            let sig = lower::lower_prototype(proto, ctx, module).map_err(|e| Box::new(e) as Box<dyn PosecErrorExt>)?;
            Ok(ItemOutcome::Declared { name: sig.name })
        }
        Item::Definition(func) => {
            let function = lower::lower_function(func, ctx, module).map_err(|e| Box::new(e) as Box<dyn PosecErrorExt>)?;
            Ok(ItemOutcome::Defined { name: function.name().to_string() })
        }
        Item::Expression(func) => {
            let function = lower::lower_function(func, ctx, module)
                .map_err(|e| Box::new(e) as Box<dyn PosecErrorExt>)?
                .clone();

            let outcome = if config.evaluate_top_level {
                let mut machine = Machine::new(module, config.max_steps);
                let value = machine.evaluate(ANON_EXPR_NAME, &[]);
                output.push_str(machine.output());
                value.map(|value| ItemOutcome::Evaluated { value })
            } else {
                Ok(ItemOutcome::Lowered { function })
            };

            module.remove_function(ANON_EXPR_NAME);
            ctx.forget_prototype(ANON_EXPR_NAME);
            outcome.map_err(|e| Box::new(e) as Box<dyn PosecErrorExt>)
        }
    }
}
