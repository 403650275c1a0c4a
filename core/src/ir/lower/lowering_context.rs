//! file: core/src/ir/lower/lowering_context.rs
//! description: symbol table shared by lowering passes.
//!
//! `LoweringContext` remembers every prototype seen in the session (from
//! `extern` declarations and successful definitions) so that calls can be
//! resolved even when the callee is not yet present in the module.

use std::collections::HashMap;

use log::debug;

use crate::ast::Prototype;
use crate::ir::module::{IrModule, IrSignature};

/// Where a call target was found.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Already declared or defined in the module.
    Module(IrSignature),
    /// Known only as a prototype; the caller must declare it before use.
    Prototype(IrSignature),
}

impl Resolved {
    pub fn signature(&self) -> &IrSignature {
        match self {
            Resolved::Module(sig) | Resolved::Prototype(sig) => sig,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoweringContext {
    prototypes: HashMap<String, Prototype>,
}

impl LoweringContext {
    pub fn new() -> Self {
        LoweringContext { prototypes: HashMap::new() }
    }

    pub fn register_prototype(&mut self, proto: &Prototype) {
        debug!("registered prototype {}", proto);
        self.prototypes.insert(proto.name.clone(), proto.clone());
    }

    pub fn forget_prototype(&mut self, name: &str) -> Option<Prototype> {
        self.prototypes.remove(name)
    }

    pub fn prototype(&self, name: &str) -> Option<&Prototype> {
        self.prototypes.get(name)
    }

    pub fn prototypes(&self) -> impl Iterator<Item = &Prototype> {
        self.prototypes.values()
    }

    /// Resolve a callee: the module first, then the prototype table.
    pub fn resolve_function(&self, name: &str, module: &IrModule) -> Option<Resolved> {
        if let Some(f) = module.get_function(name) {
            return Some(Resolved::Module(f.signature.clone()));
        }
        self.prototypes
            .get(name)
            .map(|proto| Resolved::Prototype(IrSignature::external(&proto.name, &proto.params)))
    }
}
