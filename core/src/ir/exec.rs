//! file: core/src/ir/exec.rs
//! description: reference interpreter for IR modules.
//!
//! `Machine` walks the blocks of a function directly: registers live in a
//! per-call frame, record storage is a list of allocations of `f64` cells,
//! and a pointer is an (allocation, cell) pair. Declarations without a body
//! are served by a small table of host functions. The step budget bounds
//! runaway loops.
//!
use crate::error::{Level, PosecErrorExt};
use crate::ir::module::{IrFunction, IrModule};
use crate::ir::op::{IROp, Register};
use crate::ir::value::Value;
use crate::location::Location;

const MAX_CALL_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RtValue {
    Float(f64),
    Bool(bool),
    Ptr { alloc: usize, cell: usize },
}

/// A runtime value with record pointers resolved to their contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Number(f64),
    Bool(bool),
    Record { name: String, fields: Vec<f64> },
}

impl std::fmt::Display for Evaluated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluated::Number(v) => write!(f, "{}", v),
            Evaluated::Bool(b) => write!(f, "{}", b),
            Evaluated::Record { name, fields } => {
                let parts = fields.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "{} {{ {} }}", name, parts)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecError {
    message: String,
    function: Option<String>,
}

impl ExecError {
    fn new(message: impl Into<String>) -> Self {
        ExecError { message: message.into(), function: None }
    }

    fn in_function(mut self, name: &str) -> Self {
        if self.function.is_none() {
            self.function = Some(name.to_string());
        }
        self
    }
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ExecError {}

impl PosecErrorExt for ExecError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        match &self.function {
            Some(func) => format!("{} (in '{}')", self.message, func),
            None => self.message.clone(),
        }
    }

    fn issuer(&self) -> String {
        "posec.ir.exec".to_string()
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

pub type ExecResult<T> = Result<T, ExecError>;

fn run_host_fn(name: &str, args: &[f64], output: &mut String) -> Option<f64> {
    match (name, args) {
        ("sin", [x]) => Some(x.sin()),
        ("cos", [x]) => Some(x.cos()),
        ("sqrt", [x]) => Some(x.sqrt()),
        ("atan2", [y, x]) => Some(y.atan2(*x)),
        ("printd", [x]) => {
            output.push_str(&format!("{}\n", x));
            Some(0.0)
        }
        ("putchard", [x]) => {
            if let Some(c) = char::from_u32(*x as u32) {
                output.push(c);
            }
            Some(0.0)
        }
        _ => None,
    }
}

pub struct Machine<'m> {
    module: &'m IrModule,
    memory: Vec<Vec<f64>>,
    alloc_records: Vec<String>,
    steps: usize,
    max_steps: usize,
    depth: usize,
    output: String,
}

impl<'m> Machine<'m> {
    pub fn new(module: &'m IrModule, max_steps: usize) -> Self {
        Machine {
            module,
            memory: Vec::new(),
            alloc_records: Vec::new(),
            steps: 0,
            max_steps,
            depth: 0,
            output: String::new(),
        }
    }

    /// Text written by `printd` / `putchard` so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Contents of the allocation `ptr` points into.
    pub fn record(&self, ptr: RtValue) -> Option<&[f64]> {
        match ptr {
            RtValue::Ptr { alloc, .. } => self.memory.get(alloc).map(|cells| cells.as_slice()),
            _ => None,
        }
    }

    /// Number of record allocations performed so far.
    pub fn allocation_count(&self) -> usize {
        self.memory.len()
    }

    pub fn call(&mut self, name: &str, args: &[f64]) -> ExecResult<RtValue> {
        let args = args.iter().map(|v| RtValue::Float(*v)).collect::<Vec<_>>();
        self.call_values(name, args)
    }

    /// Call `name` and resolve a pointer result to the record it points to.
    pub fn evaluate(&mut self, name: &str, args: &[f64]) -> ExecResult<Evaluated> {
        let value = self.call(name, args)?;
        self.materialize(value)
    }

    pub fn materialize(&self, value: RtValue) -> ExecResult<Evaluated> {
        match value {
            RtValue::Float(v) => Ok(Evaluated::Number(v)),
            RtValue::Bool(b) => Ok(Evaluated::Bool(b)),
            RtValue::Ptr { alloc, .. } => {
                let fields = self.memory.get(alloc).cloned().ok_or_else(|| ExecError::new("dangling record pointer"))?;
                let name = self.alloc_records.get(alloc).cloned().unwrap_or_default();
                Ok(Evaluated::Record { name, fields })
            }
        }
    }

    fn call_values(&mut self, name: &str, args: Vec<RtValue>) -> ExecResult<RtValue> {
        let module = self.module;
        let function = module
            .get_function(name)
            .ok_or_else(|| ExecError::new(format!("call to unknown function '{}'", name)))?;

        if function.arity() != args.len() {
            return Err(ExecError::new(format!(
                "'{}' expects {} argument(s), got {}",
                name,
                function.arity(),
                args.len()
            )));
        }

        if function.is_declaration() {
            let mut floats = Vec::with_capacity(args.len());
            for a in args.iter() {
                floats.push(as_float(a)?);
            }
            return run_host_fn(name, &floats, &mut self.output)
                .map(RtValue::Float)
                .ok_or_else(|| ExecError::new(format!("no host implementation for extern '{}'", name)));
        }

        if self.depth >= MAX_CALL_DEPTH {
            return Err(ExecError::new(format!("call depth limit of {} exceeded", MAX_CALL_DEPTH)));
        }
        self.depth += 1;
        let result = self.run_body(function, args).map_err(|e| e.in_function(name));
        self.depth -= 1;
        result
    }

    fn run_body(&mut self, function: &IrFunction, args: Vec<RtValue>) -> ExecResult<RtValue> {
        let mut regs: Vec<Option<RtValue>> = vec![None; function.reg_types.len()];
        for (i, a) in args.into_iter().enumerate() {
            regs[i] = Some(a);
        }

        let mut block = 0usize;
        let mut prev_block: Option<usize> = None;

        loop {
            let ops = &function
                .blocks
                .get(block)
                .ok_or_else(|| ExecError::new(format!("jump to missing block bb{}", block)))?
                .ops;

            // Phis read their inputs before any of them is written.
            let phi_count = ops.iter().take_while(|op| matches!(op, IROp::Phi { .. })).count();
            let mut phi_values = Vec::with_capacity(phi_count);
            for op in ops[..phi_count].iter() {
                if let IROp::Phi { dest, incoming } = op {
                    let from = prev_block.ok_or_else(|| ExecError::new("phi in entry block"))?;
                    let (src, _) = incoming
                        .iter()
                        .find(|(_, b)| *b == from)
                        .ok_or_else(|| ExecError::new(format!("phi r{} has no edge from bb{}", dest, from)))?;
                    phi_values.push((*dest, read(&regs, *src)?));
                }
            }
            for (dest, v) in phi_values {
                regs[dest] = Some(v);
            }

            let mut next_block = None;
            for op in ops[phi_count..].iter() {
                self.steps += 1;
                if self.steps > self.max_steps {
                    return Err(ExecError::new(format!("step budget of {} exhausted", self.max_steps)));
                }

                match op {
                    IROp::LConst { dest, value } => {
                        let Value::Float(v) = value;
                        regs[*dest] = Some(RtValue::Float(*v));
                    }
                    IROp::Add { dest, src1, src2 } => regs[*dest] = Some(float_bin(&regs, *src1, *src2, |a, b| a + b)?),
                    IROp::Sub { dest, src1, src2 } => regs[*dest] = Some(float_bin(&regs, *src1, *src2, |a, b| a - b)?),
                    IROp::Mul { dest, src1, src2 } => regs[*dest] = Some(float_bin(&regs, *src1, *src2, |a, b| a * b)?),
                    IROp::Div { dest, src1, src2 } => regs[*dest] = Some(float_bin(&regs, *src1, *src2, |a, b| a / b)?),
                    IROp::Lt { dest, src1, src2 } => {
                        regs[*dest] = Some(float_bin(&regs, *src1, *src2, |a, b| if a < b { 1.0 } else { 0.0 })?)
                    }
                    IROp::Gt { dest, src1, src2 } => {
                        regs[*dest] = Some(float_bin(&regs, *src1, *src2, |a, b| if a > b { 1.0 } else { 0.0 })?)
                    }
                    IROp::Truthy { dest, src } => {
                        let v = as_float(&read(&regs, *src)?)?;
                        regs[*dest] = Some(RtValue::Bool(v != 0.0));
                    }
                    IROp::Call { dest, callee, args } => {
                        let mut values = Vec::with_capacity(args.len());
                        for a in args.iter() {
                            values.push(read(&regs, *a)?);
                        }
                        regs[*dest] = Some(self.call_values(callee, values)?);
                    }
                    IROp::Alloca { dest, record } => {
                        let layout = self
                            .module
                            .records()
                            .get(record)
                            .ok_or_else(|| ExecError::new(format!("alloca of unknown record '{}'", record)))?;
                        self.memory.push(vec![0.0; layout.field_count()]);
                        self.alloc_records.push(record.clone());
                        regs[*dest] = Some(RtValue::Ptr { alloc: self.memory.len() - 1, cell: 0 });
                    }
                    IROp::FieldAddr { dest, base, indices } => {
                        let RtValue::Ptr { alloc, cell } = read(&regs, *base)? else {
                            return Err(ExecError::new(format!("fieldaddr base r{} is not a pointer", base)));
                        };
                        let width = self.memory.get(alloc).map(|c| c.len()).unwrap_or(0);
                        let cell = cell + indices[0] * width + indices[1];
                        regs[*dest] = Some(RtValue::Ptr { alloc, cell });
                    }
                    IROp::Store { src, addr } => {
                        let v = as_float(&read(&regs, *src)?)?;
                        let RtValue::Ptr { alloc, cell } = read(&regs, *addr)? else {
                            return Err(ExecError::new(format!("store address r{} is not a pointer", addr)));
                        };
                        let slot = self
                            .memory
                            .get_mut(alloc)
                            .and_then(|cells| cells.get_mut(cell))
                            .ok_or_else(|| ExecError::new(format!("store outside allocation {} (cell {})", alloc, cell)))?;
                        *slot = v;
                    }
                    IROp::Phi { .. } => return Err(ExecError::new("phi after the start of a block")),
                    IROp::Jump { target } => {
                        next_block = Some(*target);
                        break;
                    }
                    IROp::Branch { cond, then_block, else_block } => {
                        let taken = match read(&regs, *cond)? {
                            RtValue::Bool(b) => b,
                            other => as_float(&other)? != 0.0,
                        };
                        next_block = Some(if taken { *then_block } else { *else_block });
                        break;
                    }
                    IROp::Ret { src } => return read(&regs, *src),
                }
            }

            match next_block {
                Some(target) => {
                    prev_block = Some(block);
                    block = target;
                }
                None => return Err(ExecError::new(format!("fell off the end of bb{}", block))),
            }
        }
    }
}

fn read(regs: &[Option<RtValue>], reg: Register) -> ExecResult<RtValue> {
    regs.get(reg)
        .copied()
        .flatten()
        .ok_or_else(|| ExecError::new(format!("read of unset register r{}", reg)))
}

fn as_float(v: &RtValue) -> ExecResult<f64> {
    match v {
        RtValue::Float(f) => Ok(*f),
        other => Err(ExecError::new(format!("expected a number, found {:?}", other))),
    }
}

fn float_bin(regs: &[Option<RtValue>], a: Register, b: Register, f: fn(f64, f64) -> f64) -> ExecResult<RtValue> {
    let x = as_float(&read(regs, a)?)?;
    let y = as_float(&read(regs, b)?)?;
    Ok(RtValue::Float(f(x, y)))
}
