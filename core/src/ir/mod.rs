pub mod exec;
pub mod lower;
pub mod module;
pub mod op;
pub mod value;
pub mod verify;

pub use self::exec::{Evaluated, ExecError, Machine, RtValue};
pub use self::lower::{LoweringContext, LoweringError, LoweringErrorKind, lower_function, lower_prototype};
pub use self::module::{IrBlock, IrFunction, IrModule, IrSignature};
pub use self::op::{BlockId, IROp, Register};
pub use self::value::{IrType, Value};
pub use self::verify::verify_function;
