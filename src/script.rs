//! The runtime a module body executes in.
//!
//! The parser hands its rewritten text to [`CompiledUnit::compile`], so every module
//! is compiled once, ahead of evaluation, and no text is turned into code while the
//! loader is scheduling. A unit is invoked with positional parameters: the evaluator
//! passes every dependency binding plus `module` and `exports`, and reads the
//! exports back out of the `module` handle afterwards.
//!
//! The supported subset covers what module bodies need to wire values together:
//! declarations, assignments to names and member paths, object and array literals,
//! function and class declarations (kept as opaque values) and calls to
//! [`Value::Native`] functions provided by the host.

mod value ;
mod compile ;
mod unit ;

pub use value::{ Value, Object, Bindings, FunctionValue, ClassValue, NativeFn };
pub use compile::CompileError ;
pub use unit::{ CompiledUnit, ExecError, RuntimeError };
