//! # Rill
//!
//! A small imperative scripting language: variables, arrays, functions,
//! control flow, and console I/O. Source text compiles line by line to a
//! compact internal bytecode, is statically checked, then runs on a
//! stack-based virtual machine over a flat numeric memory.
//!
//! ```text
//! func fact(n)
//!     return 1 ? n <= 1
//!     return n * fact(n - 1)
//! end
//!
//! func main()
//!     println "5! = ", fact(5)
//! end
//! ```

pub mod lang;
pub mod mach;
pub mod term;
