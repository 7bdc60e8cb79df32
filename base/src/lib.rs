//! The `base` crate defines the MU5-related things which are useful
//! in both a simulator and other associated tools.  The idea is that
//! if you want to write, say, an engineers' diagnostic tool that
//! formats drum request words, it would depend on the base crate but
//! would not need to depend on the simulator library itself.
//!
//! The bit layouts in this crate are the compatibility contract of
//! the machine: a real address routed by the Exchange, the V-store
//! line numbering scheme, and the packed request word of the
//! fixed-head disc.  They are kept behind named accessors so that
//! no caller needs to repeat a shift or a mask.

mod drum;
mod types;

pub mod prelude;

pub use crate::drum::*;
pub use crate::types::*;
