//! The prelude exports the types which are useful in representing
//! things to do with the MU5 store highway.  Providing this prelude
//! is the main purpose of the base crate.
pub use super::drum::*;
pub use super::types::{RealAddress, VStoreAddress};
