mod address;
pub use address::*;

mod error;
pub use error::*;

mod signer;
pub use signer::*;
