pub mod error;
pub mod util;

pub use error::ParseErr as PErr;

pub use error::ParseResult;
