pub mod acceptor;
pub mod endpoint;
pub use self::acceptor::*;
pub use self::endpoint::*;
