pub mod net;
pub mod organize;
pub mod probe;
pub mod stats;
