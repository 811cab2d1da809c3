pub mod sync;
pub mod token;
pub mod wallet;
