pub mod escrowmodel;
pub mod gigmodel;
pub mod profilemodel;
