pub mod boundary;
pub mod info;
pub mod rewrite;
