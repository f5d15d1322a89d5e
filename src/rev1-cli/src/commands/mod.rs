pub mod bundle;
pub mod dump;
pub mod info;
pub mod rewrite;
