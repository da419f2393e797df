pub mod compression;
pub mod delimited;
