pub mod config;
pub mod entities;
pub mod proximity;
pub mod source;
pub mod util;
