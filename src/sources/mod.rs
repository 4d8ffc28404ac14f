pub mod interval;
pub mod stdin;
