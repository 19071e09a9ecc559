pub mod lsmc;
pub mod regression;
