pub mod fsops;
pub mod shell;
