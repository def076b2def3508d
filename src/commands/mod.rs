pub mod clean;
pub mod info;
pub mod repos;
pub mod run;
