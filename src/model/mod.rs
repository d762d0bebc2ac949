pub mod run;
pub mod term;
