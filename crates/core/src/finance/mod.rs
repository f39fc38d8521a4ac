pub mod calculator;
pub mod currency;
pub mod schedule;
