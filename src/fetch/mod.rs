pub mod csvs;
pub mod urls;
