pub mod add_record;
pub mod audio;
pub mod database;
pub mod finder;
pub mod functional;
pub mod panels;
pub mod plot;
pub mod records;
