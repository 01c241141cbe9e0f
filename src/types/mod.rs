pub mod columns;
pub mod frames;
pub mod records;
