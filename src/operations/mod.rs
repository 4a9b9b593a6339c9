pub mod boolean;
pub mod modification;
pub mod offset;
