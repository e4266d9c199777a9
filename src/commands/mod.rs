pub mod calendar;
pub mod export;
pub mod members;
pub mod relations;
pub mod suggest;
