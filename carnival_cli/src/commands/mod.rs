pub mod hunt;
pub mod neurons;
pub mod sketch;
