pub mod chunk;
pub mod emit;
pub mod inspect;
pub mod render;
pub mod value;
