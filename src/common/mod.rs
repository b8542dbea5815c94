mod id;
mod immutable;
mod item;
mod mutable;
mod node;
mod value;

pub use id::*;
pub use immutable::*;
pub use item::*;
pub use mutable::*;
pub use node::*;
pub use value::*;
