mod resolver;

pub use crate::resolver::{ResolveOptions, Resolver};
