pub(crate) mod builder;
pub(crate) mod memory;
pub(crate) mod plug;
pub(crate) mod primitives;
