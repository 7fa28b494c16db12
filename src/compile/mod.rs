pub(crate) mod lower;
pub(crate) mod resolve;
