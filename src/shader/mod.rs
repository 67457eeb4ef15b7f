pub(crate) mod builtin;
pub(crate) mod effect;
pub(crate) mod program;
pub(crate) mod sources;
pub(crate) mod uniform;
