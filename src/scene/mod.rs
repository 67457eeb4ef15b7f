pub(crate) mod desc;
pub(crate) mod layer;
pub(crate) mod settings;
