pub(crate) mod blend;
pub(crate) mod pipeline;
pub(crate) mod quad;
pub(crate) mod readback;
pub(crate) mod target;
