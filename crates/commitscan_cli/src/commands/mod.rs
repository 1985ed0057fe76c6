pub(crate) mod meta;
#[cfg(feature = "devops")]
pub(crate) mod render;
#[cfg(feature = "devops")]
pub(crate) mod search;
