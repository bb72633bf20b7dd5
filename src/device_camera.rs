#[cfg(not(target_arch = "wasm32"))]
pub mod impl_fake;
#[cfg(target_arch = "wasm32")]
pub mod impl_web;
pub mod interface;
