pub mod impl_console;
#[cfg(not(target_arch = "wasm32"))]
pub mod impl_fake;
pub mod interface;
