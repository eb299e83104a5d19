//! The GPU device abstraction: format conversion kernels and the single
//! actor thread every composite blit and readback funnels through.

pub mod device;
pub mod kernel;

pub use device::Device;
pub use kernel::Kernel;
