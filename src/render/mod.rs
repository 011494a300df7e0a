pub mod backend;
pub mod cpu;
pub mod gradient;

pub use backend::{Canvas, HAlign, OutputFormat, RenderBackend};
pub use cpu::CpuBackend;
