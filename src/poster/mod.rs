pub mod batch;
pub mod compose;
pub mod output;

pub use batch::{
    BatchRequest, BatchResult, CpuPosterRenderer, PosterRenderer, generate_batch, generate_single,
};
pub use compose::compose_poster;
