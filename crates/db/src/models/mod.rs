pub mod generated_gif;
pub mod plan;
pub mod subscription;
