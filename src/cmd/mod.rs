pub mod inspect;
pub mod render;

pub use inspect::cmd_inspect;
pub use render::cmd_render;
