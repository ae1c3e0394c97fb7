// Render tree: staggered entrance delays for every displayed element.
// Pure functions of the analyzed record; no I/O.

pub mod html;
pub mod stagger;
pub mod tree;

pub use html::render_html;
pub use tree::{build_render_tree, RenderTree};
