pub mod export;
pub mod fetch;
pub mod grid;
pub mod html;
pub mod record;
pub mod render;
