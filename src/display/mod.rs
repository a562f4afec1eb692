pub mod commands;
pub mod session;
pub mod surface;
pub mod viewport;
pub mod visibility;

pub use session::{MapSession, MapSurface, SessionEvent, SessionOptions};
pub use surface::TracingSurface;
pub use viewport::{MapSettings, Viewport};
