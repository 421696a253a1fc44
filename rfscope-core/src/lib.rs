//! Platform-free core of the rfscope spectrum display.
//!
//! Everything here is plain Rust: the browser front-end supplies a
//! [`surface::Surface`] implementation and forwards frames and input events
//! to a [`view::SpectrumView`].

pub mod axes;
pub mod colormap;
pub mod config;
pub mod history;
pub mod input;
pub mod markers;
pub mod scale;
pub mod snapshot;
pub mod surface;
pub mod trace;
pub mod types;
pub mod view;
pub mod waterfall;
pub mod wire;

pub use config::ViewOptions;
pub use snapshot::{SnapshotConfig, SnapshotState};
pub use types::{Frame, Pane, Timestamp};
pub use view::SpectrumView;
