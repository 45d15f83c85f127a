mod component;
pub mod config;
mod entry;
pub mod export;
pub mod filter;
pub mod layout;
pub mod normalize;
mod render;
pub mod replay;
pub mod simulation;
mod state;
pub mod stats;
pub mod theme;
mod tooltip;
pub mod types;

pub use component::{GraphContext, RouteGraphCanvas};
pub use config::{GraphConfig, ResizePolicy};
pub use entry::{RouteGraphHandle, init_route_graph};
pub use normalize::{GraphPayload, Normalized, normalize};
pub use state::RouteGraphState;
pub use theme::{GraphTheme, ThemePreset};
pub use tooltip::Tooltip;
pub use types::{Edge, EdgeKind, GraphData, Node, NodeKind, SearchStep};
