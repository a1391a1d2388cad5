//! Logical topology coordinates.
//!
//! Nodes are 100x60 boxes addressed by their center. The presentation layer owns
//! the exact pixels; these coordinates only need to agree with it on relative
//! placement.

use serde::{Deserialize, Serialize};

/// A 2-D position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub const NODE_WIDTH: f64 = 100.0;
pub const NODE_HEIGHT: f64 = 60.0;

/// Marker radius, added where a marker must clear a node edge.
pub const DOT_RADIUS: f64 = 6.0;

pub const CLIENT: Point = Point::new(150.0, 250.0);
pub const EDGE: Point = Point::new(350.0, 250.0);
/// Both the edge function and the DNS resolver sit above the edge node.
pub const RESOLVER: Point = Point::new(350.0, 120.0);

pub const BACKEND_X: f64 = 550.0;
/// Vertical distance between stacked backend nodes.
pub const BACKEND_SPACING: f64 = 80.0;

/// Which resolver a marker passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolver {
    /// Header-driven origin selection at the edge.
    EdgeFunction,
    /// Plain DNS-weighted selection.
    Dns,
}

impl Resolver {
    pub fn for_stickiness(stickiness: bool) -> Self {
        if stickiness {
            Resolver::EdgeFunction
        } else {
            Resolver::Dns
        }
    }

    pub fn position(&self) -> Point {
        RESOLVER
    }
}

pub fn client_right() -> Point {
    Point::new(CLIENT.x + NODE_WIDTH / 2.0, CLIENT.y)
}

pub fn edge_left() -> Point {
    Point::new(EDGE.x - NODE_WIDTH / 2.0, EDGE.y)
}

pub fn edge_right() -> Point {
    Point::new(EDGE.x + NODE_WIDTH / 2.0 + DOT_RADIUS, EDGE.y)
}

/// Point on the main flow directly below the resolver.
pub fn below_resolver(resolver: Resolver) -> Point {
    Point::new(resolver.position().x, EDGE.y)
}

pub fn resolver_bottom(resolver: Resolver) -> Point {
    let p = resolver.position();
    Point::new(p.x, p.y + NODE_HEIGHT / 2.0)
}

/// Left edge of the backend node at `index` in discovery order.
///
/// Index 0 is level with the edge node; odd indices stack upward and even
/// indices downward: 250, 170, 330, 90, 410, ...
pub fn backend_position(index: usize) -> Point {
    let y = if index == 0 {
        EDGE.y
    } else if index % 2 == 1 {
        EDGE.y - ((index + 1) / 2) as f64 * BACKEND_SPACING
    } else {
        EDGE.y + (index / 2) as f64 * BACKEND_SPACING
    };
    Point::new(BACKEND_X - NODE_WIDTH / 2.0, y)
}

/// Slot for `id`: its discovery index, or the next free slot if undiscovered.
pub fn backend_slot(id: &str, discovered: &[String]) -> usize {
    discovered
        .iter()
        .position(|d| d == id)
        .unwrap_or(discovered.len())
}
