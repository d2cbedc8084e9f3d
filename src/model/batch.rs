//! DropBatch: the unit of delivery

use super::descriptor::FileDescriptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point in surface-local coordinates, origin top-left.
///
/// Serializes as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct DropPoint {
    pub x: f64,
    pub y: f64,
}

impl DropPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert an OS location (origin bottom-left) on a surface of the given height.
    pub fn from_surface(x: f64, y: f64, surface_height: f64) -> Self {
        Self {
            x,
            y: surface_height - y,
        }
    }
}

impl From<[f64; 2]> for DropPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<DropPoint> for [f64; 2] {
    fn from(point: DropPoint) -> Self {
        [point.x, point.y]
    }
}

/// Every descriptor produced by one drop gesture.
///
/// `item_count` is fixed when the payload is classified, before any item is
/// enriched, so it can differ from `items.len()` when duplicates are
/// suppressed or promises fail. Item order is unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropBatch {
    pub id: Uuid,
    pub item_count: usize,
    pub drop_location: DropPoint,
    pub items: Vec<FileDescriptor>,
}

impl DropBatch {
    /// Whether a descriptor for `path` made it into the batch.
    pub fn contains_path(&self, path: &str) -> bool {
        self.items.iter().any(|item| item.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_surface_flips_y() {
        let point = DropPoint::from_surface(10.0, 150.0, 600.0);
        assert_eq!(point, DropPoint::new(10.0, 450.0));
    }

    #[test]
    fn point_serializes_as_pair() {
        let json = serde_json::to_value(DropPoint::new(1.5, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!([1.5, 2.0]));
        let back: DropPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, DropPoint::new(1.5, 2.0));
    }

    #[test]
    fn contains_path_checks_membership() {
        let batch = DropBatch {
            id: Uuid::new_v4(),
            item_count: 2,
            drop_location: DropPoint::default(),
            items: vec![FileDescriptor {
                path: "/a".to_string(),
                access_token: None,
                is_directory: false,
                from_promise: false,
            }],
        };
        assert!(batch.contains_path("/a"));
        assert!(!batch.contains_path("/b"));
    }
}
