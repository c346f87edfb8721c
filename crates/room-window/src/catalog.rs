//! Static room catalog.
//!
//! The catalog file lists floors, categories, capacities and rooms separately;
//! rooms point at the others by id. Loading joins them into [`StudyRoom`]s and
//! drops any room whose floor, category or capacity is missing.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::model::{Capacity, Category, Floor, RoomId, StudyRoom};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibraryData {
    id: u32,
    #[serde(rename = "baseURL")]
    base_url: String,
    name: String,
    floors: Vec<Floor>,
    categories: Vec<Category>,
    capacities: Vec<Capacity>,
    rooms: Vec<RoomRecord>,
}

#[derive(Debug, Deserialize)]
struct RoomRecord {
    id: RoomId,
    name: String,
    #[serde(rename = "floorID")]
    floor_id: u32,
    #[serde(rename = "categoryID")]
    category_id: u32,
    #[serde(rename = "capacityID")]
    capacity_id: u32,
}

/// Immutable room reference data for one library location.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub location_id: u32,
    pub name: String,
    pub base_url: String,
    rooms: Vec<StudyRoom>,
    index: HashMap<RoomId, usize>,
}

impl Catalog {
    /// Parse a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: LibraryData = serde_json::from_str(json)?;
        Ok(Self::from_data(data))
    }

    /// Read and parse a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Like [`Catalog::load`], but a failure yields an empty catalog so that every
    /// room lookup misses instead of the caller aborting.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "catalog unavailable, using empty catalog");
                Self::default()
            }
        }
    }

    fn from_data(data: LibraryData) -> Self {
        let floors: HashMap<u32, Floor> = data.floors.into_iter().map(|f| (f.id, f)).collect();
        let categories: HashMap<u32, Category> =
            data.categories.into_iter().map(|c| (c.id, c)).collect();
        let capacities: HashMap<u32, Capacity> =
            data.capacities.into_iter().map(|c| (c.id, c)).collect();

        let mut rooms: Vec<StudyRoom> = data
            .rooms
            .into_iter()
            .filter_map(|record| {
                let joined = (
                    floors.get(&record.floor_id),
                    categories.get(&record.category_id),
                    capacities.get(&record.capacity_id),
                );
                match joined {
                    (Some(floor), Some(category), Some(capacity)) => Some(StudyRoom {
                        id: record.id,
                        name: record.name,
                        capacity: capacity.clone(),
                        floor: floor.clone(),
                        category: category.clone(),
                    }),
                    _ => {
                        tracing::debug!(room_id = record.id, "room references unknown floor, category or capacity");
                        None
                    }
                }
            })
            .collect();

        // Stable, so rooms on the same floor keep catalog order.
        rooms.sort_by_key(|room| room.floor.level);

        let index = rooms.iter().enumerate().map(|(i, room)| (room.id, i)).collect();

        Self {
            location_id: data.id,
            name: data.name,
            base_url: data.base_url,
            rooms,
            index,
        }
    }

    /// Look up a room by id.
    pub fn resolve_room(&self, id: RoomId) -> Option<&StudyRoom> {
        self.index.get(&id).map(|&i| &self.rooms[i])
    }

    /// All rooms, ordered by floor level.
    pub fn rooms(&self) -> &[StudyRoom] {
        &self.rooms
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "id": 1234,
        "baseURL": "https://libcal.example.edu",
        "name": "Main Library",
        "floors": [{"id": 1, "level": 3}, {"id": 2, "level": 1}],
        "categories": [{"id": 10, "name": "Group Study"}],
        "capacities": [{"id": 20, "minimum": 2, "maximum": 6}],
        "rooms": [
            {"id": 100, "name": "Upper A", "floorID": 1, "categoryID": 10, "capacityID": 20},
            {"id": 101, "name": "Lower A", "floorID": 2, "categoryID": 10, "capacityID": 20},
            {"id": 102, "name": "Orphan", "floorID": 9, "categoryID": 10, "capacityID": 20}
        ]
    }"#;

    #[test]
    fn joins_rooms_and_orders_by_floor_level() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.location_id, 1234);
        assert_eq!(catalog.name, "Main Library");
        let names: Vec<&str> = catalog.rooms().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Lower A", "Upper A"]);
    }

    #[test]
    fn room_with_dangling_foreign_key_is_dropped() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert!(catalog.resolve_room(102).is_none());
        assert_eq!(catalog.resolve_room(100).unwrap().capacity.maximum, 6);
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(matches!(
            Catalog::from_json("{\"id\": 1}"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn missing_file_degrades_to_empty_catalog() {
        let catalog = Catalog::load_or_empty("/nonexistent/catalog.json");
        assert!(catalog.is_empty());
        assert!(catalog.resolve_room(100).is_none());
    }
}
