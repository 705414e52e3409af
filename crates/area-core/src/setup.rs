//! Area Setup
//!
//! Seeds the default city with its six public areas and their facilities.

use area_events::{Area, AreaFacility, AreaType};

/// Create the default public areas, each with the given visibility cap.
pub fn create_default_areas(max_visible: usize) -> Vec<Area> {
    let mut areas = Vec::new();

    // === CITY CENTRE ===
    areas.push(
        Area::new("plaza-main", "Central Plaza", AreaType::Plaza, 50)
            .with_description("The main square at the heart of the city, where residents gather and talk")
            .with_position(50, 50)
            .with_facility(AreaFacility::new("fountain", "Fountain", "decoration", 0, 0))
            .with_facility(AreaFacility::new("bench-1", "Bench", "seat", -2, 2))
            .with_facility(AreaFacility::new("bench-2", "Bench", "seat", 2, 2))
            .with_facility(AreaFacility::new("bench-3", "Bench", "seat", -2, -2))
            .with_facility(AreaFacility::new("bench-4", "Bench", "seat", 2, -2)),
    );

    areas.push(
        Area::new("cafe-sunrise", "Sunrise Cafe", AreaType::Cafe, 20)
            .with_description("A cosy cafe serving drinks and light snacks")
            .with_position(45, 48)
            .with_facility(AreaFacility::new("counter", "Bar Counter", "service", 0, -3))
            .with_facility(AreaFacility::new("table-1", "Round Table", "seat", -2, 0))
            .with_facility(AreaFacility::new("table-2", "Round Table", "seat", 2, 0))
            .with_facility(AreaFacility::new("table-3", "Round Table", "seat", -2, 2))
            .with_facility(AreaFacility::new("table-4", "Round Table", "seat", 2, 2)),
    );

    // === OUTDOORS ===
    areas.push(
        Area::new("park-green", "Green Shade Park", AreaType::Park, 30)
            .with_description("A quiet park with dense trees and a clear pond")
            .with_position(55, 45)
            .with_facility(AreaFacility::new("pond", "Pond", "decoration", 0, 0))
            .with_facility(AreaFacility::new("tree-1", "Old Tree", "decoration", -3, -3))
            .with_facility(AreaFacility::new("tree-2", "Old Tree", "decoration", 3, -3))
            .with_facility(AreaFacility::new("bench-1", "Bench", "seat", -2, 2))
            .with_facility(AreaFacility::new("bench-2", "Bench", "seat", 2, 2))
            .with_facility(AreaFacility::new("fishing-spot", "Fishing Spot", "activity", 0, 3)),
    );

    // === SERVICES ===
    areas.push(
        Area::new("shop-general", "General Store", AreaType::Shop, 15)
            .with_description("Everyday goods and a few local specialities")
            .with_position(48, 52)
            .with_facility(AreaFacility::new("counter", "Checkout", "service", 0, -2))
            .with_facility(AreaFacility::new("shelf-1", "Shelf", "display", -2, 0))
            .with_facility(AreaFacility::new("shelf-2", "Shelf", "display", 2, 0))
            .with_facility(AreaFacility::new("shelf-3", "Shelf", "display", -2, 1))
            .with_facility(AreaFacility::new("shelf-4", "Shelf", "display", 2, 1)),
    );

    areas.push(
        Area::new("library-quiet", "Quiet Library", AreaType::Library, 25)
            .with_description("A calm library with a rich collection, good for reading and study")
            .with_position(52, 55)
            .with_facility(AreaFacility::new("desk-main", "Lending Desk", "service", 0, -3))
            .with_facility(AreaFacility::new("shelf-1", "Bookshelf", "display", -3, 0))
            .with_facility(AreaFacility::new("shelf-2", "Bookshelf", "display", 3, 0))
            .with_facility(AreaFacility::new("reading-1", "Reading Seat", "seat", -1, 2))
            .with_facility(AreaFacility::new("reading-2", "Reading Seat", "seat", 1, 2))
            .with_facility(AreaFacility::new("reading-3", "Reading Seat", "seat", -1, 3))
            .with_facility(AreaFacility::new("reading-4", "Reading Seat", "seat", 1, 3)),
    );

    areas.push(
        Area::new("gym-fitness", "Fitness Centre", AreaType::Gym, 20)
            .with_description("A modern gym with a full range of equipment")
            .with_position(58, 50)
            .with_facility(AreaFacility::new("reception", "Reception", "service", 0, -3))
            .with_facility(AreaFacility::new("treadmill-1", "Treadmill", "equipment", -2, 0))
            .with_facility(AreaFacility::new("treadmill-2", "Treadmill", "equipment", 0, 0))
            .with_facility(AreaFacility::new("treadmill-3", "Treadmill", "equipment", 2, 0))
            .with_facility(AreaFacility::new("weights", "Free Weights", "equipment", -2, 2))
            .with_facility(AreaFacility::new("yoga", "Yoga Corner", "activity", 2, 2)),
    );

    areas
        .into_iter()
        .map(|area| area.with_max_visible(max_visible))
        .collect()
}
