/// Campus buildings and their bookable rooms, in display order.
const ROOM_DIRECTORY: &[(&str, &[&str])] = &[
    (
        "Bierenbaum Fisher Hall",
        &["Lecture Room 101", "Lecture Room 202", "Studio 3"],
    ),
    (
        "Science & Tech Center",
        &["Sci Lab 12", "Tech Room 201", "STC Auditorium"],
    ),
    (
        "Anne Brossman Sweigart Hall",
        &["Swe Hall 10", "Swe Hall 22", "Business Lab 310"],
    ),
    (
        "Fine Arts Center",
        &["Yvonne Theater", "Fine Arts 112", "Fine Arts 220"],
    ),
    ("Lynch Adler Hall", &["LA 105", "LA 121", "LA 205"]),
    (
        "Moore Library",
        &["Study Room A", "Study Room B", "Conference Room"],
    ),
];

/// Rooms offered when the building is not in the directory.
const DEFAULT_ROOMS: &[&str] = &["Main Hall"];

pub fn buildings() -> impl Iterator<Item = &'static str> {
    ROOM_DIRECTORY.iter().map(|(name, _)| *name)
}

pub fn is_known_building(building: &str) -> bool {
    ROOM_DIRECTORY.iter().any(|(name, _)| *name == building)
}

/// Room list for a building, falling back to the default list.
pub fn rooms_for(building: &str) -> &'static [&'static str] {
    ROOM_DIRECTORY
        .iter()
        .find(|(name, _)| *name == building)
        .map(|(_, rooms)| *rooms)
        .unwrap_or(DEFAULT_ROOMS)
}

pub fn has_room(building: &str, room: &str) -> bool {
    rooms_for(building).contains(&room)
}
