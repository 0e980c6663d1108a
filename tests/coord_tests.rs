use naval_defense::{Coord, GRID_SIZE};

#[test]
fn test_parse_valid_addresses() {
    let b3: Coord = "B3".parse().unwrap();
    assert_eq!(b3.row(), 1);
    assert_eq!(b3.col(), 2);
    assert_eq!(b3.to_string(), "B3");

    let a1: Coord = "A1".parse().unwrap();
    assert_eq!((a1.row(), a1.col()), (0, 0));
    let e5: Coord = "E5".parse().unwrap();
    assert_eq!((e5.row(), e5.col()), (4, 4));
}

#[test]
fn test_parse_rejects_out_of_grid() {
    for token in ["F1", "A0", "A6", "Z9", "E6"] {
        assert!(token.parse::<Coord>().is_err(), "{} should be invalid", token);
    }
}

#[test]
fn test_parse_rejects_malformed_tokens() {
    for token in ["", "A", "1A", "A11", "AA", "b3", "3", "A 1"] {
        assert!(token.parse::<Coord>().is_err(), "{:?} should be invalid", token);
    }
}

#[test]
fn test_all_enumerates_every_cell_once() {
    let cells: Vec<Coord> = Coord::all().collect();
    assert_eq!(cells.len(), (GRID_SIZE as usize) * (GRID_SIZE as usize));
    let mut sorted = cells.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), cells.len());
}

#[test]
fn test_display_roundtrip() {
    for coord in Coord::all() {
        let parsed: Coord = coord.to_string().parse().unwrap();
        assert_eq!(parsed, coord);
    }
}
