//! Hex geometry, configuration and board assembly

use hexrail::game::{
    roll_number_sequence, Dice, EdgeDirection, EdgeKey, GameConfig, GameError, HexagonLayout,
    RandomDice, TerrainPair, TilePosition, TileType,
};

#[test]
fn test_neighbours_are_adjacent() {
    let center = TilePosition::new(2, -1);
    for direction in EdgeDirection::ALL {
        let next = center.neighbour(direction);
        assert!(center.is_adjacent(&next));
        assert_eq!(next.neighbour(direction.opposite()), center);
    }
    assert_eq!(center.s(), -1);
}

#[test]
fn test_distance() {
    let origin = TilePosition::ORIGIN;
    assert_eq!(origin.distance_to(&TilePosition::new(3, 0)), 3);
    assert_eq!(origin.distance_to(&TilePosition::new(2, -3)), 3);
    assert_eq!(origin.distance_to(&TilePosition::new(-2, 1)), 2);
    assert_eq!(origin.distance_to(&origin), 0);
}

#[test]
fn test_ring_and_spiral() {
    let origin = TilePosition::ORIGIN;
    assert_eq!(origin.ring(0), vec![origin]);

    let ring = origin.ring(2);
    assert_eq!(ring.len(), 12);
    assert!(ring.iter().all(|p| origin.distance_to(p) == 2));

    let spiral = origin.spiral(2);
    assert_eq!(spiral.len(), 19);
    assert_eq!(spiral[0], origin);
    assert!(spiral[1..7].iter().all(|p| origin.distance_to(p) == 1));
}

#[test]
fn test_edge_key_is_unordered() {
    let a = TilePosition::new(0, 0);
    let b = TilePosition::new(1, 0);
    let c = TilePosition::new(2, 0);
    let key = EdgeKey::new(b, a);
    assert_eq!(key, EdgeKey::new(a, b));
    assert_eq!(key.first(), a);
    assert_eq!(key.other_end(&a), Some(b));
    assert_eq!(key.other_end(&c), None);
    assert!(key.connects_to(&EdgeKey::new(b, c)));
}

#[test]
fn test_terrain_pair_is_unordered() {
    assert_eq!(
        TerrainPair::new(TileType::Mountain, TileType::Plain),
        TerrainPair::new(TileType::Plain, TileType::Mountain)
    );
}

#[test]
fn test_roll_number_sequence() {
    let numbers: Vec<u32> = roll_number_sequence(6).collect();
    assert_eq!(numbers.len(), 36);
    assert_eq!(&numbers[..7], &[11, 12, 13, 14, 15, 16, 21]);
    assert_eq!(numbers.last(), Some(&66));
}

#[test]
fn test_default_config_is_valid() {
    let config = GameConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.payout_slots(), 3);
    assert_eq!(
        config.building_cost(TerrainPair::new(TileType::Mountain, TileType::Mountain)),
        Ok(5)
    );
}

#[test]
fn test_config_rejects_unwinnable_driving_costs() {
    let config = GameConfig {
        dice_sides: 2,
        ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(GameError::Configuration(_))));

    let config = GameConfig {
        winning_credits: Vec::new(),
        ..GameConfig::default()
    };
    assert!(matches!(config.validate(), Err(GameError::Configuration(_))));
}

#[test]
fn test_random_dice_stays_in_range() {
    let mut dice = RandomDice::new_with_seed(6, 9);
    for _ in 0..200 {
        let roll = dice.roll();
        assert!((1..=6).contains(&roll));
    }
}

#[test]
fn test_hexagon_layout() {
    let layout = HexagonLayout {
        radius: 3,
        cities: 6,
        starting_cities: 2,
        seed: 21,
        ..HexagonLayout::default()
    };
    let grid = layout.build(GameConfig::default()).unwrap();
    assert_eq!(grid.tile_count(), 37);
    assert_eq!(grid.city_count(), 6);
    assert_eq!(grid.starting_cities().count(), 2);

    for city in grid.cities() {
        assert_eq!(grid.tile(&city.position).unwrap().kind, TileType::Plain);
        assert_eq!(city.roll_numbers.len(), 1);
    }
    let first = grid.city_with_roll_number(11).unwrap();
    assert!(first.is_starting_city);

    // Same seed, same board
    let again = layout.build(GameConfig::default()).unwrap();
    let kinds: Vec<_> = grid.tiles().map(|t| (t.position, t.kind)).collect();
    let kinds_again: Vec<_> = again.tiles().map(|t| (t.position, t.kind)).collect();
    assert_eq!(kinds, kinds_again);
}

#[test]
fn test_hexagon_layout_rejects_too_many_cities() {
    let layout = HexagonLayout {
        radius: 1,
        cities: 8,
        ..HexagonLayout::default()
    };
    assert!(layout.build(GameConfig::default()).is_err());
}
