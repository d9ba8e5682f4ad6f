//! Rail network cost model and ownership rules

use std::collections::BTreeMap;

use hexrail::game::{
    City, EdgeKey, GameConfig, GameError, PlayerId, RailNetwork, RailNetworkBuilder, TilePosition,
    TileType,
};

const A: PlayerId = PlayerId(0);
const B: PlayerId = PlayerId(1);

fn pos(q: i32, r: i32) -> TilePosition {
    TilePosition::new(q, r)
}

fn edge(a: (i32, i32), b: (i32, i32)) -> EdgeKey {
    EdgeKey::new(pos(a.0, a.1), pos(b.0, b.1))
}

/// Four plain tiles in a row from a starting city to a second city, with a
/// mountain below the two middle tiles
fn line_board() -> RailNetwork {
    RailNetworkBuilder::new()
        .tiles([pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)], TileType::Plain)
        .tile(pos(1, 1), TileType::Mountain)
        .city(City::new(pos(0, 0), "Start", true))
        .city(City::new(pos(3, 0), "End", false))
        .build(GameConfig::default())
        .unwrap()
}

#[test]
fn test_board_edges_follow_adjacency() {
    let grid = line_board();
    assert_eq!(grid.tile_count(), 5);
    assert_eq!(grid.edge_count(), 5);
    assert!(grid.edge(&edge((1, 0), (1, 1))).is_some());
    assert!(grid.edge(&edge((1, 1), (2, 0))).is_some());
    assert!(grid.edge(&edge((0, 0), (1, 1))).is_none());
    for rail_edge in grid.edges() {
        let [a, b] = rail_edge.key.positions();
        assert!(a.is_adjacent(&b));
    }
}

#[test]
fn test_building_cost_positive_and_symmetric() {
    let grid = line_board();
    for rail_edge in grid.edges() {
        let [a, b] = rail_edge.key.positions();
        let forward = grid.building_cost(&EdgeKey::new(a, b)).unwrap();
        let backward = grid.building_cost(&EdgeKey::new(b, a)).unwrap();
        assert!(forward > 0);
        assert_eq!(forward, backward);
    }
    assert_eq!(grid.building_cost(&edge((0, 0), (1, 0))).unwrap(), 1);
    assert_eq!(grid.building_cost(&edge((1, 0), (1, 1))).unwrap(), 3);
}

#[test]
fn test_driving_cost_requires_endpoint() {
    let grid = line_board();
    let key = edge((1, 0), (1, 1));
    assert_eq!(grid.driving_cost(&key, &pos(1, 0)).unwrap(), 2);
    assert_eq!(grid.driving_cost(&key, &pos(1, 1)).unwrap(), 2);
    assert!(matches!(
        grid.driving_cost(&key, &pos(3, 0)),
        Err(GameError::IllegalAction(_))
    ));
    assert!(matches!(
        grid.driving_cost(&edge((0, 0), (3, 0)), &pos(0, 0)),
        Err(GameError::UnknownEdge(_))
    ));
}

#[test]
fn test_missing_cost_entry_is_configuration_error() {
    let mut config = GameConfig::default();
    config.building_costs.clear();
    let result = RailNetworkBuilder::new()
        .tiles([pos(0, 0), pos(1, 0)], TileType::Plain)
        .build(config);
    assert!(matches!(result, Err(GameError::Configuration(_))));
}

#[test]
fn test_city_outside_map_is_rejected() {
    let result = RailNetworkBuilder::new()
        .tiles([pos(0, 0), pos(1, 0)], TileType::Plain)
        .city(City::new(pos(5, 5), "Nowhere", true))
        .build(GameConfig::default());
    assert_eq!(result.unwrap_err(), GameError::UnknownTile(pos(5, 5)));
}

#[test]
fn test_first_rail_must_touch_starting_city() {
    let mut grid = line_board();
    assert!(!grid.add_rail(&edge((1, 0), (2, 0)), A));
    assert!(!grid.has_rails(A));

    assert!(grid.add_rail(&edge((0, 0), (1, 0)), A));
    assert!(grid.add_rail(&edge((1, 0), (2, 0)), A));

    // Not connected to anything A owns
    assert!(!grid.add_rail(&edge((2, 0), (3, 0)), B));
}

#[test]
fn test_add_rail_twice_returns_false() {
    let mut grid = line_board();
    let key = edge((0, 0), (1, 0));
    assert!(grid.add_rail(&key, A));
    assert!(!grid.add_rail(&key, A));
    assert_eq!(grid.edge(&key).unwrap().owners(), &[A]);

    assert!(grid.add_rail(&key, B));
    assert_eq!(grid.edge(&key).unwrap().owners(), &[A, B]);
}

#[test]
fn test_remove_rail() {
    let mut grid = line_board();
    let key = edge((0, 0), (1, 0));
    grid.add_rail(&key, A);
    assert!(grid.remove_rail(&key, A));
    assert!(!grid.remove_rail(&key, A));
    assert!(!grid.has_rails(A));
}

#[test]
fn test_buildable_edges() {
    let mut grid = line_board();
    let start_edges = grid.buildable_edges(A, |_| true);
    assert_eq!(start_edges.into_iter().collect::<Vec<_>>(), vec![edge((0, 0), (1, 0))]);

    grid.add_rail(&edge((0, 0), (1, 0)), A);
    let next = grid.buildable_edges(A, |_| true);
    assert!(next.contains(&edge((1, 0), (2, 0))));
    assert!(next.contains(&edge((1, 0), (1, 1))));
    assert!(!next.contains(&edge((0, 0), (1, 0))));
    assert!(!next.contains(&edge((2, 0), (3, 0))));

    let cheap = grid.buildable_edges(A, |key| grid.building_cost(key).unwrap() <= 1);
    assert!(!cheap.contains(&edge((1, 0), (1, 1))));
}

#[test]
fn test_parallel_cost_on_plain_edge_is_full_fee() {
    let mut grid = line_board();
    grid.add_rail(&edge((0, 0), (1, 0)), A);
    grid.add_rail(&edge((1, 0), (2, 0)), A);

    // A is owed the through fee and a junction toll at (1, 0); only the larger counts
    let fees = grid.parallel_cost(&edge((1, 0), (2, 0)), B).unwrap();
    assert_eq!(fees, BTreeMap::from([(A, 5)]));
    assert_eq!(grid.total_building_cost(&edge((1, 0), (2, 0)), B).unwrap(), 6);
}

#[test]
fn test_parallel_cost_next_to_city_is_reduced() {
    let mut grid = line_board();
    grid.add_rail(&edge((0, 0), (1, 0)), A);
    grid.add_rail(&edge((1, 0), (2, 0)), A);

    let fees = grid.parallel_cost(&edge((0, 0), (1, 0)), B).unwrap();
    assert_eq!(fees, BTreeMap::from([(A, 3)]));
}

#[test]
fn test_junction_toll() {
    let mut grid = line_board();
    grid.add_rail(&edge((0, 0), (1, 0)), A);
    grid.add_rail(&edge((1, 0), (2, 0)), A);

    let fees = grid.parallel_cost(&edge((1, 0), (1, 1)), B).unwrap();
    assert_eq!(fees, BTreeMap::from([(A, 1)]));

    // No toll once B has its own rail at the junction
    grid.add_rail(&edge((0, 0), (1, 0)), B);
    let fees = grid.parallel_cost(&edge((1, 0), (1, 1)), B).unwrap();
    assert!(fees.is_empty());
}

#[test]
fn test_parallel_cost_empty_for_sole_owner() {
    let mut grid = line_board();
    grid.add_rail(&edge((0, 0), (1, 0)), A);
    assert!(grid.parallel_cost(&edge((0, 0), (1, 0)), A).unwrap().is_empty());
    assert!(grid.parallel_cost(&edge((0, 0), (1, 0)), B).unwrap().contains_key(&A));
}

#[test]
fn test_renting_cost() {
    let mut grid = line_board();
    let key = edge((0, 0), (1, 0));
    grid.add_rail(&key, A);
    grid.add_rail(&key, B);
    assert!(grid.renting_cost(&key, A).unwrap().is_empty());
    assert_eq!(
        grid.renting_cost(&key, PlayerId(2)).unwrap(),
        BTreeMap::from([(A, 1), (B, 1)])
    );
}

#[test]
fn test_connected_cities() {
    let mut grid = line_board();
    assert_eq!(grid.unconnected_cities().len(), 2);
    assert!(grid.connected_cities().is_empty());

    grid.add_rail(&edge((0, 0), (1, 0)), A);
    let connected: Vec<_> = grid.connected_cities().iter().map(|c| c.name.clone()).collect();
    assert_eq!(connected, vec!["Start".to_string()]);
    assert!(!grid.is_city_connected(&pos(3, 0)));
}

#[test]
fn test_connected_edges() {
    let grid = line_board();
    let around = grid.connected_edges(&edge((1, 0), (2, 0)));
    assert_eq!(around.len(), 4);
    assert!(!around.contains(&edge((1, 0), (2, 0))));
    assert!(around.contains(&edge((1, 1), (2, 0))));
}
