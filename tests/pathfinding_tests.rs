//! Restricted path search and driving reachability

use std::collections::BTreeSet;

use hexrail::game::pathfinding::{find_path, path_cost, path_tiles, reachable_tiles};
use hexrail::game::{
    driving_cost_fn, City, EdgeKey, GameConfig, GameError, RailNetwork, RailNetworkBuilder, TilePosition,
    TileType,
};

fn pos(q: i32, r: i32) -> TilePosition {
    TilePosition::new(q, r)
}

fn edge(a: (i32, i32), b: (i32, i32)) -> EdgeKey {
    EdgeKey::new(pos(a.0, a.1), pos(b.0, b.1))
}

/// A straight plain chain (0,0)..(3,0) with a mountain detour through (1,1)
fn chain_board() -> RailNetwork {
    RailNetworkBuilder::new()
        .tiles([pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)], TileType::Plain)
        .tile(pos(1, 1), TileType::Mountain)
        .city(City::new(pos(0, 0), "Start", true))
        .city(City::new(pos(3, 0), "End", false))
        .build(GameConfig::default())
        .unwrap()
}

fn all_edges(grid: &RailNetwork) -> BTreeSet<EdgeKey> {
    grid.edges().map(|e| e.key).collect()
}

#[test]
fn test_find_path_takes_cheapest_route() {
    let grid = chain_board();
    let allowed = all_edges(&grid);
    let path = find_path(&grid, pos(0, 0), pos(3, 0), &allowed, driving_cost_fn(&grid)).unwrap();
    assert_eq!(
        path,
        vec![edge((0, 0), (1, 0)), edge((1, 0), (2, 0)), edge((2, 0), (3, 0))]
    );
    assert_eq!(path_cost(pos(0, 0), &path, driving_cost_fn(&grid)), Ok(3));
}

#[test]
fn test_find_path_respects_allowed_edges() {
    let grid = chain_board();
    let mut allowed = all_edges(&grid);
    allowed.remove(&edge((1, 0), (2, 0)));

    let path = find_path(&grid, pos(0, 0), pos(3, 0), &allowed, driving_cost_fn(&grid)).unwrap();
    assert_eq!(
        path_tiles(pos(0, 0), &path),
        vec![pos(0, 0), pos(1, 0), pos(1, 1), pos(2, 0), pos(3, 0)]
    );
    // Two plain steps plus two plain-mountain steps
    assert_eq!(path_cost(pos(0, 0), &path, driving_cost_fn(&grid)), Ok(6));
}

#[test]
fn test_find_path_empty_when_unreachable() {
    let grid = chain_board();
    let allowed: BTreeSet<EdgeKey> = [edge((0, 0), (1, 0)), edge((2, 0), (3, 0))].into();
    let path = find_path(&grid, pos(0, 0), pos(3, 0), &allowed, driving_cost_fn(&grid)).unwrap();
    assert!(path.is_empty());
    let path = find_path(&grid, pos(0, 0), pos(0, 0), &all_edges(&grid), |_, _| Ok(1)).unwrap();
    assert!(path.is_empty());
}

#[test]
fn test_find_path_uses_given_cost_function() {
    let grid = chain_board();
    let allowed = all_edges(&grid);
    // Make the direct middle step prohibitively expensive
    let middle = edge((1, 0), (2, 0));
    let path = find_path(&grid, pos(0, 0), pos(3, 0), &allowed, |from, to| {
        if EdgeKey::new(from, to) == middle {
            Ok(100)
        } else {
            Ok(1)
        }
    })
    .unwrap();
    assert_eq!(path.len(), 4);
    assert!(!path.contains(&middle));
}

#[test]
fn test_find_path_reports_cost_errors() {
    let grid = chain_board();
    let result = find_path(&grid, pos(0, 0), pos(3, 0), &all_edges(&grid), |_, _| {
        Err(GameError::Configuration("no price".to_string()))
    });
    assert!(matches!(result, Err(GameError::Configuration(_))));
}

#[test]
fn test_reachable_tiles_short_circuits_on_target() {
    let grid = chain_board();
    let allowed: BTreeSet<EdgeKey> = [
        edge((0, 0), (1, 0)),
        edge((1, 0), (2, 0)),
        edge((2, 0), (3, 0)),
    ]
    .into();

    let reachable = reachable_tiles(&grid, pos(0, 0), &allowed, 5, Some(pos(3, 0))).unwrap();
    assert_eq!(reachable.len(), 1);
    let route = &reachable[&pos(3, 0)];
    assert_eq!(route.cost, 3);
    assert_eq!(route.tiles, vec![pos(0, 0), pos(1, 0), pos(2, 0), pos(3, 0)]);
    assert_eq!(route.destination(), Some(pos(3, 0)));
}

#[test]
fn test_reachable_tiles_use_the_whole_roll() {
    let grid = chain_board();
    let allowed = all_edges(&grid);

    let reachable = reachable_tiles(&grid, pos(0, 0), &allowed, 2, Some(pos(3, 0))).unwrap();
    let tiles: Vec<_> = reachable.keys().copied().collect();
    assert_eq!(tiles, vec![pos(2, 0)]);
    assert_eq!(reachable[&pos(2, 0)].cost, 2);
    assert_eq!(reachable[&pos(2, 0)].tiles, vec![pos(0, 0), pos(1, 0), pos(2, 0)]);

    // The mountain costs 1 + 2; (1,0) and (2,0) are only passed through
    let reachable = reachable_tiles(&grid, pos(0, 0), &allowed, 3, None).unwrap();
    let tiles: Vec<_> = reachable.keys().copied().collect();
    assert_eq!(tiles, vec![pos(1, 1), pos(3, 0)]);
    assert_eq!(reachable[&pos(1, 1)].cost, 3);
    assert_eq!(reachable[&pos(3, 0)].cost, 3);
}

#[test]
fn test_reachable_tiles_empty_when_roll_overshoots() {
    let grid = chain_board();
    let allowed: BTreeSet<EdgeKey> = [edge((0, 0), (1, 0)), edge((1, 0), (2, 0))].into();
    // Dead end at cost 2, nothing costs exactly 4
    let reachable = reachable_tiles(&grid, pos(0, 0), &allowed, 4, Some(pos(3, 0))).unwrap();
    assert!(reachable.is_empty());
}

#[test]
fn test_reachable_tiles_nothing_without_budget() {
    let grid = chain_board();
    let reachable = reachable_tiles(&grid, pos(0, 0), &all_edges(&grid), 0, None).unwrap();
    assert!(reachable.is_empty());
}
