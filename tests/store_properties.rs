//! Property tests for the spatial store and pheromone bookkeeping

use ant_colony::core::config::ColonyConfig;
use ant_colony::core::types::{EntityId, GridPos};
use ant_colony::ecs::world::World;
use ant_colony::entity::factory::{make_ant, make_dirt, make_food, make_pheromone, make_stone};
use ant_colony::entity::kind::{AntSubType, EntityKind};
use ant_colony::entity::lifecycle::{pick_up_entity, put_down_entity};
use ant_colony::simulation::tick::run_tick;
use proptest::prelude::*;

const SIZE: i32 = 12;

#[derive(Debug, Clone)]
enum Op {
    AddDirt(i32, i32),
    AddFood(i32, i32),
    AddAnt(i32, i32),
    AddStone(i32, i32),
    Move(usize, i32, i32),
    Remove(usize),
    PickUp(usize, usize),
    PutDown(usize),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    let cell = 0..SIZE;
    prop_oneof![
        (cell.clone(), cell.clone()).prop_map(|(x, y)| Op::AddDirt(x, y)),
        (cell.clone(), cell.clone()).prop_map(|(x, y)| Op::AddFood(x, y)),
        (cell.clone(), cell.clone()).prop_map(|(x, y)| Op::AddAnt(x, y)),
        (cell.clone(), cell.clone()).prop_map(|(x, y)| Op::AddStone(x, y)),
        (any::<usize>(), cell.clone(), cell.clone()).prop_map(|(i, x, y)| Op::Move(i, x, y)),
        any::<usize>().prop_map(Op::Remove),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::PickUp(a, b)),
        any::<usize>().prop_map(Op::PutDown),
        Just(Op::Tick),
    ]
}

fn pick(world: &World, index: usize) -> Option<EntityId> {
    let ids: Vec<EntityId> = world.store.iter().map(|e| e.id).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn apply(world: &mut World, op: Op) {
    let config = world.config.clone();
    match op {
        Op::AddDirt(x, y) => {
            let _ = world.add_entity(make_dirt(GridPos::new(x, y)));
        }
        Op::AddFood(x, y) => {
            let _ = world.add_entity(make_food(GridPos::new(x, y), 20, "Crumb"));
        }
        Op::AddAnt(x, y) => {
            let _ = world.add_entity(make_ant(GridPos::new(x, y), AntSubType::Worker, &config));
        }
        Op::AddStone(x, y) => {
            let _ = world.add_entity(make_stone(GridPos::new(x, y), 2));
        }
        Op::Move(i, x, y) => {
            if let Some(id) = pick(world, i) {
                if world.get(id).map_or(false, |e| e.position.is_some()) {
                    world.store.move_entity(id, GridPos::new(x, y));
                }
            }
        }
        Op::Remove(i) => {
            if let Some(id) = pick(world, i) {
                world.remove_entity(id);
            }
        }
        Op::PickUp(a, b) => {
            let ants = world.ant_ids();
            if let (false, Some(target)) = (ants.is_empty(), pick(world, b)) {
                let ant = ants[a % ants.len()];
                if ant != target && world.get(target).map_or(false, |t| t.position.is_some()) {
                    let _ = pick_up_entity(&mut world.store, ant, target);
                }
            }
        }
        Op::PutDown(a) => {
            let ants = world.ant_ids();
            if !ants.is_empty() {
                let _ = put_down_entity(&mut world.store, ants[a % ants.len()]);
            }
        }
        Op::Tick => {
            run_tick(world);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_grid_and_buckets_stay_consistent(ops in proptest::collection::vec(op(), 1..60)) {
        let mut world = World::new(ColonyConfig::with_world_size(SIZE, SIZE));
        for op in ops {
            apply(&mut world, op);
            prop_assert_eq!(world.store.check_consistency(), Ok(()));
        }
        for entity in world.store.iter() {
            if let Some(pos) = entity.position {
                prop_assert!(world.store.lookup_in_grid(pos).contains(&entity.id));
            }
            prop_assert!(world.store.ids_of(entity.kind).contains(&entity.id));
        }
    }

    #[test]
    fn proptest_holding_is_symmetric(ops in proptest::collection::vec(op(), 1..60)) {
        let mut world = World::new(ColonyConfig::with_world_size(SIZE, SIZE));
        for op in ops {
            apply(&mut world, op);
        }
        for ant in world.ant_ids() {
            if let Some(held) = world.get(ant).and_then(|a| a.holding()) {
                let target = world.get(held);
                prop_assert!(target.map_or(false, |t| t.held_by.contains(&ant)));
            }
        }
        for entity in world.store.iter() {
            for holder in &entity.held_by {
                prop_assert_eq!(world.get(*holder).and_then(|h| h.holding()), Some(entity.id));
            }
        }
    }

    #[test]
    fn proptest_pheromones_stay_within_bounds(
        quantities in proptest::collection::vec(1i64..=520, 1..12),
        ant_cells in proptest::collection::vec((0..SIZE, 0..SIZE), 0..6),
        ticks in 1usize..200,
    ) {
        let mut world = World::new(ColonyConfig::with_world_size(SIZE, SIZE));
        let max = world.config.pheromone_max_quantity;
        let config = world.config.clone();
        for (i, quantity) in quantities.iter().enumerate() {
            let pos = GridPos::new(i as i32 % SIZE, 0);
            world.add_entity(make_pheromone(pos, 0.0, *quantity, None)).unwrap();
        }
        for id in world.store.ids_of(EntityKind::Pheromone) {
            let quantity = world.get(*id).and_then(|p| p.pheromone()).map(|p| p.quantity);
            prop_assert!(matches!(quantity, Some(q) if q > 0 && q <= max));
        }
        for (x, y) in ant_cells {
            world.add_entity(make_ant(GridPos::new(x, y), AntSubType::Worker, &config)).unwrap();
        }

        for _ in 0..ticks {
            run_tick(&mut world);
            for id in world.store.ids_of(EntityKind::Pheromone) {
                let quantity = world.get(*id).and_then(|p| p.pheromone()).map(|p| p.quantity);
                prop_assert!(matches!(quantity, Some(q) if q > 0 && q <= max));
            }
        }
    }
}
