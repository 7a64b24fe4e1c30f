//! Per-cell collision resolution.
//!
//! The outcome is a pure function of the multiset of live object kinds
//! sharing the cell, applied in priority order: mine explosions first, then
//! tank pile-ups, then shell impacts. Destroyed objects stay in the cell,
//! marked, until the end-of-round purge so that same-round reporting can
//! still observe them.

use tank_clash_core::{Event, Position};

use crate::arena::{Arena, ObjectId};
use crate::objects::GameObject;

/// Resolves every interaction among the occupants of one cell.
pub(crate) fn resolve_cell(
    arena: &mut Arena,
    at: Position,
    occupants: &[ObjectId],
    out_events: &mut Vec<Event>,
) {
    let mut mines = Vec::new();
    let mut tanks = Vec::new();
    let mut shells = Vec::new();
    let mut walls = Vec::new();

    for &id in occupants {
        let Some(object) = arena.get(id) else {
            continue;
        };
        if object.is_destroyed() {
            continue;
        }
        match object {
            GameObject::Mine(_) => mines.push(id),
            GameObject::Tank(_) => tanks.push(id),
            GameObject::Shell(_) => shells.push(id),
            GameObject::Wall(_) => walls.push(id),
        }
    }

    // Mine explosion takes everything in the cell with it.
    if !mines.is_empty() && !tanks.is_empty() {
        out_events.push(Event::MineDetonated { at });
        for &id in occupants {
            destroy(arena, at, id, out_events);
        }
        return;
    }

    // A tank pile-up destroys all tanks and nothing else.
    if tanks.len() >= 2 {
        for &id in &tanks {
            destroy(arena, at, id, out_events);
        }
        return;
    }

    if shells.is_empty() {
        return;
    }

    // Every shell strikes every wall once.
    for &wall_id in &walls {
        for _ in &shells {
            damage_wall(arena, at, wall_id, out_events);
        }
    }

    for &tank_id in &tanks {
        destroy(arena, at, tank_id, out_events);
    }

    let shells_collide = shells.len() >= 2;
    if !walls.is_empty() || !tanks.is_empty() || shells_collide {
        for &shell_id in &shells {
            destroy(arena, at, shell_id, out_events);
        }
    }
}

fn destroy(arena: &mut Arena, at: Position, id: ObjectId, out_events: &mut Vec<Event>) {
    let Some(object) = arena.get_mut(id) else {
        return;
    };
    if object.is_destroyed() {
        return;
    }
    object.destroy();
    match arena.object(id) {
        GameObject::Tank(tank) => out_events.push(Event::TankDestroyed {
            tank: tank.id,
            player: tank.player,
            at,
        }),
        GameObject::Shell(_) => out_events.push(Event::ShellDestroyed { at }),
        GameObject::Wall(_) => out_events.push(Event::WallDestroyed { at }),
        GameObject::Mine(_) => {}
    }
}

fn damage_wall(arena: &mut Arena, at: Position, id: ObjectId, out_events: &mut Vec<Event>) {
    let Some(GameObject::Wall(wall)) = arena.get_mut(id) else {
        return;
    };
    if wall.destroyed {
        return;
    }
    wall.damage();
    out_events.push(Event::WallDamaged { at, hits: wall.hits });
    if wall.destroyed {
        out_events.push(Event::WallDestroyed { at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Mine, Shell, Tank, Wall};
    use tank_clash_core::{Direction, PlayerId, TankId};

    fn cell_at() -> Position {
        Position::new(1, 1)
    }

    fn tank(arena: &mut Arena, id: u32, player: PlayerId) -> ObjectId {
        arena.insert(GameObject::Tank(Tank::new(
            TankId::new(id),
            player,
            0,
            cell_at(),
            4,
        )))
    }

    fn shell(arena: &mut Arena) -> ObjectId {
        arena.insert(GameObject::Shell(Shell::new(
            cell_at(),
            Direction::East,
            PlayerId::One,
        )))
    }

    #[test]
    fn mine_and_tank_destroy_every_occupant() {
        let mut arena = Arena::new();
        let mine = arena.insert(GameObject::Mine(Mine::new(cell_at())));
        let tank = tank(&mut arena, 0, PlayerId::One);
        let shell = shell(&mut arena);
        let mut events = Vec::new();

        resolve_cell(&mut arena, cell_at(), &[mine, tank, shell], &mut events);

        assert!(arena.object(mine).is_destroyed());
        assert!(arena.object(tank).is_destroyed());
        assert!(arena.object(shell).is_destroyed());
        assert!(events.contains(&Event::MineDetonated { at: cell_at() }));
    }

    #[test]
    fn two_tanks_destroy_each_other_and_nothing_else() {
        let mut arena = Arena::new();
        let first = tank(&mut arena, 0, PlayerId::One);
        let second = tank(&mut arena, 1, PlayerId::Two);
        let mut events = Vec::new();

        resolve_cell(&mut arena, cell_at(), &[first, second], &mut events);

        assert!(arena.object(first).is_destroyed());
        assert!(arena.object(second).is_destroyed());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn shell_damages_wall_and_dies() {
        let mut arena = Arena::new();
        let wall = arena.insert(GameObject::Wall(Wall::new(cell_at())));
        let shell = shell(&mut arena);
        let mut events = Vec::new();

        resolve_cell(&mut arena, cell_at(), &[wall, shell], &mut events);

        assert!(!arena.object(wall).is_destroyed());
        assert!(arena.object(shell).is_destroyed());
        assert!(events.contains(&Event::WallDamaged {
            at: cell_at(),
            hits: 1,
        }));
    }

    #[test]
    fn second_shell_hit_collapses_the_wall() {
        let mut arena = Arena::new();
        let wall = arena.insert(GameObject::Wall(Wall::new(cell_at())));
        let mut events = Vec::new();

        let first = shell(&mut arena);
        resolve_cell(&mut arena, cell_at(), &[wall, first], &mut events);
        let second = shell(&mut arena);
        resolve_cell(&mut arena, cell_at(), &[wall, second], &mut events);

        assert!(arena.object(wall).is_destroyed());
        assert!(events.contains(&Event::WallDestroyed { at: cell_at() }));
    }

    #[test]
    fn shell_overflies_a_lone_mine() {
        let mut arena = Arena::new();
        let mine = arena.insert(GameObject::Mine(Mine::new(cell_at())));
        let shell = shell(&mut arena);
        let mut events = Vec::new();

        resolve_cell(&mut arena, cell_at(), &[mine, shell], &mut events);

        assert!(!arena.object(mine).is_destroyed());
        assert!(!arena.object(shell).is_destroyed());
        assert!(events.is_empty());
    }

    #[test]
    fn shells_sharing_a_cell_all_die() {
        let mut arena = Arena::new();
        let first = shell(&mut arena);
        let second = shell(&mut arena);
        let mut events = Vec::new();

        resolve_cell(&mut arena, cell_at(), &[first, second], &mut events);

        assert!(arena.object(first).is_destroyed());
        assert!(arena.object(second).is_destroyed());
    }

    #[test]
    fn outcome_is_independent_of_occupant_order() {
        for flipped in [false, true] {
            let mut arena = Arena::new();
            let tank = tank(&mut arena, 0, PlayerId::Two);
            let shell = shell(&mut arena);
            let mut events = Vec::new();
            let occupants = if flipped { [shell, tank] } else { [tank, shell] };

            resolve_cell(&mut arena, cell_at(), &occupants, &mut events);

            assert!(arena.object(tank).is_destroyed());
            assert!(arena.object(shell).is_destroyed());
        }
    }
}
