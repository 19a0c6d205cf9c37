/// Room loader.
///
/// Rooms are embedded as ASCII art, 16 columns by 11 rows:
///
/// ## Tile legend:
///   '%' = Block (solid)    '#' = Ladder    ' ' = Empty
///
/// A room compiles to a flat row-major byte map. Block bytes then get
/// their connection bits (+1 up, +2 right, +4 down, +8 left) so the
/// renderer can draw joined walls; collision ignores those bits.
///
/// The start cell is where the player appears. The exit door is drawn
/// over the start cell and the one above it, closed until the room's
/// roster runs out.

use tracing::info;

use crate::domain::ai::Spawner;
use crate::domain::entity::{EnemyKind, Pos};
use crate::domain::tile::{
    Metatile, CONNECT_DOWN, CONNECT_LEFT, CONNECT_RIGHT, CONNECT_UP, MT_BLOCK, MT_DOOR, MT_EMPTY,
    MT_LADDER,
};
use crate::error::LevelError;
use crate::sim::plane::{MetatilePlane, BANK_COLUMNS};
use crate::sim::world::{Phase, WorldState};

pub const ROOM_COLUMNS: usize = BANK_COLUMNS;
pub const ROOM_ROWS: usize = 11;

/// Mercy ticks the player gets on entering a room.
const ENTRY_MERCY_TICKS: u32 = 60;

pub struct RoomDef {
    pub name: &'static str,
    pub map: &'static [&'static str],
    /// Start cell; also the bottom half of the exit door.
    pub start: (i32, i32),
    pub roster: &'static [EnemyKind],
    /// Most enemies alive at once.
    pub limit: usize,
    /// Start the roster over when it runs out instead of ending it.
    pub looped: bool,
}

use EnemyKind::{Burger, Pecker, Plodder, Sneaker, Spinner};

// ══════════════════════════════════════════════════════════════
// Embedded rooms
// ══════════════════════════════════════════════════════════════

pub static ROOMS: &[RoomDef] = &[
    RoomDef {
        name: "Warehouse",
        map: &[
            "%%%%%%    %%%%%%",
            "                ",
            "                ",
            "  %%#%%  %%#%%  ",
            "    #      #    ",
            "    #      #    ",
            "    #      #    ",
            "%%%%%%#  #%%%%%%",
            "      #  #      ",
            "      #  #      ",
            "%%%%%%%%%%%%%%%%",
        ],
        start: (1, 9),
        roster: &[Plodder, Plodder, Plodder],
        limit: 2,
        looped: false,
    },
    RoomDef {
        name: "Scaffold",
        map: &[
            "%%%%%%%  %%%%%%%",
            "                ",
            "                ",
            "#%%%%      %%%%#",
            "#              #",
            "#   %%#%%#%%   #",
            "#     #  #     #",
            "%%%   #  #   %%%",
            "      #  #      ",
            "      #  #      ",
            "%%%%%%%%%%%%%%%%",
        ],
        start: (14, 9),
        roster: &[Plodder, Pecker, Plodder, Spinner, Pecker],
        limit: 2,
        looped: false,
    },
    RoomDef {
        name: "Crossing",
        map: &[
            "%%%    %%    %%%",
            "                ",
            "                ",
            "%%%#%%    %%#%%%",
            "   #        #   ",
            "   #  %%%%  #   ",
            "   #        #   ",
            "%%%%%%#  #%%%%%%",
            "      #  #      ",
            "      #  #      ",
            "%%%%%%%%%%%%%%%%",
        ],
        start: (1, 9),
        roster: &[Sneaker, Pecker, Burger, Sneaker, Plodder],
        limit: 3,
        looped: false,
    },
];

pub fn room_count() -> usize {
    ROOMS.len()
}

// ══════════════════════════════════════════════════════════════
// Map compilation
// ══════════════════════════════════════════════════════════════

/// ASCII rows → flat byte map, 16 bytes per row. Short rows are padded
/// with empty cells and long rows are cut.
pub fn compile_map(rows: &[&str]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rows.len() * ROOM_COLUMNS);
    for row in rows {
        let mut cells: Vec<u8> = row
            .chars()
            .take(ROOM_COLUMNS)
            .map(|ch| match ch {
                '%' => MT_BLOCK,
                '#' => MT_LADDER,
                _ => MT_EMPTY,
            })
            .collect();
        cells.resize(ROOM_COLUMNS, MT_EMPTY);
        out.extend(cells);
    }
    connect_blocks(&mut out);
    out
}

/// Recompute the connection bits of every block in a flat map.
pub fn connect_blocks(map: &mut [u8]) {
    for b in map.iter_mut().filter(|b| Metatile(**b).is_block()) {
        *b = MT_BLOCK;
    }

    for row in map.chunks_mut(ROOM_COLUMNS) {
        for x in 1..row.len() {
            if Metatile(row[x - 1]).is_block() && Metatile(row[x]).is_block() {
                row[x - 1] |= CONNECT_RIGHT;
                row[x] |= CONNECT_LEFT;
            }
        }
    }

    for i in 0..map.len().saturating_sub(ROOM_COLUMNS) {
        let below = i + ROOM_COLUMNS;
        if Metatile(map[i]).is_block() && Metatile(map[below]).is_block() {
            map[i] |= CONNECT_DOWN;
            map[below] |= CONNECT_UP;
        }
    }
}

/// Copy a flat map into the top rows of the plane.
pub fn load_mapdata(plane: &mut MetatilePlane, map: &[u8]) -> Result<(), LevelError> {
    let rows = map.len() / ROOM_COLUMNS;
    if map.len() % ROOM_COLUMNS != 0 || rows > plane.rows() {
        return Err(LevelError::MapSize { len: map.len(), rows: plane.rows() });
    }
    for (y, row) in map.chunks(ROOM_COLUMNS).enumerate() {
        plane.set_row(0, y as i32, row.iter().copied());
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Start a fresh game in `start_room`.
pub fn new_game(world: &mut WorldState, start_room: usize, health: u32) -> Result<(), LevelError> {
    *world = WorldState::new(health.max(1));
    load_room(world, start_room)
}

/// Load a room into the world. Preserves score and health.
pub fn load_room(world: &mut WorldState, index: usize) -> Result<(), LevelError> {
    let def = ROOMS
        .get(index)
        .ok_or(LevelError::UnknownRoom { index, count: ROOMS.len() })?;
    install_room(world, index, def)
}

/// Move on to the room after the current one, or finish the game.
pub fn advance_room(world: &mut WorldState) -> Result<(), LevelError> {
    let next = world.room_index + 1;
    if next >= ROOMS.len() {
        world.phase = Phase::GameComplete;
        world.set_message("ALL ROOMS CLEAR!", 0);
        info!(score = world.score, "game_complete");
        return Ok(());
    }
    load_room(world, next)
}

fn install_room(world: &mut WorldState, index: usize, def: &RoomDef) -> Result<(), LevelError> {
    let (sx, sy) = def.start;
    if !(0..ROOM_COLUMNS as i32).contains(&sx) || !(1..ROOM_ROWS as i32).contains(&sy) {
        return Err(LevelError::StartOutOfBounds { x: sx, y: sy });
    }
    let map = compile_map(def.map);
    load_mapdata(&mut world.plane, &map)?;

    world.clear_objs();
    world.plane.set_col(sx, sy - 1, [MT_DOOR, MT_DOOR + 1]);
    world.exit = Some((sx, sy));
    world.player.body.pos = Some(Pos::standing_in(sx, sy));
    world.player.body.mercy_time = ENTRY_MERCY_TICKS;
    world.spawner = Some(Spawner::new(def.roster.to_vec(), def.limit, def.looped));

    world.room_index = index;
    world.room_name = def.name.to_string();
    world.phase = Phase::Playing;
    world.set_message(&format!("Room {}: {}", index + 1, def.name), 120);

    info!(room = %def.name, index, enemies = def.roster.len(), "room_loaded");
    Ok(())
}
