use crate::constants::{
    GRID_COLS, GRID_ROWS, TILE_SIZE, TUNNEL_EAST_START_COL, TUNNEL_ROW, TUNNEL_WEST_END_COL,
};
use crate::types::BoardInit;

const LAYOUT: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###--### ##.######",
    "######.## #HHHHHH# ##.######",
    "      .   #HHHHHH#   .      ",
    "######.## #HHHHHH# ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Path,
    Dot,
    PowerPellet,
    GhostHouse,
    Door,
}

pub fn tile_coords(px: f32, py: f32) -> (i32, i32) {
    (
        (px / TILE_SIZE).floor() as i32,
        (py / TILE_SIZE).floor() as i32,
    )
}

pub fn tile_center(col: i32, row: i32) -> (f32, f32) {
    (
        col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

#[derive(Clone, Debug)]
pub struct Maze {
    tiles: Vec<Vec<Tile>>,
    remaining_dots: i32,
    total_dots: i32,
    remaining_pellets: i32,
    total_pellets: i32,
}

impl Maze {
    pub fn new() -> Self {
        let mut tiles = Vec::with_capacity(GRID_ROWS as usize);
        let mut total_dots = 0;
        let mut total_pellets = 0;
        for line in LAYOUT.iter() {
            let mut row = Vec::with_capacity(GRID_COLS as usize);
            for ch in line.chars() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    '.' => Tile::Dot,
                    'o' => Tile::PowerPellet,
                    'H' => Tile::GhostHouse,
                    '-' => Tile::Door,
                    _ => Tile::Path,
                };
                if tile == Tile::Dot {
                    total_dots += 1;
                }
                if tile == Tile::PowerPellet {
                    total_pellets += 1;
                }
                row.push(tile);
            }
            tiles.push(row);
        }
        Self {
            tiles,
            remaining_dots: total_dots,
            total_dots,
            remaining_pellets: total_pellets,
            total_pellets,
        }
    }

    pub fn tile_at(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col >= GRID_COLS || row >= GRID_ROWS {
            return Tile::Wall;
        }
        self.tiles[row as usize][col as usize]
    }

    pub fn is_wall(&self, px: f32, py: f32, for_adversary: bool) -> bool {
        let (col, row) = tile_coords(px, py);
        if col < 0 || col >= GRID_COLS {
            return row != TUNNEL_ROW;
        }
        if row < 0 || row >= GRID_ROWS {
            return true;
        }
        match self.tiles[row as usize][col as usize] {
            Tile::Wall => true,
            Tile::Door | Tile::GhostHouse => !for_adversary,
            _ => false,
        }
    }

    pub fn is_path(&self, px: f32, py: f32) -> bool {
        let (col, row) = tile_coords(px, py);
        if col < 0 || col >= GRID_COLS {
            return row == TUNNEL_ROW;
        }
        if row < 0 || row >= GRID_ROWS {
            return false;
        }
        matches!(
            self.tiles[row as usize][col as usize],
            Tile::Path | Tile::Dot | Tile::PowerPellet
        )
    }

    pub fn is_ghost_house(&self, px: f32, py: f32) -> bool {
        let (col, row) = tile_coords(px, py);
        self.tile_at(col, row) == Tile::GhostHouse
    }

    pub fn is_door(&self, px: f32, py: f32) -> bool {
        let (col, row) = tile_coords(px, py);
        self.tile_at(col, row) == Tile::Door
    }

    pub fn is_tunnel(&self, px: f32, py: f32) -> bool {
        let (col, row) = tile_coords(px, py);
        row == TUNNEL_ROW && (col < TUNNEL_WEST_END_COL || col >= TUNNEL_EAST_START_COL)
    }

    pub fn consume_dot(&mut self, px: f32, py: f32) -> bool {
        let (col, row) = tile_coords(px, py);
        if self.tile_at(col, row) != Tile::Dot {
            return false;
        }
        self.tiles[row as usize][col as usize] = Tile::Path;
        self.remaining_dots -= 1;
        true
    }

    pub fn consume_power_pellet(&mut self, px: f32, py: f32) -> bool {
        let (col, row) = tile_coords(px, py);
        if self.tile_at(col, row) != Tile::PowerPellet {
            return false;
        }
        self.tiles[row as usize][col as usize] = Tile::Path;
        self.remaining_pellets -= 1;
        true
    }

    pub fn set_tile(&mut self, col: i32, row: i32, tile: Tile) {
        if col < 0 || row < 0 || col >= GRID_COLS || row >= GRID_ROWS {
            return;
        }
        let old = self.tiles[row as usize][col as usize];
        if old == tile {
            return;
        }
        match old {
            Tile::Dot => {
                self.remaining_dots -= 1;
                self.total_dots -= 1;
            }
            Tile::PowerPellet => {
                self.remaining_pellets -= 1;
                self.total_pellets -= 1;
            }
            _ => {}
        }
        match tile {
            Tile::Dot => {
                self.remaining_dots += 1;
                self.total_dots += 1;
            }
            Tile::PowerPellet => {
                self.remaining_pellets += 1;
                self.total_pellets += 1;
            }
            _ => {}
        }
        self.tiles[row as usize][col as usize] = tile;
    }

    pub fn apply_kill_screen_corruption(&mut self) {
        for row in 0..GRID_ROWS {
            for col in (GRID_COLS / 2)..GRID_COLS {
                if (12..=16).contains(&row) && (10..=17).contains(&col) {
                    continue;
                }
                let tile = match (row * 31 + col * 7) % 4 {
                    0 => Tile::Wall,
                    1 => Tile::Dot,
                    _ => Tile::Path,
                };
                self.set_tile(col, row, tile);
            }
        }
    }

    pub fn remaining_dots(&self) -> i32 {
        self.remaining_dots
    }

    pub fn total_dots(&self) -> i32 {
        self.total_dots
    }

    pub fn remaining_power_pellets(&self) -> i32 {
        self.remaining_pellets
    }

    pub fn total_power_pellets(&self) -> i32 {
        self.total_pellets
    }

    // Only dots gate completion; uneaten power pellets do not hold the level
    // open.
    pub fn is_complete(&self) -> bool {
        self.remaining_dots == 0
    }

    pub fn nearest_dot(&self, px: f32, py: f32) -> Option<(f32, f32)> {
        let mut best: Option<(f32, f32, f32)> = None;
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let tile = self.tiles[row as usize][col as usize];
                if tile != Tile::Dot && tile != Tile::PowerPellet {
                    continue;
                }
                let (cx, cy) = tile_center(col, row);
                let dist = (cx - px) * (cx - px) + (cy - py) * (cy - py);
                if best.map(|b| dist < b.0).unwrap_or(true) {
                    best = Some((dist, cx, cy));
                }
            }
        }
        best.map(|(_, cx, cy)| (cx, cy))
    }

    pub fn render_rows(&self) -> Vec<String> {
        self.tiles
            .iter()
            .map(|row| {
                row.iter()
                    .map(|tile| match tile {
                        Tile::Wall => '#',
                        Tile::Path => ' ',
                        Tile::Dot => '.',
                        Tile::PowerPellet => 'o',
                        Tile::GhostHouse => 'H',
                        Tile::Door => '-',
                    })
                    .collect::<String>()
            })
            .collect()
    }

    pub fn board_init(&self) -> BoardInit {
        BoardInit {
            width: GRID_COLS * TILE_SIZE as i32,
            height: GRID_ROWS * TILE_SIZE as i32,
            tile_size: TILE_SIZE as i32,
            rows: self.render_rows(),
            total_dots: self.total_dots,
            total_power_pellets: self.total_pellets,
        }
    }
}

impl Default for Maze {
    fn default() -> Self {
        Self::new()
    }
}
