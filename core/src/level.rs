use crate::GridSize;

/// Grid dimensions per level, smallest first. Every entry has an even card total.
pub const LEVEL_TABLE: [GridSize; 7] = [
    GridSize::new_unchecked(2, 2),
    GridSize::new_unchecked(2, 3),
    GridSize::new_unchecked(3, 4),
    GridSize::new_unchecked(4, 4),
    GridSize::new_unchecked(4, 5),
    GridSize::new_unchecked(5, 6),
    GridSize::new_unchecked(6, 6),
];

pub const FIRST_LEVEL: u32 = 1;

/// Grid size for a level. Levels past the table keep the largest size, level 0 counts as level 1.
pub fn grid_size_for(level: u32) -> GridSize {
    let index = (level.max(FIRST_LEVEL) - 1) as usize;
    LEVEL_TABLE[index.min(LEVEL_TABLE.len() - 1)]
}
