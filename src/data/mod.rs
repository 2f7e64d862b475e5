#[derive(Debug, Clone, Copy, Default)]
pub struct Cell {
    pub mine: bool,
    pub flag: bool,
    pub open: bool,
    pub adjacent: u8,
}

#[derive(Debug)]
pub struct Field {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub revealed: usize,
    pub cells: Vec<Cell>,
}
