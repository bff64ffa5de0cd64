use grid_astar::{build_grid, Cell, Search, SearchResult};

// Runs a search on a 10x10 grid with a wall and prints every iteration, with
// - S/G the start and goal
// - # obstacles
// - o open and x closed cells
// - * the final path
//
// Set RUST_LOG=debug to also see the search log.

fn render(search: &Search, path: &[Cell]) -> String {
    let grid = search.grid();
    let mut out = String::new();
    for row in 0..grid.size() {
        for col in 0..grid.size() {
            let cell = Cell::new(row, col);
            let symbol = if cell == search.start() {
                'S'
            } else if cell == search.goal() {
                'G'
            } else if !grid.is_traversable(cell) {
                '#'
            } else if path.contains(&cell) {
                '*'
            } else if search.is_closed(cell) {
                'x'
            } else if search.is_open(cell) {
                'o'
            } else {
                '.'
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

fn main() -> grid_astar::Result<()> {
    env_logger::init();
    let mut grid = build_grid(10, 500)?;
    grid.set_start(1, 1)?;
    grid.set_goal(8, 8)?;
    for col in 0..8 {
        grid.set_obstacle(5, col, true)?;
    }
    println!("{grid}");

    let (start, goal) = (Cell::new(1, 1), Cell::new(8, 8));
    let mut search = Search::new(&grid, start, goal)?;
    let result = search.run(|s| {
        println!("Iteration {}:\n{}", s.iterations(), render(s, &[]));
    })?;
    match result {
        SearchResult::Found(path) => {
            println!("Path of length {}:\n{}", path.length(), render(&search, path.cells()));
        }
        SearchResult::NotFound => println!("No path found"),
    }
    Ok(())
}
