use grid_astar::{build_grid, SearchResult};

// In this example the goal is enclosed by obstacles:
//  _____
// |S    |
// |  #  |
// | #G# |
// |  #  |
// |     |
//  _____
// The search expands every reachable cell and then reports that no path exists.

fn main() -> grid_astar::Result<()> {
    env_logger::init();
    let mut grid = build_grid(5, 500)?;
    grid.set_start(0, 0)?;
    grid.set_goal(2, 2)?;
    for (row, col) in [(1, 2), (2, 1), (2, 3), (3, 2)] {
        grid.set_obstacle(row, col, true)?;
    }
    println!("{grid}");
    let mut iterations = 0;
    match grid.run_search(|_| iterations += 1)? {
        SearchResult::Found(path) => println!("Path: {:?}", path.cells()),
        SearchResult::NotFound => println!("No path found after {iterations} iterations"),
    }
    Ok(())
}
