use evac_route::{BfsSolver, CostGrid, Position, RouteSolver, WALL};

// In this example a route is found to one of two exits on a 3x3 grid with shape
//  ___
// |S G|
// | # |
// |  G|
//  ___
// where
// - # marks a wall
// - S marks the start
// - G marks an exit
// The found route moves to the closest exit, which is the top one.

fn main() {
    let grid = CostGrid::new(vec![vec![1, 1, 1], vec![1, WALL, 1], vec![1, 1, 1]]).unwrap();
    println!("{}", grid);
    let start = Position::new(0, 0);
    let goals = [Position::new(0, 2), Position::new(2, 2)];
    let route = BfsSolver.solve(&grid, start, &goals).unwrap().unwrap();
    println!("Selected exit: {}\n", route.goal);
    println!("Route:");
    for p in &route.path {
        println!("{}", p);
    }
}
