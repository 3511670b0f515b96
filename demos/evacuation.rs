use evac_route::{
    AntColonyConfig, AntColonySolver, BfsSolver, DfsSolver, Position, RouteSolver,
};
use evac_route_maps::{load_maze, parse_maze, render_ascii};

// Routes an evacuee across a city district to the nearest of two shelters with all three
// strategies. Pass a map file as the first argument to use another district; the map format is
// described in evac_route_maps.

const DISTRICT: &str = include_str!("maps/district.txt");

fn main() {
    let grid = match std::env::args().nth(1) {
        Some(path) => load_maze(path),
        None => parse_maze(DISTRICT),
    }
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    let start = Position::new(20, 12);
    let goals = [Position::new(0, 8), Position::new(3, 16)];

    let aco = AntColonySolver::new(AntColonyConfig::default()).with_observer(|report| {
        if report.iteration % 10 == 0 {
            match (report.best_cost, report.best_goal) {
                (Some(cost), Some(goal)) => println!(
                    "Iteration {}/{}, best cost so far: {} towards {}",
                    report.iteration, report.iteration_count, cost, goal
                ),
                _ => println!(
                    "Iteration {}/{}, no route found yet",
                    report.iteration, report.iteration_count
                ),
            }
        }
    });
    let mut solvers: Vec<Box<dyn RouteSolver>> =
        vec![Box::new(BfsSolver), Box::new(DfsSolver::new()), Box::new(aco)];

    for solver in solvers.iter_mut() {
        println!("== {}", solver.name());
        match solver.solve(&grid, start, &goals) {
            Ok(Some(route)) => {
                println!("Reached shelter {}", route.goal);
                println!("Moves: {}", route.path.hop_count());
                println!("Cost: {}", route.cost);
                println!("{}", render_ascii(&grid, Some(&route), start, &goals));
            }
            Ok(None) => println!("No route to any shelter.\n"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
