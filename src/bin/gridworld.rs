use std::process;

use gridworld_vi::mdp::{render_policy, render_values};
use gridworld_vi::{GridConfig, GridWorld, SolverConfig, ValueIterationSolver};
use tracing_subscriber::{fmt, EnvFilter};

/// Routes the solver's `log` records to stderr. Per-iteration progress is
/// shown unless `RUST_LOG` says otherwise.
fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        if let Ok(d) = "gridworld_vi=debug".parse() {
            filter = filter.add_directive(d);
        }
    }

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    init_logging();

    let grid_config = GridConfig::default();
    let solver_config = SolverConfig::default();

    let env = match GridWorld::new(&grid_config) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Invalid grid configuration: {}", e);
            process::exit(1);
        }
    };

    let fire = env
        .fire()
        .map_or_else(|| "None".to_string(), |f| f.to_string());
    println!("Environment created: {}x{} grid", env.rows(), env.cols());
    println!(
        "Goal: {} | Fire: {} | Obstacles: {}",
        env.goal(),
        fire,
        env.obstacles().len()
    );

    let mut solver = match ValueIterationSolver::new(&env, solver_config) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("Invalid solver configuration: {}", e);
            process::exit(1);
        }
    };
    let report = solver.run(None);

    match solver.get_value_grid(None) {
        Ok(values) => {
            println!("\nValue Function:");
            print!("{}", render_values(&values));
        }
        Err(e) => eprintln!("{}", e),
    }
    println!("\nOptimal Policy:");
    print!("{}", render_policy(&solver.get_policy_grid()));

    println!("\nSummary:");
    println!("  Total iterations: {}", report.iterations);
    println!("  Converged: {}", report.converged);
    println!("  Grid size: {}x{}", env.rows(), env.cols());
    println!("  States processed: {}", env.get_all_states().len());
    println!("  Discount factor (gamma): {}", solver.gamma());
    println!("  Convergence threshold (theta): {}", solver.theta());
}
