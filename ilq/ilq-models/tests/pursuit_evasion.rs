//! Two-player pursuit–evasion with bicycle dynamics: the pursuer pays for
//! separation, the evader pays for proximity, and both pay for control.

use std::sync::Arc;

use nalgebra::DVector;

use ilq_core::{ConcatenatedSystem, DynamicalSystem, IlqSolver, PlayerCost};
use ilq_models::{Bicycle4D, QuadraticCost, SignedDistanceCost};
use ilq_types::{OperatingPoint, SolverLog, SolverParams, Strategy};

const INTER_AXLE: f64 = 2.5;
const NOMINAL_DISTANCE: f64 = 1.0;
const EVADER: usize = 4; // joint-state offset of the evader's block

fn pursuit_game(params: &SolverParams) -> (ConcatenatedSystem, Vec<PlayerCost>) {
    let dynamics = ConcatenatedSystem::new(vec![
        Box::new(Bicycle4D::new(INTER_AXLE)),
        Box::new(Bicycle4D::new(INTER_AXLE)),
    ]);

    let pursuer_positions = (Bicycle4D::PX, Bicycle4D::PY);
    let evader_positions = (EVADER + Bicycle4D::PX, EVADER + Bicycle4D::PY);

    let mut pursuer = PlayerCost::new(0, "Pursuer");
    pursuer.add_state_cost(Arc::new(SignedDistanceCost::weighted(
        pursuer_positions,
        evader_positions,
        NOMINAL_DISTANCE,
        -1.0,
    )));
    pursuer.add_control_cost(
        0,
        Arc::new(QuadraticCost::on_all(params.control_cost_weight, 0.0)),
    );

    let mut evader = PlayerCost::new(1, "Evader");
    evader.add_state_cost(Arc::new(SignedDistanceCost::new(
        pursuer_positions,
        evader_positions,
        NOMINAL_DISTANCE,
    )));
    evader.add_control_cost(
        1,
        Arc::new(QuadraticCost::on_all(params.control_cost_weight, 0.0)),
    );

    (dynamics, vec![pursuer, evader])
}

fn initial_state() -> DVector<f64> {
    let mut x0 = DVector::zeros(8);
    x0[Bicycle4D::PX] = 0.0;
    x0[Bicycle4D::PY] = -7.0;
    x0[Bicycle4D::THETA] = std::f64::consts::FRAC_PI_2 - 1e-4;
    x0[Bicycle4D::V] = 0.5;

    x0[EVADER + Bicycle4D::PX] = 0.0;
    x0[EVADER + Bicycle4D::PY] = 0.0;
    x0[EVADER + Bicycle4D::THETA] = std::f64::consts::FRAC_PI_2;
    x0[EVADER + Bicycle4D::V] = 0.5;
    x0
}

fn separation(x: &DVector<f64>) -> f64 {
    let dx = x[Bicycle4D::PX] - x[EVADER + Bicycle4D::PX];
    let dy = x[Bicycle4D::PY] - x[EVADER + Bicycle4D::PY];
    dx.hypot(dy)
}

#[test]
fn pursuit_game_solves_and_keeps_players_apart() {
    let params = SolverParams::with_horizon(2.0, 0.1).alpha_scaling(0.2);
    let (dynamics, costs) = pursuit_game(&params);
    let solver = IlqSolver::new(&dynamics, &costs, params).unwrap();
    let horizon = solver.num_time_steps();

    let u_dims = dynamics.u_dims();
    let mut log = SolverLog::new();
    let out = solver
        .solve(
            &initial_state(),
            OperatingPoint::zeros(horizon, 8, &u_dims, 0.0),
            u_dims
                .iter()
                .map(|&du| Strategy::zeros(horizon, 8, du))
                .collect(),
            Some(&mut log),
        )
        .unwrap();

    // Either outcome is legitimate: tolerance convergence, or the iteration
    // cap reported as a timeout with the final iterate intact.
    assert!(out.converged || out.iterations == solver.params().max_iterations);
    assert!(out.player_costs.iter().all(|c| c.is_finite()));

    // Starting 7 m apart at 0.5 m/s, neither player can change the
    // separation by more than ~2 m over the horizon.
    let terminal = separation(&out.operating_point.xs[horizon - 1]);
    assert!(terminal > 4.0, "implausible terminal separation {terminal}");

    // Zero-sum proximity terms cancel: the players' distance costs are
    // opposite, so the cost totals differ only by control effort.
    let distance_part_sum: f64 = out
        .player_costs
        .iter()
        .sum();
    assert!(distance_part_sum >= -1e-9);
}

#[test]
fn both_players_accelerate_toward_their_objectives() {
    let params = SolverParams::with_horizon(2.0, 0.1).alpha_scaling(0.2);
    let (dynamics, costs) = pursuit_game(&params);
    let solver = IlqSolver::new(&dynamics, &costs, params).unwrap();
    let horizon = solver.num_time_steps();

    let u_dims = dynamics.u_dims();
    let out = solver
        .solve(
            &initial_state(),
            OperatingPoint::zeros(horizon, 8, &u_dims, 0.0),
            u_dims
                .iter()
                .map(|&du| Strategy::zeros(horizon, 8, du))
                .collect(),
            None,
        )
        .unwrap();

    // The pursuer sits south of the evader with both headed north: closing
    // means speeding up, fleeing means speeding up. Both players should
    // leave their initial speed behind mid-horizon.
    let mid = &out.operating_point.xs[horizon / 2];
    assert!(
        mid[Bicycle4D::V] > 0.5,
        "pursuer never accelerated: v = {}",
        mid[Bicycle4D::V]
    );
    assert!(
        mid[EVADER + Bicycle4D::V] > 0.5,
        "evader never accelerated: v = {}",
        mid[EVADER + Bicycle4D::V]
    );
}
