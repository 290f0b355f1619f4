//! # Scenarios
//!
//! Small problems with a known answer.
use nalgebra::{DMatrix, DVector};

use rasqp::{ActiveSetSolver, DegenerateStepPolicy, Error, LinearConstraints, PivotRuleKind, QuadraticProgram, SolverConfig, Status};
use rasqp::algorithm::active_set::Step;
use rasqp::algorithm::active_set::working_set::ConstraintIndex;
use rasqp::algorithm::simplex::strategy::pivot_rule::{PivotRule, SmallestSubscript, SteepestDescentAlongVariable};
use rasqp::algorithm::simplex::tableau::{Label, LabelType, Pivot, Tableau};

use crate::init_logging;

const EPSILON: f64 = 1e-8;

fn configs() -> Vec<SolverConfig> {
    vec![
        SolverConfig::default(),
        SolverConfig::default().with_pivot_rule(PivotRuleKind::SteepestDescent),
        SolverConfig::default().with_degenerate_step(DegenerateStepPolicy::AddBlocking),
    ]
}

/// minimize x1^2 + x2^2 subject to the given rows of `A x >= b`.
fn norm_problem(rows: usize, a: &[f64], b: &[f64]) -> QuadraticProgram {
    QuadraticProgram::new(
        DMatrix::from_diagonal_element(2, 2, 2f64),
        DVector::zeros(2),
        LinearConstraints::new(DMatrix::from_row_slice(rows, 2, a), DVector::from_row_slice(b)).unwrap(),
    ).unwrap()
}

fn box_problem() -> QuadraticProgram {
    norm_problem(2, &[1f64, 0f64, 0f64, 1f64], &[1f64, 1f64])
}

fn redundant_problem() -> QuadraticProgram {
    norm_problem(3, &[1f64, 0f64, 0f64, 1f64, 1f64, 1f64], &[1f64, 1f64, 0f64])
}

/// The gradient lies in the cone spanned by the active rows and the equality rows.
fn assert_kkt(problem: &QuadraticProgram, x: &DVector<f64>, active: &[ConstraintIndex]) {
    let rows = active.iter().map(|index| index.0).collect::<Vec<_>>();
    let mut constraints = problem.inequalities().matrix().select_rows(rows.iter());
    if let Some(equalities) = problem.equalities() {
        let top = constraints.nrows();
        constraints = constraints.insert_rows(top, equalities.nr_constraints(), 0f64);
        for k in 0..equalities.nr_constraints() {
            constraints.set_row(top + k, &equalities.matrix().row(k));
        }
    }

    let gradient = problem.gradient(x);
    let multipliers = constraints.transpose().svd(true, true).solve(&gradient, 1e-12).unwrap();
    let stationarity = constraints.transpose() * &multipliers - &gradient;
    assert!(stationarity.amax() < 1e-6, "gradient not in span: {}", stationarity);
    assert!(multipliers.rows(0, active.len()).iter().all(|&mu| mu >= -1e-6));
    assert!(problem.max_violation(x) < 1e-6);
}

#[test]
fn box_constrained() {
    init_logging();
    let problem = box_problem();
    for config in configs() {
        let solution = ActiveSetSolver::new(config).solve(&problem).unwrap();
        assert_eq!(solution.status(), Status::Converged);
        assert!((solution.minimizer() - DVector::from_vec(vec![1f64, 1f64])).amax() < EPSILON);
        assert!((solution.objective_value() - 2f64).abs() < EPSILON);
        assert_eq!(solution.active_constraints(), &[ConstraintIndex(0), ConstraintIndex(1)]);

        let multipliers = solution.multipliers().unwrap();
        assert!(multipliers.inequality.iter().all(|&mu| mu >= 0f64));
        assert!((&multipliers.inequality - DVector::from_vec(vec![2f64, 2f64])).amax() < EPSILON);
        assert_kkt(&problem, solution.minimizer(), solution.active_constraints());
    }
}

#[test]
fn redundant_constraint_never_enters() {
    init_logging();
    let problem = redundant_problem();
    for config in configs() {
        let solver = ActiveSetSolver::new(config);

        let mut state = solver.initialize(&problem, DVector::from_vec(vec![3f64, 2f64])).unwrap();
        loop {
            assert!(!state.working_set().contains(ConstraintIndex(2)));
            state = match solver.step(&problem, state).unwrap() {
                Step::Iterating(state) => state,
                Step::Converged { state, .. } => {
                    assert!(!state.working_set().contains(ConstraintIndex(2)));
                    assert!((state.x() - DVector::from_vec(vec![1f64, 1f64])).amax() < EPSILON);
                    break;
                },
                Step::Stalled(_) => panic!("no degenerate steps expected"),
            };
        }

        let solution = solver.solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!((solution.minimizer() - DVector::from_vec(vec![1f64, 1f64])).amax() < EPSILON);
        assert_eq!(solution.active_constraints(), &[ConstraintIndex(0), ConstraintIndex(1)]);
    }
}

#[test]
fn infeasible_box() {
    init_logging();
    let problem = QuadraticProgram::new(
        DMatrix::from_element(1, 1, 2f64),
        DVector::zeros(1),
        LinearConstraints::new(
            DMatrix::from_row_slice(2, 1, &[1f64, -1f64]),
            DVector::from_vec(vec![5f64, -1f64]),
        ).unwrap(),
    ).unwrap();

    for config in configs() {
        match ActiveSetSolver::new(config).solve(&problem) {
            Err(Error::Infeasible { slack }) => assert!((slack - 2f64).abs() < EPSILON),
            other => panic!("expected infeasibility, got {:?}", other),
        }
    }
}

#[test]
fn unbounded_pivot() {
    // The level variable (column 1) is out, column 0 improves the cost but only grows the rows
    let tableau = Tableau::new(
        vec![
            vec![2f64, 1f64, 0f64],
            vec![0f64, 1f64, 3f64],
        ],
        vec![-1f64, 1f64, 0f64],
        vec![Label::new(LabelType::Basic, 3), Label::new(LabelType::Basic, 4)],
        vec![Label::new(LabelType::NonBasic, 0), Label::new(LabelType::Artificial, 2)],
    );
    assert_eq!(SmallestSubscript::new(EPSILON).select_pivot(&tableau), Err(Error::Unbounded { column: 0 }));
    assert_eq!(SteepestDescentAlongVariable::new(EPSILON).select_pivot(&tableau), Err(Error::Unbounded { column: 0 }));
}

#[test]
fn pivot_rules_agree_on_simple_tableau() {
    let tableau = Tableau::new(
        vec![
            vec![1f64, -1f64, 0f64, 5f64],
            vec![0f64, -2f64, 1f64, 2f64],
            vec![-1f64, -1f64, 1f64, 4f64],
        ],
        vec![1f64, -2f64, 3f64, 0f64],
        vec![Label::new(LabelType::Basic, 3), Label::new(LabelType::Basic, 4), Label::new(LabelType::Basic, 5)],
        vec![Label::new(LabelType::NonBasic, 0), Label::new(LabelType::NonBasic, 1), Label::new(LabelType::NonBasic, 2)],
    );
    let expected = Ok(Some(Pivot { row: 1, column: 1 }));
    assert_eq!(SmallestSubscript::new(EPSILON).select_pivot(&tableau), expected);
    assert_eq!(SteepestDescentAlongVariable::new(EPSILON).select_pivot(&tableau), expected);
}

#[test]
fn equality_constrained() {
    init_logging();
    // minimize (x1 - 2)^2 + (x2 - 2)^2 + (x3 - 2)^2 subject to x1 + x2 + x3 = 3, x1 <= 0.5, x >= 0
    let problem = QuadraticProgram::new(
        DMatrix::from_diagonal_element(3, 3, 2f64),
        DVector::from_element(3, -4f64),
        LinearConstraints::new(
            DMatrix::from_row_slice(4, 3, &[
                -1f64, 0f64, 0f64,
                1f64, 0f64, 0f64,
                0f64, 1f64, 0f64,
                0f64, 0f64, 1f64,
            ]),
            DVector::from_vec(vec![-0.5f64, 0f64, 0f64, 0f64]),
        ).unwrap(),
    ).unwrap()
        .with_equalities(LinearConstraints::new(
            DMatrix::from_row_slice(1, 3, &[1f64, 1f64, 1f64]),
            DVector::from_vec(vec![3f64]),
        ).unwrap())
        .unwrap();

    for config in configs() {
        let solution = ActiveSetSolver::new(config).solve(&problem).unwrap();
        assert!(solution.is_optimal());
        let expected = DVector::from_vec(vec![0.5f64, 1.25f64, 1.25f64]);
        assert!((solution.minimizer() - expected).amax() < 1e-7, "{}", solution.minimizer());
        assert_eq!(solution.active_constraints(), &[ConstraintIndex(0)]);
        assert_eq!(solution.multipliers().unwrap().equality.len(), 1);
        assert_kkt(&problem, solution.minimizer(), solution.active_constraints());
    }
}

#[test]
fn hessian_must_be_positive_definite() {
    let problem = QuadraticProgram::new(
        DMatrix::from_row_slice(2, 2, &[1f64, 0f64, 0f64, -1f64]),
        DVector::zeros(2),
        LinearConstraints::empty(2),
    ).unwrap();
    let solver = ActiveSetSolver::default();
    assert_eq!(solver.solve(&problem).unwrap_err(), Error::NotPositiveDefinite);
    assert!(matches!(solver.solve_from(&problem, DVector::zeros(2)), Err(Error::NotPositiveDefinite)));

    // The hessian is checked before phase one gets to see the constraints
    let problem = QuadraticProgram::new(
        DMatrix::from_row_slice(2, 2, &[1f64, 0f64, 0f64, -1f64]),
        DVector::zeros(2),
        LinearConstraints::new(
            DMatrix::from_row_slice(2, 2, &[1f64, 0f64, -1f64, 0f64]),
            DVector::from_vec(vec![5f64, -1f64]),
        ).unwrap(),
    ).unwrap();
    assert_eq!(solver.solve(&problem).unwrap_err(), Error::NotPositiveDefinite);
}

#[test]
fn iteration_budget() {
    init_logging();
    // minimize (x1 - 3)^2 + (x2 - 2)^2 subject to x <= 1, starting in the origin
    let problem = QuadraticProgram::new(
        DMatrix::from_diagonal_element(2, 2, 2f64),
        DVector::from_vec(vec![-6f64, -4f64]),
        LinearConstraints::new(-DMatrix::identity(2, 2), DVector::from_element(2, -1f64)).unwrap(),
    ).unwrap();

    let solution = ActiveSetSolver::new(SolverConfig::default().with_max_iterations(1))
        .solve_from(&problem, DVector::zeros(2))
        .unwrap();
    assert_eq!(solution.status(), Status::MaxIterationsExceeded);
    assert!(!solution.is_optimal());
    assert_eq!(solution.iterations(), 1);
    assert!(solution.multipliers().is_none());
    assert!((solution.minimizer() - DVector::from_vec(vec![1f64, 2f64 / 3f64])).amax() < EPSILON);
    assert!(problem.max_violation(solution.minimizer()) < EPSILON);

    let solution = ActiveSetSolver::default().solve_from(&problem, DVector::zeros(2)).unwrap();
    assert!(solution.is_optimal());
    assert_eq!(solution.iterations(), 3);
    assert!((solution.minimizer() - DVector::from_element(2, 1f64)).amax() < EPSILON);
}

#[test]
fn feasible_and_monotone_iterates() {
    init_logging();
    // minimize (x1 - 4)^2 + (x2 - 1)^2 subject to x1 + x2 <= 3, x1 - x2 <= 2, x >= 0
    let problem = QuadraticProgram::new(
        DMatrix::from_diagonal_element(2, 2, 2f64),
        DVector::from_vec(vec![-8f64, -2f64]),
        LinearConstraints::new(
            DMatrix::from_row_slice(4, 2, &[
                -1f64, -1f64,
                -1f64, 1f64,
                1f64, 0f64,
                0f64, 1f64,
            ]),
            DVector::from_vec(vec![-3f64, -2f64, 0f64, 0f64]),
        ).unwrap(),
    ).unwrap();
    let solver = ActiveSetSolver::default();

    let mut state = solver.initialize(&problem, DVector::zeros(2)).unwrap();
    let mut objective = problem.objective(state.x());
    let (x, active) = loop {
        assert!(problem.max_violation(state.x()) < EPSILON);
        let indices = state.working_set().indices().to_vec();
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(
            state.working_set().active_submatrix(),
            &problem.inequalities().matrix().select_rows(indices.iter().map(|index| &index.0)),
        );

        state = match solver.step(&problem, state).unwrap() {
            Step::Iterating(state) => state,
            Step::Converged { state, .. } => break (state.x().clone(), state.working_set().indices().to_vec()),
            Step::Stalled(_) => panic!("no degenerate steps expected"),
        };
        let next = problem.objective(state.x());
        assert!(next <= objective + EPSILON);
        objective = next;
    };

    // Projection of (4, 1) on x1 - x2 <= 2 and x1 + x2 <= 3
    assert!((x - DVector::from_vec(vec![2.5f64, 0.5f64])).amax() < 1e-7);
    assert_kkt(&problem, &DVector::from_vec(vec![2.5f64, 0.5f64]), &active);
}

#[test]
fn simultaneous_blocking() {
    init_logging();
    // minimize (x1 - 3)^2 + (x2 - 3)^2 subject to x <= 1: both bounds block the first step at once
    let problem = QuadraticProgram::new(
        DMatrix::from_diagonal_element(2, 2, 2f64),
        DVector::from_element(2, -6f64),
        LinearConstraints::new(-DMatrix::identity(2, 2), DVector::from_element(2, -1f64)).unwrap(),
    ).unwrap();

    let solution = ActiveSetSolver::default().solve_from(&problem, DVector::zeros(2)).unwrap();
    assert_eq!(solution.status(), Status::DegenerateStep);
    assert_eq!(solution.active_constraints(), &[ConstraintIndex(0)]);
    assert!((solution.minimizer() - DVector::from_element(2, 1f64)).amax() < EPSILON);

    let solver = ActiveSetSolver::new(
        SolverConfig::default().with_degenerate_step(DegenerateStepPolicy::AddBlocking),
    );
    let solution = solver.solve_from(&problem, DVector::zeros(2)).unwrap();
    assert!(solution.is_optimal());
    assert_eq!(solution.iterations(), 3);
    assert_eq!(solution.active_constraints(), &[ConstraintIndex(0), ConstraintIndex(1)]);
    assert!((&solution.multipliers().unwrap().inequality - DVector::from_element(2, 4f64)).amax() < EPSILON);
}

#[test]
fn bound_repeats_equality() {
    init_logging();
    // minimize (x1 + 1)^2 + (x2 - 1)^2 subject to x1 >= 0, x1 = 0
    let problem = QuadraticProgram::new(
        DMatrix::from_diagonal_element(2, 2, 2f64),
        DVector::from_vec(vec![2f64, -2f64]),
        LinearConstraints::new(DMatrix::from_row_slice(1, 2, &[1f64, 0f64]), DVector::zeros(1)).unwrap(),
    ).unwrap()
        .with_equalities(
            LinearConstraints::new(DMatrix::from_row_slice(1, 2, &[1f64, 0f64]), DVector::zeros(1)).unwrap(),
        )
        .unwrap();

    for config in configs() {
        let solution = ActiveSetSolver::new(config).solve(&problem).unwrap();
        assert!(solution.is_optimal());
        assert!((solution.minimizer() - DVector::from_vec(vec![0f64, 1f64])).amax() < EPSILON);
        assert!((solution.objective_value() + 1f64).abs() < EPSILON);
        assert_kkt(&problem, solution.minimizer(), solution.active_constraints());
    }
}
