//! End-to-end homogenization scenarios.
//!
//! Solid and void cells must reproduce the base and zero tensors, random
//! cells must respect symmetry, definiteness, the Voigt/Reuss bounds, and
//! translational invariance, and starved iteration budgets must surface as
//! solver failures.

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unicell::{
    ElasticPhysics, Error, FieldSave, Hex20Grid, Hex8Grid, LinearElasticMaterial,
    LinearElasticSolver, LinearPiezoelectricMaterial, LinearPiezoelectricSolver,
    LinearTransportMaterial, LinearTransportSolver, PiezoelectricPhysics, PlaneCondition,
    Quad4Grid, Quad8Grid, SolverOptions, TransportPhysics, NUMERICAL_ZERO,
};

fn is_symmetric(a: &DMatrix<f64>) -> bool {
    (a - a.transpose()).norm() <= NUMERICAL_ZERO * a.norm().max(1.0)
}

fn is_pd(a: &DMatrix<f64>) -> bool {
    a.clone().cholesky().is_some()
}

fn random_pd_matrix(n: usize, rng: &mut StdRng) -> DMatrix<f64> {
    let a = DMatrix::from_fn(n, n, |_, _| rng.gen_range(0.0..1.0));
    a.transpose() * a + DMatrix::identity(n, n)
}

#[test]
fn solid_quad8_cell_reproduces_base_stiffness() {
    let mut grid = Quad8Grid::new(&[3, 3], &[1.0, 1.0]).unwrap();
    grid.set_densities_ones();

    let material =
        LinearElasticMaterial::isotropic_2d(1.0, 0.3, PlaneCondition::PlaneStress).unwrap();

    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
    let results = solver.solve(&SolverOptions::default()).unwrap();

    assert_relative_eq!(results.c_bar, *material.tensor(), epsilon = NUMERICAL_ZERO);
}

#[test]
fn solid_hex8_cell_reproduces_base_stiffness() {
    let mut grid = Hex8Grid::new(&[2, 3, 4], &[0.5, 1.5, 2.0]).unwrap();
    grid.set_densities_ones();

    let material = LinearElasticMaterial::isotropic_3d(1.0, 0.3).unwrap();

    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
    let results = solver.solve(&SolverOptions::default()).unwrap();

    assert_relative_eq!(results.c_bar, *material.tensor(), epsilon = NUMERICAL_ZERO);
}

#[test]
fn solid_quad4_and_hex20_cells_reproduce_random_stiffness() {
    let mut rng = StdRng::seed_from_u64(99);

    let mut grid = Quad4Grid::new(&[2, 2], &[0.5, 0.5]).unwrap();
    grid.set_densities_ones();
    let material = LinearElasticMaterial::new(random_pd_matrix(3, &mut rng)).unwrap();
    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
    let results = solver.solve(&SolverOptions::default()).unwrap();
    assert_relative_eq!(results.c_bar, *material.tensor(), epsilon = NUMERICAL_ZERO);

    let mut grid = Hex20Grid::new(&[2, 2, 2], &[0.5, 0.5, 0.5]).unwrap();
    grid.set_densities_ones();
    let material = LinearElasticMaterial::new(random_pd_matrix(6, &mut rng)).unwrap();
    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
    let results = solver.solve(&SolverOptions::default()).unwrap();
    assert_relative_eq!(results.c_bar, *material.tensor(), epsilon = NUMERICAL_ZERO);
}

#[test]
fn void_quad8_cell_gives_zero_stiffness() {
    let mut grid = Quad8Grid::new(&[3, 3], &[1.0, 1.0]).unwrap();
    grid.set_densities_zeros();

    let material =
        LinearElasticMaterial::isotropic_2d(1.0, 0.3, PlaneCondition::PlaneStress).unwrap();

    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
    let results = solver.solve(&SolverOptions::default()).unwrap();

    assert!(results.c_bar.norm() <= 10.0 * NUMERICAL_ZERO);
}

#[test]
fn random_quad8_cell_properties() {
    let mut grid = Quad8Grid::new(&[2, 2], &[0.5, 0.5]).unwrap();
    grid.set_densities_random(Some(1234));

    let material =
        LinearElasticMaterial::isotropic_2d(1.0, 0.3, PlaneCondition::PlaneStress).unwrap();

    let c_bar = {
        let solver =
            LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
        solver.solve(&SolverOptions::default()).unwrap().c_bar
    };

    assert!(is_symmetric(&c_bar));
    assert!(is_pd(&c_bar));

    // Voigt/Reuss bounds on the trace
    let voigt = material.voigt(grid.densities());
    let reuss = material.reuss(grid.densities()).unwrap();
    assert!(reuss.trace() <= c_bar.trace());
    assert!(c_bar.trace() <= voigt.trace());

    // Translational invariance: relabeling the lattice origin must not
    // change the homogenized tensor
    grid.translate(&[1, 1]).unwrap();
    let translated = {
        let solver =
            LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();
        solver.solve(&SolverOptions::default()).unwrap().c_bar
    };

    assert_relative_eq!(translated, c_bar, epsilon = NUMERICAL_ZERO);
}

#[test]
fn starved_iteration_budget_is_a_solver_failure() {
    let mut grid = Quad8Grid::new(&[2, 2], &[0.5, 0.5]).unwrap();
    grid.set_densities_random(Some(1234));

    let material =
        LinearElasticMaterial::isotropic_2d(1.0, 0.3, PlaneCondition::PlaneStress).unwrap();
    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();

    let options = SolverOptions {
        max_iterations: 1,
        ..SolverOptions::default()
    };

    assert!(matches!(solver.solve(&options), Err(Error::Solver(_))));
}

#[test]
fn solid_transport_cell_reproduces_isotropic_tensor() {
    let material = LinearTransportMaterial::isotropic(2, 2.1).unwrap();
    let expected = 2.1 * DMatrix::identity(2, 2);

    for physics in [
        TransportPhysics::negative(),
        TransportPhysics::positive(),
    ] {
        let mut grid = Quad4Grid::new(&[3, 3], &[0.5, 0.5]).unwrap();
        grid.set_densities_ones();

        let solver = LinearTransportSolver::new(&grid, &material, physics).unwrap();
        let results = solver.solve(&SolverOptions::default()).unwrap();

        assert_relative_eq!(results.k_bar, expected, epsilon = NUMERICAL_ZERO);
    }
}

#[test]
fn random_transport_cell_properties() {
    let material = LinearTransportMaterial::isotropic(2, 2.1).unwrap();

    let mut grid = Quad4Grid::new(&[3, 3], &[0.5, 0.5]).unwrap();
    grid.set_densities_random(Some(5678));

    let k_bar = {
        let solver =
            LinearTransportSolver::new(&grid, &material, TransportPhysics::negative()).unwrap();
        solver.solve(&SolverOptions::default()).unwrap().k_bar
    };

    assert!(is_symmetric(&k_bar));
    assert!(is_pd(&k_bar));

    let voigt = material.voigt(grid.densities());
    let reuss = material.reuss(grid.densities()).unwrap();
    assert!(reuss.trace() <= k_bar.trace());
    assert!(k_bar.trace() <= voigt.trace());

    grid.translate(&[2, 1]).unwrap();
    let translated = {
        let solver =
            LinearTransportSolver::new(&grid, &material, TransportPhysics::negative()).unwrap();
        solver.solve(&SolverOptions::default()).unwrap().k_bar
    };

    assert_relative_eq!(translated, k_bar, epsilon = NUMERICAL_ZERO);
}

fn piezoelectric_material(rng: &mut StdRng) -> LinearPiezoelectricMaterial {
    let elastic = LinearElasticMaterial::new(random_pd_matrix(6, rng)).unwrap();
    let permittivity = LinearTransportMaterial::isotropic(3, 2.1).unwrap();
    let coupling = DMatrix::from_fn(3, 6, |_, _| 0.1 * rng.gen_range(0.0..1.0));

    LinearPiezoelectricMaterial::new(elastic, permittivity, coupling).unwrap()
}

#[test]
fn random_piezoelectric_hex20_cell_properties() {
    let mut rng = StdRng::seed_from_u64(4321);
    let material = piezoelectric_material(&mut rng);

    let mut grid = Hex20Grid::new(&[2, 2, 2], &[0.5, 0.5, 0.5]).unwrap();
    grid.set_densities_random(Some(1234));

    let options = SolverOptions {
        max_iterations: 2000,
        ..SolverOptions::default()
    };

    let results = {
        let solver =
            LinearPiezoelectricSolver::new(&grid, &material, PiezoelectricPhysics::default())
                .unwrap();
        solver.solve(&options).unwrap()
    };

    assert!(is_pd(&results.c_bar));
    assert!(is_pd(&results.epsilon_bar));

    // Voigt/Reuss bounds hold per constituent
    let elastic_voigt = material.elastic().voigt(grid.densities());
    let elastic_reuss = material.elastic().reuss(grid.densities()).unwrap();
    assert!(elastic_reuss.trace() <= results.c_bar.trace());
    assert!(results.c_bar.trace() <= elastic_voigt.trace());

    let permittivity_voigt = material.permittivity().voigt(grid.densities());
    let permittivity_reuss = material.permittivity().reuss(grid.densities()).unwrap();
    assert!(permittivity_reuss.trace() <= results.epsilon_bar.trace());
    assert!(results.epsilon_bar.trace() <= permittivity_voigt.trace());

    // Translational invariance
    grid.translate(&[1, 1, 1]).unwrap();
    let translated = {
        let solver =
            LinearPiezoelectricSolver::new(&grid, &material, PiezoelectricPhysics::default())
                .unwrap();
        solver.solve(&options).unwrap()
    };

    assert_relative_eq!(translated.c_bar, results.c_bar, epsilon = NUMERICAL_ZERO);
    assert_relative_eq!(
        translated.epsilon_bar,
        results.epsilon_bar,
        epsilon = NUMERICAL_ZERO
    );
    assert_relative_eq!(translated.d_bar, results.d_bar, epsilon = NUMERICAL_ZERO);

    // A starved iteration budget must fail
    let starved = SolverOptions {
        max_iterations: 1,
        ..SolverOptions::default()
    };
    let solver =
        LinearPiezoelectricSolver::new(&grid, &material, PiezoelectricPhysics::default())
            .unwrap();
    assert!(matches!(solver.solve(&starved), Err(Error::Solver(_))));
}

#[test]
fn solid_piezoelectric_cell_reproduces_constituent_tensors() {
    let mut rng = StdRng::seed_from_u64(2468);
    let material = piezoelectric_material(&mut rng);

    let mut grid = Hex8Grid::new(&[2, 2, 2], &[1.0, 1.0, 1.0]).unwrap();
    grid.set_densities_ones();

    let options = SolverOptions {
        max_iterations: 2000,
        ..SolverOptions::default()
    };

    let solver =
        LinearPiezoelectricSolver::new(&grid, &material, PiezoelectricPhysics::default()).unwrap();
    let results = solver.solve(&options).unwrap();

    assert_relative_eq!(
        results.c_bar,
        *material.elastic().tensor(),
        epsilon = NUMERICAL_ZERO
    );
    assert_relative_eq!(
        results.epsilon_bar,
        *material.permittivity().tensor(),
        epsilon = NUMERICAL_ZERO
    );
    assert_relative_eq!(results.d_bar, *material.coupling(), epsilon = NUMERICAL_ZERO);
}

#[test]
fn nodal_fields_retained_on_request() {
    let mut grid = Quad4Grid::new(&[2, 2], &[1.0, 1.0]).unwrap();
    grid.set_densities_random(Some(11));

    let material =
        LinearElasticMaterial::isotropic_2d(1.0, 0.3, PlaneCondition::PlaneStress).unwrap();
    let solver = LinearElasticSolver::new(&grid, &material, ElasticPhysics::default()).unwrap();

    // Nothing retained by default
    let results = solver.solve(&SolverOptions::default()).unwrap();
    assert!(results.u.is_empty());
    assert!(results.u_macro.is_empty());
    assert!(results.u_micro.is_empty());

    let options = SolverOptions {
        fields: FieldSave::ALL,
        ..SolverOptions::default()
    };
    let results = solver.solve(&options).unwrap();

    assert_eq!(results.u.len(), 3);
    assert_eq!(results.u_macro.len(), 3);
    assert_eq!(results.u_micro.len(), 3);

    for q in 0..3 {
        assert_eq!(results.u[q].nrows(), grid.num_nodes());
        assert_eq!(results.u[q].ncols(), 2);

        // Total = macro + micro
        assert_relative_eq!(
            results.u[q].clone(),
            &results.u_macro[q] + &results.u_micro[q],
            epsilon = 1e-12
        );
    }
}

#[test]
fn transport_fields_are_scalar_per_node() {
    let mut grid = Quad4Grid::new(&[2, 2], &[1.0, 1.0]).unwrap();
    grid.set_densities_random(Some(3));

    let material = LinearTransportMaterial::isotropic(2, 1.0).unwrap();
    let solver =
        LinearTransportSolver::new(&grid, &material, TransportPhysics::positive()).unwrap();

    let options = SolverOptions {
        fields: FieldSave::TOTAL | FieldSave::MACRO,
        ..SolverOptions::default()
    };
    let results = solver.solve(&options).unwrap();

    assert_eq!(results.phi.len(), 2);
    assert_eq!(results.phi_macro.len(), 2);
    assert!(results.phi_micro.is_empty());

    for q in 0..2 {
        assert_eq!(results.phi[q].len(), grid.num_nodes());
    }
}
