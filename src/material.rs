//! Constitutive material models.
//!
//! Three linear models back the homogenization physics:
//!
//! - [`LinearElasticMaterial`]: Hooke's law σ = Cε with a symmetric
//!   positive-definite Voigt stiffness (3×3 in 2D, 6×6 in 3D).
//! - [`LinearTransportMaterial`]: flux J = ±K∇φ with a symmetric
//!   positive-definite D×D transport tensor (conductivity, permittivity,
//!   diffusivity, ...).
//! - [`LinearPiezoelectricMaterial`]: the stress-charge coupling of an
//!   elastic and a transport (permittivity) model through a D×V coupling
//!   tensor d.
//!
//! Each model exposes density-weighted Voigt (arithmetic mean) and Reuss
//! (harmonic mean) bounds on the homogenized tensor.

use crate::error::{Error, Result};
use crate::numeric::{arithmetic_mean, harmonic_mean, is_pd};
use nalgebra::DMatrix;

/// Plane condition for 2D isotropic elasticity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneCondition {
    /// Zero out-of-plane stress.
    PlaneStress,
    /// Zero out-of-plane strain.
    PlaneStrain,
}

fn check_youngs_poisson(e: f64, nu: f64) -> Result<()> {
    if e <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "Young's modulus ({}) must be positive",
            e
        )));
    }
    if nu <= -1.0 || nu >= 0.5 {
        return Err(Error::InvalidArgument(format!(
            "Poisson's ratio ({}) must be in range (-1,0.5)",
            nu
        )));
    }

    Ok(())
}

/// Linear elastic material: σ = Cε in Voigt notation.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearElasticMaterial {
    c: DMatrix<f64>,
}

impl LinearElasticMaterial {
    /// Construct from a Voigt stiffness tensor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] unless `c` is 3×3 (2D) or 6×6 (3D) and
    /// symmetric positive definite.
    pub fn new(c: DMatrix<f64>) -> Result<Self> {
        if !(c.nrows() == 3 && c.ncols() == 3 || c.nrows() == 6 && c.ncols() == 6) {
            return Err(Error::InvalidArgument(format!(
                "stiffness tensor must be 3x3 or 6x6, got {}x{}",
                c.nrows(),
                c.ncols()
            )));
        }
        if !is_pd(&c) {
            return Err(Error::InvalidArgument(
                "stiffness tensor is not positive definite".into(),
            ));
        }

        Ok(Self { c })
    }

    /// Construct a 2D isotropic material from Young's modulus and Poisson's
    /// ratio under the given plane condition.
    pub fn isotropic_2d(e: f64, nu: f64, condition: PlaneCondition) -> Result<Self> {
        check_youngs_poisson(e, nu)?;

        let c = match condition {
            PlaneCondition::PlaneStress => {
                let factor = e / (1.0 - nu * nu);
                DMatrix::from_row_slice(
                    3,
                    3,
                    &[
                        factor,
                        factor * nu,
                        0.0,
                        factor * nu,
                        factor,
                        0.0,
                        0.0,
                        0.0,
                        factor * (1.0 - nu) / 2.0,
                    ],
                )
            }
            PlaneCondition::PlaneStrain => {
                let factor = e / ((1.0 + nu) * (1.0 - 2.0 * nu));
                DMatrix::from_row_slice(
                    3,
                    3,
                    &[
                        factor * (1.0 - nu),
                        factor * nu,
                        0.0,
                        factor * nu,
                        factor * (1.0 - nu),
                        0.0,
                        0.0,
                        0.0,
                        factor * (1.0 - 2.0 * nu) / 2.0,
                    ],
                )
            }
        };

        Ok(Self { c })
    }

    /// Construct a 3D isotropic material from Young's modulus and Poisson's
    /// ratio.
    pub fn isotropic_3d(e: f64, nu: f64) -> Result<Self> {
        check_youngs_poisson(e, nu)?;

        let lambda = e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu));
        let mu = e / (2.0 * (1.0 + nu));

        let mut c = DMatrix::zeros(6, 6);
        for i in 0..3 {
            for j in 0..3 {
                c[(i, j)] = if i == j { lambda + 2.0 * mu } else { lambda };
            }
            c[(i + 3, i + 3)] = mu;
        }

        Ok(Self { c })
    }

    /// Voigt stiffness tensor C.
    pub fn tensor(&self) -> &DMatrix<f64> {
        &self.c
    }

    /// Spatial dimension (2 or 3), derived from the Voigt size.
    pub fn dim(&self) -> usize {
        if self.c.nrows() == 3 {
            2
        } else {
            3
        }
    }

    /// Number of Voigt components (3 in 2D, 6 in 3D).
    pub fn voigt_size(&self) -> usize {
        self.c.nrows()
    }

    /// Voigt upper bound for the homogenized stiffness: arithmetic density
    /// mean times C.
    pub fn voigt(&self, densities: &[f64]) -> DMatrix<f64> {
        arithmetic_mean(densities) * &self.c
    }

    /// Reuss lower bound for the homogenized stiffness: harmonic density
    /// mean times C.
    pub fn reuss(&self, densities: &[f64]) -> Result<DMatrix<f64>> {
        Ok(harmonic_mean(densities)? * &self.c)
    }
}

/// Linear scalar transport material: J = ±K∇φ.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTransportMaterial {
    k: DMatrix<f64>,
}

impl LinearTransportMaterial {
    /// Construct from a full transport tensor.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] unless `k` is 2×2 or 3×3 and symmetric
    /// positive definite.
    pub fn new(k: DMatrix<f64>) -> Result<Self> {
        if !(k.nrows() == 2 && k.ncols() == 2 || k.nrows() == 3 && k.ncols() == 3) {
            return Err(Error::InvalidArgument(format!(
                "transport tensor must be 2x2 or 3x3, got {}x{}",
                k.nrows(),
                k.ncols()
            )));
        }
        if !is_pd(&k) {
            return Err(Error::InvalidArgument(
                "transport tensor is not positive definite".into(),
            ));
        }

        Ok(Self { k })
    }

    /// Construct an isotropic transport material K·I in dimension `dim`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] unless `dim` is 2 or 3 and `k` positive.
    pub fn isotropic(dim: usize, k: f64) -> Result<Self> {
        if dim != 2 && dim != 3 {
            return Err(Error::InvalidArgument(format!(
                "dimension ({}) must be 2 or 3",
                dim
            )));
        }
        if k <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "transport constant ({}) must be positive",
                k
            )));
        }

        Ok(Self {
            k: DMatrix::identity(dim, dim) * k,
        })
    }

    /// Transport tensor K.
    pub fn tensor(&self) -> &DMatrix<f64> {
        &self.k
    }

    /// Spatial dimension (2 or 3).
    pub fn dim(&self) -> usize {
        self.k.nrows()
    }

    /// Voigt upper bound for the homogenized transport tensor.
    pub fn voigt(&self, densities: &[f64]) -> DMatrix<f64> {
        arithmetic_mean(densities) * &self.k
    }

    /// Reuss lower bound for the homogenized transport tensor.
    pub fn reuss(&self, densities: &[f64]) -> Result<DMatrix<f64>> {
        Ok(harmonic_mean(densities)? * &self.k)
    }
}

/// Linear piezoelectric material in stress-charge form:
///
/// ```text
/// S  =  c T − dᵀ E
/// −D = −d T − ε E
/// ```
///
/// with stiffness c, permittivity ε, and coupling tensor d ∈ ℝᴰˣᵛ.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPiezoelectricMaterial {
    elastic: LinearElasticMaterial,
    permittivity: LinearTransportMaterial,
    coupling: DMatrix<f64>,
    operator: DMatrix<f64>,
}

impl LinearPiezoelectricMaterial {
    /// Construct from an elastic material, a permittivity (transport)
    /// material, and the coupling tensor d.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the material dimensions disagree, the
    /// coupling tensor is not D×V, or the Schur complement c − dᵀ ε⁻¹ d is
    /// not positive definite (thermodynamic stability).
    pub fn new(
        elastic: LinearElasticMaterial,
        permittivity: LinearTransportMaterial,
        coupling: DMatrix<f64>,
    ) -> Result<Self> {
        if elastic.dim() != permittivity.dim() {
            return Err(Error::InvalidArgument(format!(
                "elastic dimension ({}) must equal permittivity dimension ({})",
                elastic.dim(),
                permittivity.dim()
            )));
        }

        let dim = elastic.dim();
        let voigt = elastic.voigt_size();

        if coupling.nrows() != dim || coupling.ncols() != voigt {
            return Err(Error::InvalidArgument(format!(
                "coupling tensor must be {}x{}, got {}x{}",
                dim,
                voigt,
                coupling.nrows(),
                coupling.ncols()
            )));
        }

        let c = elastic.tensor();
        let eps = permittivity.tensor();

        let eps_inv = eps.clone().try_inverse().ok_or_else(|| {
            Error::InvalidArgument("permittivity tensor is not invertible".into())
        })?;

        let schur = c - coupling.transpose() * eps_inv * &coupling;
        if !is_pd(&schur) {
            return Err(Error::InvalidArgument(
                "Schur complement is not positive definite".into(),
            ));
        }

        // Coupled block operator [[c, -dᵀ], [-d, -ε]]
        let mut operator = DMatrix::zeros(voigt + dim, voigt + dim);
        operator.view_mut((0, 0), (voigt, voigt)).copy_from(c);
        operator
            .view_mut((0, voigt), (voigt, dim))
            .copy_from(&(-coupling.transpose()));
        operator
            .view_mut((voigt, 0), (dim, voigt))
            .copy_from(&(-&coupling));
        operator.view_mut((voigt, voigt), (dim, dim)).copy_from(&(-eps));

        Ok(Self {
            elastic,
            permittivity,
            coupling,
            operator,
        })
    }

    /// Elastic constituent.
    pub fn elastic(&self) -> &LinearElasticMaterial {
        &self.elastic
    }

    /// Permittivity constituent.
    pub fn permittivity(&self) -> &LinearTransportMaterial {
        &self.permittivity
    }

    /// Coupling tensor d.
    pub fn coupling(&self) -> &DMatrix<f64> {
        &self.coupling
    }

    /// Coupled block operator [[c, -dᵀ], [-d, -ε]].
    pub fn block_operator(&self) -> &DMatrix<f64> {
        &self.operator
    }

    /// Spatial dimension (2 or 3).
    pub fn dim(&self) -> usize {
        self.elastic.dim()
    }

    /// Number of Voigt components of the elastic block.
    pub fn voigt_size(&self) -> usize {
        self.elastic.voigt_size()
    }
}
