//! Linear piezoelectric element kernel.
//!
//! Couples the elastic and transport kernels through the stress-charge form
//!
//! ```text
//! ∇·S = ∇·(cT − dᵀE) = 0
//! ∇·(−D) = ∇·(−dT − εE) = 0
//! ```
//!
//! Element dofs are ordered displacement block first, then potentials:
//! NumDofs = D·K + K. The stiffness is the block matrix
//!
//! ```text
//! Kₑ = ⎡ Kᵤᵤ   −Kᵩᵤᵀ⎤
//!      ⎣−Kᵩᵤ  −Kᵩᵩ ⎦
//! ```
//!
//! which is symmetric but indefinite: the negated electric block makes the
//! periodic-cell solve a saddle problem.

use crate::element::Element;
use crate::error::Result;
use crate::kernel::elastic::ElasticKernel;
use crate::kernel::transport::{GradientConvention, TransportKernel};
use crate::kernel::global_gradients;
use crate::material::LinearPiezoelectricMaterial;
use nalgebra::DMatrix;
use std::marker::PhantomData;

/// Linear piezoelectric kernel for one element kind.
pub struct PiezoelectricKernel<E>(PhantomData<E>);

impl<E: Element> PiezoelectricKernel<E> {
    /// Number of coupled dofs in the element: D·K displacements + K
    /// potentials.
    pub const NUM_DOFS: usize = ElasticKernel::<E>::NUM_DOFS + TransportKernel::<E>::NUM_DOFS;

    /// Number of macroscopic loading columns: Voigt strains + electric
    /// field directions.
    pub const NUM_MACRO_FIELDS: usize = ElasticKernel::<E>::VOIGT_SIZE + E::DIM;

    /// The electrical sub-problem is electric-like by definition.
    pub const ELECTRICAL_CONVENTION: GradientConvention = GradientConvention::Negative;

    /// Element stiffness matrix at unit density.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) on a
    /// dimension mismatch; [`Error::Geometry`](crate::Error::Geometry) on
    /// bad element geometry.
    pub fn lhs(
        material: &LinearPiezoelectricMaterial,
        nodes: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>> {
        let num_u = ElasticKernel::<E>::NUM_DOFS;
        let num_phi = TransportKernel::<E>::NUM_DOFS;

        let k_uu = ElasticKernel::<E>::lhs(material.elastic(), nodes)?;
        let k_phiphi = TransportKernel::<E>::lhs(
            material.permittivity(),
            nodes,
            Self::ELECTRICAL_CONVENTION,
        )?;
        let k_phiu = Self::coupling_stiffness(material, nodes)?;

        let mut k = DMatrix::zeros(Self::NUM_DOFS, Self::NUM_DOFS);
        k.view_mut((0, 0), (num_u, num_u)).copy_from(&k_uu);
        k.view_mut((0, num_u), (num_u, num_phi))
            .copy_from(&(-k_phiu.transpose()));
        k.view_mut((num_u, 0), (num_phi, num_u))
            .copy_from(&(-&k_phiu));
        k.view_mut((num_u, num_u), (num_phi, num_phi))
            .copy_from(&(-k_phiphi));

        Ok(k)
    }

    /// Element macroscopic-source matrix at unit density.
    ///
    /// Columns are ordered Voigt strain loadings first, then electric field
    /// loadings:
    ///
    /// ```text
    /// Fₑ = ⎡ Fᵤᵤ   Fᵤᵩ ⎤
    ///      ⎣−Fᵩᵤ  −Fᵩᵩ⎦
    /// ```
    pub fn rhs(
        material: &LinearPiezoelectricMaterial,
        nodes: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>> {
        let num_u = ElasticKernel::<E>::NUM_DOFS;
        let num_phi = TransportKernel::<E>::NUM_DOFS;
        let voigt = ElasticKernel::<E>::VOIGT_SIZE;

        let d = material.coupling();

        let f_uu = ElasticKernel::<E>::rhs(material.elastic(), nodes)?;
        let f_phiphi = TransportKernel::<E>::rhs(
            material.permittivity(),
            nodes,
            Self::ELECTRICAL_CONVENTION,
        )?;

        // Coupling blocks: Fᵩᵤ = −∫ Bᵩᵀ d |det J|, Fᵤᵩ = ∫ Bᵤᵀ dᵀ |det J|
        let mut f_phiu = DMatrix::zeros(num_phi, voigt);
        let mut f_uphi = DMatrix::zeros(num_u, E::DIM);

        for gp in E::quadrature_rule() {
            let (_, det) = global_gradients::<E>(&gp.coords, nodes)?;
            let b_u = ElasticKernel::<E>::b_matrix(&gp.coords, nodes)?;
            let b_phi =
                TransportKernel::<E>::b_matrix(&gp.coords, nodes, Self::ELECTRICAL_CONVENTION)?;

            f_phiu -= (b_phi.transpose() * d) * (det * gp.weight);
            f_uphi += (b_u.transpose() * d.transpose()) * (det * gp.weight);
        }

        let mut f = DMatrix::zeros(Self::NUM_DOFS, Self::NUM_MACRO_FIELDS);
        f.view_mut((0, 0), (num_u, voigt)).copy_from(&f_uu);
        f.view_mut((0, voigt), (num_u, E::DIM)).copy_from(&f_uphi);
        f.view_mut((num_u, 0), (num_phi, voigt))
            .copy_from(&(-&f_phiu));
        f.view_mut((num_u, voigt), (num_phi, E::DIM))
            .copy_from(&(-f_phiphi));

        Ok(f)
    }

    /// Coupling stiffness Kᵩᵤ = ∫ Bᵩᵀ d Bᵤ |det J| dΩ̂.
    fn coupling_stiffness(
        material: &LinearPiezoelectricMaterial,
        nodes: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>> {
        let d = material.coupling();

        let mut k = DMatrix::zeros(TransportKernel::<E>::NUM_DOFS, ElasticKernel::<E>::NUM_DOFS);

        for gp in E::quadrature_rule() {
            let (_, det) = global_gradients::<E>(&gp.coords, nodes)?;
            let b_u = ElasticKernel::<E>::b_matrix(&gp.coords, nodes)?;
            let b_phi =
                TransportKernel::<E>::b_matrix(&gp.coords, nodes, Self::ELECTRICAL_CONVENTION)?;

            k += (b_phi.transpose() * d * b_u) * (det * gp.weight);
        }

        Ok(k)
    }
}
