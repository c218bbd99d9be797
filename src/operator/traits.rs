//! Dof maps for the three physics.
//!
//! The fixed dofs are always the first `NUM_FIXED_DOFS` of the ordering:
//! elastic pins the origin node's D displacement dofs, transport pins the
//! potential at the origin node, and piezoelectric concatenates both fixed
//! sets with the electrical block offset by `num_nodes · D`.

use crate::element::Element;
use crate::operator::OperatorTraits;
use std::marker::PhantomData;

/// Dof map for linear elastic operators: D dofs per node, interleaved as
/// [D·n, D·n+1, ..].
pub struct ElasticOperatorTraits<E>(PhantomData<E>);

impl<E: Element> OperatorTraits for ElasticOperatorTraits<E> {
    const NUM_NODE_DOFS: usize = E::DIM;
    const NUM_FIXED_DOFS: usize = E::DIM;

    fn dofs(element: &[usize], _num_nodes: usize) -> Vec<usize> {
        let mut dofs = Vec::with_capacity(E::DIM * element.len());

        for &node in element {
            for j in 0..E::DIM {
                dofs.push(E::DIM * node + j);
            }
        }

        dofs
    }

    fn is_fixed_dof(dof: usize, _num_nodes: usize) -> bool {
        dof < Self::NUM_FIXED_DOFS
    }

    fn reduced_dof(dof: usize, _num_nodes: usize) -> usize {
        dof - Self::NUM_FIXED_DOFS
    }

    fn expanded_dof(dof: usize, _num_nodes: usize) -> usize {
        dof + Self::NUM_FIXED_DOFS
    }
}

/// Dof map for scalar transport operators: one dof per node.
pub struct TransportOperatorTraits;

impl OperatorTraits for TransportOperatorTraits {
    const NUM_NODE_DOFS: usize = 1;
    const NUM_FIXED_DOFS: usize = 1;

    fn dofs(element: &[usize], _num_nodes: usize) -> Vec<usize> {
        element.to_vec()
    }

    fn is_fixed_dof(dof: usize, _num_nodes: usize) -> bool {
        dof == 0
    }

    fn reduced_dof(dof: usize, _num_nodes: usize) -> usize {
        dof - Self::NUM_FIXED_DOFS
    }

    fn expanded_dof(dof: usize, _num_nodes: usize) -> usize {
        dof + Self::NUM_FIXED_DOFS
    }
}

/// Dof map for piezoelectric operators: the mechanical block (D dofs per
/// node) comes first, the electrical block (one dof per node) is offset by
/// `num_nodes · D`.
pub struct PiezoelectricOperatorTraits<E>(PhantomData<E>);

impl<E: Element> PiezoelectricOperatorTraits<E> {
    fn num_mechanical_dofs(num_nodes: usize) -> usize {
        num_nodes * ElasticOperatorTraits::<E>::NUM_NODE_DOFS
    }

    fn num_reduced_mechanical_dofs(num_nodes: usize) -> usize {
        Self::num_mechanical_dofs(num_nodes) - ElasticOperatorTraits::<E>::NUM_FIXED_DOFS
    }
}

impl<E: Element> OperatorTraits for PiezoelectricOperatorTraits<E> {
    const NUM_NODE_DOFS: usize = E::DIM + 1;
    const NUM_FIXED_DOFS: usize = E::DIM + 1;

    fn dofs(element: &[usize], num_nodes: usize) -> Vec<usize> {
        let offset = Self::num_mechanical_dofs(num_nodes);

        let mut dofs = ElasticOperatorTraits::<E>::dofs(element, num_nodes);
        dofs.extend(
            TransportOperatorTraits::dofs(element, num_nodes)
                .into_iter()
                .map(|dof| dof + offset),
        );

        dofs
    }

    fn is_fixed_dof(dof: usize, num_nodes: usize) -> bool {
        let offset = Self::num_mechanical_dofs(num_nodes);

        if dof < offset {
            ElasticOperatorTraits::<E>::is_fixed_dof(dof, num_nodes)
        } else {
            TransportOperatorTraits::is_fixed_dof(dof - offset, num_nodes)
        }
    }

    fn reduced_dof(dof: usize, num_nodes: usize) -> usize {
        let offset = Self::num_mechanical_dofs(num_nodes);

        if dof < offset {
            ElasticOperatorTraits::<E>::reduced_dof(dof, num_nodes)
        } else {
            TransportOperatorTraits::reduced_dof(dof - offset, num_nodes)
                + Self::num_reduced_mechanical_dofs(num_nodes)
        }
    }

    fn expanded_dof(dof: usize, num_nodes: usize) -> usize {
        let reduced_offset = Self::num_reduced_mechanical_dofs(num_nodes);

        if dof < reduced_offset {
            ElasticOperatorTraits::<E>::expanded_dof(dof, num_nodes)
        } else {
            TransportOperatorTraits::expanded_dof(dof - reduced_offset, num_nodes)
                + Self::num_mechanical_dofs(num_nodes)
        }
    }
}
