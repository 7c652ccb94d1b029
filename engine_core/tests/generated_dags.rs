//! Random dependency graphs must instantiate dependencies first, whatever the registration order.

use std::collections::HashMap;

use cx_engine_core::{
    instantiate::instantiate, FrameContext, Module, ModuleCatalog, ModuleDeps, Stage, TypeKey,
};
use proptest::prelude::*;

const NODES: usize = 8;
const EDGE_SLOTS: usize = NODES * (NODES - 1) / 2;

macro_rules! nodes {
    ($($index:literal => $name:ident),* $(,)?) => {
        $(
            struct $name;

            impl Module for $name {
                fn update(&mut self, _ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
                    Ok(())
                }
            }
        )*

        fn key_of(catalog: &ModuleCatalog, node: usize) -> TypeKey {
            match node {
                $($index => catalog.key_of::<$name>(),)*
                _ => unreachable!("node {node} out of range"),
            }
        }

        fn register(catalog: &mut ModuleCatalog, node: usize, requires: &[TypeKey]) {
            match node {
                $($index => {
                    catalog
                        .register(Stage::Normal, requires, |_: &ModuleDeps<'_>| Ok($name))
                        .unwrap();
                })*
                _ => unreachable!("node {node} out of range"),
            }
        }
    };
}

nodes!(0 => N0, 1 => N1, 2 => N2, 3 => N3, 4 => N4, 5 => N5, 6 => N6, 7 => N7);

/// `edges` covers every pair `i < j`; a set bit means `j` requires `i`.
fn requirements(edges: &[bool]) -> Vec<Vec<usize>> {
    let mut requires = vec![Vec::new(); NODES];
    let mut bit = edges.iter();
    for j in 0..NODES {
        for i in 0..j {
            if bit.next().copied().unwrap_or(false) {
                requires[j].push(i);
            }
        }
    }
    requires
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn dependencies_precede_dependents(
        edges in prop::collection::vec(any::<bool>(), EDGE_SLOTS),
        order in Just((0..NODES).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let requires = requirements(&edges);
        let mut catalog = ModuleCatalog::new();
        for &node in &order {
            let keys: Vec<TypeKey> = requires[node].iter().map(|&d| key_of(&catalog, d)).collect();
            register(&mut catalog, node, &keys);
        }

        let table = instantiate(&catalog).unwrap();
        prop_assert_eq!(table.len(), NODES);

        let position: HashMap<TypeKey, usize> =
            table.infos().map(|info| (info.key, info.sequence)).collect();
        for (node, deps) in requires.iter().enumerate() {
            let at = position[&key_of(&catalog, node)];
            for &dep in deps {
                prop_assert!(
                    position[&key_of(&catalog, dep)] < at,
                    "N{} instantiated before its dependency N{}", node, dep
                );
            }
        }
    }
}
