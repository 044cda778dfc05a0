#![allow(dead_code)]
use std::collections::BTreeSet;
use dragonfly_lib::config::DragonflyOptions;
use dragonfly_lib::endpoint::{Endpoint, EndpointKind};
use dragonfly_lib::topology::prelude::*;
use dragonfly_lib::topology::dragonfly::Dragonfly;
use rand::rngs::StdRng;
use rand::Rng;
use rand::seq::SliceRandom;

/// Options for the canonical dragonfly with `a` routers per group and `h` global channels per router.
pub fn canonical_options(routers_per_group: usize, global_channels_per_router: usize) -> DragonflyOptions
{
    let groups = routers_per_group * global_channels_per_router + 1;
    DragonflyOptions::sized(routers_per_group * groups, routers_per_group, global_channels_per_router)
}

/// `per_router` cache controllers for each router.
pub fn caches(options: &DragonflyOptions, per_router: usize) -> Vec<EndpointKind>
{
    vec![EndpointKind::Cache; options.num_cpus * per_router]
}

pub fn build<E: Endpoint>(options: &DragonflyOptions, endpoints: &[E]) -> Topology
{
    Dragonfly::new(options).expect("valid options").build(endpoints).expect("the topology should build")
}

/// A random valid `(a,h)` pair, small enough to check exhaustively.
pub fn random_size(rng: &mut StdRng) -> (usize, usize)
{
    (rng.gen_range(1..7), rng.gen_range(0..5))
}

/// A shuffled list of endpoints with at least one per router and a random remainder of DMA controllers.
pub fn random_endpoints(rng: &mut StdRng, num_routers: usize) -> Vec<EndpointKind>
{
    let per_router = rng.gen_range(1..4);
    let mut endpoints: Vec<EndpointKind> = (0..num_routers * per_router)
        .map(|_| if rng.gen_bool(0.5) { EndpointKind::Cache } else { EndpointKind::Directory })
        .collect();
    endpoints.shuffle(rng);
    let extra = rng.gen_range(0..num_routers);
    endpoints.extend(std::iter::repeat(EndpointKind::Dma).take(extra));
    endpoints
}

/// The labels of the ports of `router`, for the given class and direction.
pub fn labels(topology: &Topology, router: usize, class: LinkClass, outgoing: bool) -> BTreeSet<PortLabel>
{
    let ports = if outgoing { topology.outports(router) } else { topology.inports(router) };
    ports.keys().filter(|label| label.class == class).copied().collect()
}

/// Checks every structural property of a canonical dragonfly.
pub fn assert_canonical(topology: &Topology, num_endpoints: usize)
{
    let size = topology.size();
    let a = size.routers_per_group();
    let h = size.global_channels_per_router();
    let g = size.number_of_groups();
    let n = topology.num_routers();
    assert_eq!(n, a * g);
    assert_eq!(topology.external_links().len(), num_endpoints);
    assert_eq!(topology.links_of_class(LinkClass::Global).count(), n * h);
    assert_eq!(topology.links_of_class(LinkClass::Local).count(), g * a * (a - 1));
    let ids: Vec<usize> = topology.external_links().iter().map(|link| link.link_id)
        .chain(topology.internal_links().iter().map(|link| link.link_id)).collect();
    assert_eq!(ids, (0..topology.num_links()).collect::<Vec<usize>>());
    let global_labels: BTreeSet<PortLabel> = (0..h).map(PortLabel::global).collect();
    for router in 0..n
    {
        assert_eq!(labels(topology, router, LinkClass::Global, true), global_labels, "outgoing global ports of router {}", router);
        assert_eq!(labels(topology, router, LinkClass::Global, false), global_labels, "incoming global ports of router {}", router);
        assert_eq!(labels(topology, router, LinkClass::Local, true).len(), a - 1);
        assert_eq!(labels(topology, router, LinkClass::Local, false).len(), a - 1);
    }
    for link in topology.internal_links()
    {
        assert_ne!(link.source, link.destination);
        let same_group = size.group_of(link.source) == size.group_of(link.destination);
        match link.class()
        {
            LinkClass::Global =>
            {
                assert!(!same_group, "global link {:?} inside a group", link);
                assert_eq!(link.weight, 2);
            },
            LinkClass::Local =>
            {
                assert!(same_group, "local link {:?} between groups", link);
                assert_eq!(link.weight, 1);
            },
        }
    }
    assert!(topology.check_consistency().is_ok());
}
